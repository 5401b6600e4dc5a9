mod common;

use common::Harness;
use estate_data::models::Contact;
use estate_data::Source;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn inquiry(name: &str) -> Contact {
    Contact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        message: "Is the Aspen plan still available?".to_string(),
        community_id: Some("riverstone".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn submission_goes_to_public_endpoint_with_stable_id() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/contacts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&h.server)
        .await;

    let submitted = h.service.submit_contact(inquiry("Ann")).await;
    assert_eq!(submitted.source, Source::Remote);
    assert!(!submitted.data.id.is_empty());
    assert!(submitted.data.created_at.is_some());
}

#[tokio::test]
async fn offline_submissions_are_kept_and_deleted_by_id() {
    let h = Harness::start().await;
    let ann = h.service.submit_contact(inquiry("Ann")).await;
    let bo = h.service.submit_contact(inquiry("Bo")).await;
    assert_eq!(ann.source, Source::Local);
    assert_ne!(ann.data.id, bo.data.id);

    let listed = h.service.get_contacts().await;
    assert_eq!(listed.source, Source::Local);
    assert_eq!(listed.data.len(), 2);

    // deleting Ann must not touch Bo, whatever the order
    let deleted = h.service.delete_contact(&ann.data.id).await;
    assert!(deleted.data);
    let remaining = h.service.get_contacts().await.data;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, bo.data.id);

    assert!(!h.service.delete_contact(&ann.data.id).await.data);
}

#[tokio::test]
async fn admin_contact_list_and_delete() {
    let h = Harness::start().await;
    h.login("admin").await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c1", "name": "Ann", "email": "ann@example.com", "message": "Hi" },
            { "id": "c2", "name": "Bo", "email": "bo@example.com", "message": "Hello" },
        ])))
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/contacts/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let contacts = h.service.get_contacts().await;
    assert_eq!(contacts.source, Source::Remote);
    assert_eq!(contacts.data.len(), 2);

    let deleted = h.service.delete_contact("c1").await;
    assert_eq!(deleted.source, Source::Remote);
    assert!(deleted.data);
    // the mirrored copy follows the remote delete
    let local: Vec<Contact> = h.service.local().list();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, "c2");
}
