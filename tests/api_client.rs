use std::sync::Arc;
use std::time::Duration;

use estate_data::api::RequestOptions;
use estate_data::models::AdminUser;
use estate_data::{ApiClient, ApiError, LocalData, MemoryStore, Session};
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base: &str) -> ApiClient {
    let session = Arc::new(Session::restore(LocalData::new(Arc::new(MemoryStore::new()))));
    ApiClient::new(base, session).unwrap()
}

#[tokio::test]
async fn attaches_bearer_token_when_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/listings"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&format!("{}/api/", server.uri()));
    api.session().set("abc".to_string(), AdminUser::default());
    let listings: Vec<Value> = api.get("/listings").await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn serializes_bodies_and_extra_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/communities"))
        .and(header("X-Request-Source", "admin-panel"))
        .and(body_json(json!({ "id": "riverstone" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "riverstone" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&format!("{}/api", server.uri()));
    let reply = api
        .request(
            "communities",
            RequestOptions::with_body(Method::POST, json!({ "id": "riverstone" }))
                .header("X-Request-Source", "admin-panel"),
        )
        .await
        .unwrap();
    assert_eq!(reply["id"], "riverstone");
}

#[tokio::test]
async fn non_json_error_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&format!("{}/api", server.uri()))
        .get::<Value>("/communities")
        .await
        .unwrap_err();
    match err {
        ApiError::Request { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "HTTP error! status: 502");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = client(&format!("{}/api", server.uri()));
    api.session().set("stale".to_string(), AdminUser::default());

    let err = api.get::<Value>("/communities").await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = client(&format!("{}/api", server.uri()));
    let reply = api.request("/listings/1", RequestOptions::delete()).await.unwrap();
    assert!(reply.is_null());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // nothing listens on the discard port
    let api = client("http://127.0.0.1:9/api");
    let err = api.get::<Value>("/communities").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_header_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&format!("{}/api", server.uri()));
    let err = api
        .request("/listings", RequestOptions::get().header("bad header", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)), "got {err:?}");

    let err = api
        .request("/listings", RequestOptions::get().header("X-Note", "line\nbreak"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)), "got {err:?}");
}

#[tokio::test]
async fn late_unauthorized_keeps_a_newer_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/communities"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let api = client(&format!("{}/api", server.uri()));
    api.session().set("stale".to_string(), AdminUser::default());

    let relogin = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        api.session().set("fresh".to_string(), AdminUser::default());
    };
    let (result, ()) = tokio::join!(api.get::<Value>("/communities"), relogin);

    assert!(result.unwrap_err().is_auth_expired());
    assert_eq!(api.session().token().as_deref(), Some("fresh"));
}
