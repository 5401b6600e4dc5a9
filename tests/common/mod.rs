#![allow(dead_code)]

use std::sync::Arc;

use estate_data::models::{Builder, Community, HomeModel, Listing};
use estate_data::{connect, DataService, FileStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Harness {
    pub server: MockServer,
    pub service: DataService,
    pub dir: TempDir,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let service = service_at(&server, &dir);
        Self {
            server,
            service,
            dir,
        }
    }

    /// A second service sharing this harness's server and data directory
    pub fn reopen(&self) -> DataService {
        service_at(&self.server, &self.dir)
    }

    pub async fn login(&self, role: &str) {
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-123",
                "admin": { "id": "a1", "email": "admin@example.com", "role": role },
            })))
            .mount(&self.server)
            .await;
        self.service
            .auth()
            .login("admin@example.com", "secret")
            .await
            .unwrap();
    }
}

fn service_at(server: &MockServer, dir: &TempDir) -> DataService {
    let store = FileStore::open(dir.path()).unwrap();
    connect(&format!("{}/api", server.uri()), Arc::new(store)).unwrap()
}

pub fn riverstone() -> Community {
    Community {
        id: "riverstone".to_string(),
        name: "Riverstone".to_string(),
        location: "Sugar Land, TX".to_string(),
        description: "Lakes, trails and top-rated schools".to_string(),
        price_range: "$400K - $800K".to_string(),
        amenities: vec!["Pool".to_string(), "Trails".to_string()],
        builders: vec![
            Builder {
                name: "Perry Homes".to_string(),
                ..Default::default()
            },
            Builder {
                name: "Highland Homes".to_string(),
                ..Default::default()
            },
        ],
        homes: vec![
            HomeModel {
                name: "The Aspen".to_string(),
                bedrooms: Some(4),
                ..Default::default()
            },
            HomeModel {
                name: "The Birch".to_string(),
                bedrooms: Some(3),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

pub fn community_json(community: &Community) -> Value {
    serde_json::to_value(community).unwrap()
}

pub fn listing(id: &str, price: f64, bedrooms: u32, bathrooms: f32, community: Option<&str>) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Listing {id}"),
        address: format!("{id} Main St"),
        price,
        bedrooms,
        bathrooms,
        sqft: 2400,
        community_id: community.map(str::to_string),
        ..Default::default()
    }
}
