//! Data access layer for the community and listings marketing site.
//!
//! [`DataService`] is the entry point: it talks to the remote admin API
//! through [`ApiClient`], falls back to a [`LocalStore`] when the remote is
//! unreachable, and keeps a [`LookupCache`] of full community records.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod search;
pub mod service;
pub mod session;
pub mod store;

use std::sync::Arc;

pub use api::{ApiClient, ApiError};
pub use cache::LookupCache;
pub use config::Config;
pub use search::{search_listings, sort_listings, ListingFilters, SortKey};
pub use service::{DataService, Fetched, Source};
pub use session::{AdminAuth, Session};
pub use store::{FileStore, LocalData, LocalStore, MemoryStore};

/// Wire the store, session, client and facade together
pub fn connect(api_url: &str, store: Arc<dyn LocalStore>) -> Result<DataService, ApiError> {
    let local = LocalData::new(store);
    let session = Arc::new(Session::restore(local.clone()));
    let api = ApiClient::new(api_url, session)?;
    Ok(DataService::new(api, local))
}
