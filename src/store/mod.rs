//! Local persistent key-value storage and the JSON collections kept in it.
//!
//! The store is the offline fallback for every entity family and also holds
//! the admin session (`adminToken`, `adminUser`). Failures here are logged
//! and never propagated: reads degrade to "no data", writes are dropped.

mod collections;
mod file;
mod memory;

pub use collections::LocalData;
pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const ADMIN_USER_KEY: &str = "adminUser";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON under key {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string key-value store
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
