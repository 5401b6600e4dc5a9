use dashmap::DashMap;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Community;

/// Outcome of [`LookupCache::preload_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    /// Ids whose detail fetch failed; the cache has no entry for them
    pub failed: Vec<String>,
}

/// Community id -> full community record, for the lifetime of the service.
///
/// No TTL: entries change only through `put`/`evict`, so edits made by
/// another client are not seen until the entry is fetched again.
#[derive(Debug, Default)]
pub struct LookupCache {
    communities: DashMap<String, Community>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Community> {
        self.communities.get(id).map(|entry| entry.value().clone())
    }

    /// Upsert by id. Records without an id are ignored.
    pub fn put(&self, community: Community) {
        if community.id.is_empty() {
            return;
        }
        self.communities.insert(community.id.clone(), community);
    }

    pub fn evict(&self, id: &str) -> Option<Community> {
        self.communities.remove(id).map(|(_, community)| community)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.communities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    pub fn clear(&self) {
        self.communities.clear();
    }

    /// Fetch the community list from `endpoint`, then every community's
    /// detail concurrently. Individual failures are logged and skipped, so
    /// the cache may be incomplete afterwards.
    pub async fn preload_all(&self, api: &ApiClient, endpoint: &str) -> Result<PreloadReport, ApiError> {
        let list: Vec<Community> = api.get(endpoint).await?;
        debug!("Preloading {} communities", list.len());

        let fetches = list
            .iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| async move {
                let result = api.get::<Community>(&format!("{}/{}", endpoint, c.id)).await;
                (c.id.clone(), result)
            });

        let mut report = PreloadReport::default();
        for (id, result) in join_all(fetches).await {
            match result {
                Ok(community) => {
                    self.put(community);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!("Failed to preload community {}: {}", id, e);
                    report.failed.push(id);
                }
            }
        }

        info!(
            "Preloaded {} communities ({} failed)",
            report.loaded,
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community(id: &str) -> Community {
        Community {
            id: id.to_string(),
            name: id.to_uppercase(),
            ..Default::default()
        }
    }

    #[test]
    fn put_get_evict() {
        let cache = LookupCache::new();
        assert!(cache.get("riverstone").is_none());

        cache.put(community("riverstone"));
        assert_eq!(cache.get("riverstone").map(|c| c.name), Some("RIVERSTONE".to_string()));
        assert_eq!(cache.len(), 1);

        assert!(cache.evict("riverstone").is_some());
        assert!(!cache.contains("riverstone"));
        assert!(cache.evict("riverstone").is_none());
    }

    #[test]
    fn put_without_id_is_ignored() {
        let cache = LookupCache::new();
        cache.put(community(""));
        assert!(cache.is_empty());
    }

    #[test]
    fn put_replaces_entry() {
        let cache = LookupCache::new();
        cache.put(community("a"));
        let mut updated = community("a");
        updated.location = "Katy, TX".to_string();
        cache.put(updated);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().location, "Katy, TX");
    }
}
