//! The data facade the rest of the application talks to.
//!
//! Every entity operation tries the remote API first and, on any failure,
//! serves the equivalent answer from local storage. Results carry a
//! [`Source`] so callers can tell authoritative data from a fallback.

mod fetched;

pub use fetched::{Fetched, Source};

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, RequestOptions};
use crate::cache::{LookupCache, PreloadReport};
use crate::models::{Community, Contact, Entity, Listing, Property};
use crate::search::{self, ListingFilters};
use crate::session::AdminAuth;
use crate::store::LocalData;

const CONTACT_SUBMIT_ENDPOINT: &str = "/public/contacts";

/// Whether a write creates a new record or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Create,
    Update,
}

pub struct DataService {
    api: ApiClient,
    local: LocalData,
    cache: LookupCache,
}

impl DataService {
    pub fn new(api: ApiClient, local: LocalData) -> Self {
        Self {
            api,
            local,
            cache: LookupCache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn local(&self) -> &LocalData {
        &self.local
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Admin login and account management over the same client and session
    pub fn auth(&self) -> AdminAuth {
        AdminAuth::new(self.api.clone())
    }

    /// Admin endpoint when logged in, otherwise the public mirror if there is one
    fn read_endpoint<E: Entity>(&self) -> &'static str {
        match E::PUBLIC_ENDPOINT {
            Some(public) if !self.api.session().is_authenticated() => public,
            _ => E::ENDPOINT,
        }
    }

    // ---- generic remote-then-local operations ----

    async fn list<E: Entity>(&self) -> Fetched<Vec<E>> {
        let endpoint = self.read_endpoint::<E>();
        let fetched = self
            .api
            .get::<Vec<Value>>(endpoint)
            .await
            .and_then(|raw| Ok((decode_all::<E>(&raw)?, raw)));
        match fetched {
            Ok((records, raw)) => {
                if endpoint == E::ENDPOINT {
                    self.local.replace_all(&records);
                } else {
                    // public lists are summaries
                    self.local.merge_summaries::<E>(&raw);
                }
                Fetched::remote(records)
            }
            Err(e) => {
                warn!("Falling back to local {} list: {}", E::LABEL, e);
                Fetched::local(self.local.list::<E>(), e)
            }
        }
    }

    async fn get<E: Entity>(&self, id: &str) -> Fetched<Option<E>> {
        let endpoint = format!("{}/{}", self.read_endpoint::<E>(), id);
        match self.api.get::<E>(&endpoint).await {
            Ok(record) => Fetched::remote(Some(record)),
            Err(e) => {
                warn!("Falling back to local {} {}: {}", E::LABEL, id, e);
                Fetched::local(self.local.get::<E>(id), e)
            }
        }
    }

    /// Create or update, decided by whether the record already exists remotely
    async fn save<E: Entity>(&self, record: E) -> Result<Fetched<E>, ApiError> {
        record.validate().map_err(ApiError::Invalid)?;
        if record.id().is_empty() {
            return self.write(record, Intent::Create).await;
        }

        let endpoint = format!("{}/{}", E::ENDPOINT, record.id());
        let intent = match self.api.get::<Value>(&endpoint).await {
            Ok(_) => Intent::Update,
            Err(e @ (ApiError::AuthExpired | ApiError::Network(_))) => {
                warn!("Saving {} {} locally: {}", E::LABEL, record.id(), e);
                return Ok(Fetched::local(self.local.upsert(record), e));
            }
            Err(_) => Intent::Create,
        };
        debug!("Saving {} {} as {:?}", E::LABEL, record.id(), intent);
        self.write(record, intent).await
    }

    /// Only an invalid record is an error. Remote failures fall back to local storage.
    async fn write<E: Entity>(&self, record: E, intent: Intent) -> Result<Fetched<E>, ApiError> {
        record.validate().map_err(ApiError::Invalid)?;
        let result = match intent {
            Intent::Create => self.send(E::ENDPOINT, reqwest::Method::POST, &record).await,
            Intent::Update => {
                let endpoint = format!("{}/{}", E::ENDPOINT, record.id());
                self.send(&endpoint, reqwest::Method::PUT, &record).await
            }
        };

        Ok(match result {
            Ok(saved) => {
                self.local.upsert(saved.clone());
                Fetched::remote(saved)
            }
            Err(e) => {
                warn!("Falling back to local {} {:?}: {}", E::LABEL, intent, e);
                Fetched::local(self.local.upsert(record), e)
            }
        })
    }

    /// Send `record` and decode the echoed record. An empty reply means the
    /// server stored exactly what was sent.
    async fn send<E: Entity>(
        &self,
        endpoint: &str,
        method: reqwest::Method,
        record: &E,
    ) -> Result<E, ApiError> {
        let body = serde_json::to_value(record).map_err(|e| ApiError::Decode(e.to_string()))?;
        let reply = self
            .api
            .request(endpoint, RequestOptions::with_body(method, body))
            .await?;
        if reply.is_null() {
            return Ok(record.clone());
        }
        serde_json::from_value(reply).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Returns whether the record is gone. Local storage is updated either way.
    async fn delete<E: Entity>(&self, id: &str) -> Fetched<bool> {
        let endpoint = format!("{}/{}", E::ENDPOINT, id);
        match self.api.delete(&endpoint).await {
            Ok(()) => {
                self.local.delete::<E>(id);
                Fetched::remote(true)
            }
            Err(e) => {
                warn!("Deleting local {} {} only: {}", E::LABEL, id, e);
                Fetched::local(self.local.delete::<E>(id), e)
            }
        }
    }

    // ---- communities ----

    pub async fn get_communities(&self) -> Fetched<Vec<Community>> {
        self.list().await
    }

    /// Served from the lookup cache when possible
    pub async fn get_community(&self, id: &str) -> Fetched<Option<Community>> {
        if let Some(community) = self.cache.get(id) {
            debug!("Community {} served from cache", id);
            return Fetched::cached(Some(community));
        }
        let fetched = self.get::<Community>(id).await;
        if fetched.source == Source::Remote {
            if let Some(community) = &fetched.data {
                self.cache.put(community.clone());
            }
        }
        fetched
    }

    pub async fn save_community(&self, community: Community) -> Result<Fetched<Community>, ApiError> {
        let saved = self.save(community).await?;
        self.cache.put(saved.data.clone());
        Ok(saved)
    }

    pub async fn create_community(&self, community: Community) -> Result<Fetched<Community>, ApiError> {
        let saved = self.write(community, Intent::Create).await?;
        self.cache.put(saved.data.clone());
        Ok(saved)
    }

    pub async fn update_community(&self, community: Community) -> Result<Fetched<Community>, ApiError> {
        let saved = self.write(community, Intent::Update).await?;
        self.cache.put(saved.data.clone());
        Ok(saved)
    }

    pub async fn delete_community(&self, id: &str) -> Fetched<bool> {
        let deleted = self.delete::<Community>(id).await;
        self.cache.evict(id);
        deleted
    }

    /// Warm the lookup cache with every community's full record
    pub async fn preload_communities(&self) -> Result<PreloadReport, ApiError> {
        self.cache
            .preload_all(&self.api, self.read_endpoint::<Community>())
            .await
    }

    // ---- listings ----

    pub async fn get_listings(&self) -> Fetched<Vec<Listing>> {
        self.list().await
    }

    pub async fn get_listing(&self, id: &str) -> Fetched<Option<Listing>> {
        self.get(id).await
    }

    pub async fn listings_by_community(&self, community_id: &str) -> Fetched<Vec<Listing>> {
        let endpoint = self.read_endpoint::<Listing>();
        match self
            .api
            .get_with_query::<Vec<Listing>>(endpoint, &[("communityId", community_id)])
            .await
        {
            Ok(listings) => Fetched::remote(listings),
            Err(e) => {
                warn!("Falling back to local listings for {}: {}", community_id, e);
                let listings = self
                    .local
                    .list::<Listing>()
                    .into_iter()
                    .filter(|l| l.community_id.as_deref() == Some(community_id))
                    .collect();
                Fetched::local(listings, e)
            }
        }
    }

    /// Free-text query plus filters over all listings, in listing order
    pub async fn search_listings(&self, query: &str, filters: &ListingFilters) -> Fetched<Vec<Listing>> {
        self.get_listings()
            .await
            .map(|all| search::search_listings(&all, query, filters))
    }

    pub async fn save_listing(&self, listing: Listing) -> Result<Fetched<Listing>, ApiError> {
        self.save(listing).await
    }

    pub async fn create_listing(&self, listing: Listing) -> Result<Fetched<Listing>, ApiError> {
        self.write(listing, Intent::Create).await
    }

    pub async fn update_listing(&self, listing: Listing) -> Result<Fetched<Listing>, ApiError> {
        self.write(listing, Intent::Update).await
    }

    pub async fn delete_listing(&self, id: &str) -> Fetched<bool> {
        self.delete::<Listing>(id).await
    }

    // ---- properties ----

    pub async fn get_properties(&self) -> Fetched<Vec<Property>> {
        self.list().await
    }

    pub async fn get_property(&self, id: &str) -> Fetched<Option<Property>> {
        self.get(id).await
    }

    pub async fn save_property(&self, property: Property) -> Result<Fetched<Property>, ApiError> {
        self.save(property).await
    }

    pub async fn create_property(&self, property: Property) -> Result<Fetched<Property>, ApiError> {
        self.write(property, Intent::Create).await
    }

    pub async fn update_property(&self, property: Property) -> Result<Fetched<Property>, ApiError> {
        self.write(property, Intent::Update).await
    }

    pub async fn delete_property(&self, id: &str) -> Fetched<bool> {
        self.delete::<Property>(id).await
    }

    // ---- contacts ----

    /// Submit a contact form. Needs no login.
    pub async fn submit_contact(&self, mut contact: Contact) -> Fetched<Contact> {
        if contact.id.is_empty() {
            contact.id = contact.generate_id();
        }
        if contact.created_at.is_none() {
            contact.created_at = Some(chrono::Utc::now());
        }
        match self.send(CONTACT_SUBMIT_ENDPOINT, reqwest::Method::POST, &contact).await {
            Ok(saved) => {
                self.local.upsert(saved.clone());
                Fetched::remote(saved)
            }
            Err(e) => {
                warn!("Keeping contact {} locally: {}", contact.id, e);
                Fetched::local(self.local.upsert(contact), e)
            }
        }
    }

    /// Admin-only on the remote side
    pub async fn get_contacts(&self) -> Fetched<Vec<Contact>> {
        self.list().await
    }

    pub async fn get_contact(&self, id: &str) -> Fetched<Option<Contact>> {
        self.get(id).await
    }

    pub async fn delete_contact(&self, id: &str) -> Fetched<bool> {
        self.delete::<Contact>(id).await
    }
}

fn decode_all<E: Entity>(raw: &[Value]) -> Result<Vec<E>, ApiError> {
    serde_json::from_value(Value::Array(raw.to_vec())).map_err(|e| ApiError::Decode(e.to_string()))
}
