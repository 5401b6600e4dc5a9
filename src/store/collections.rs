use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{LocalStore, StoreError};
use crate::models::Entity;

/// JSON view over a [`LocalStore`].
///
/// Each entity family lives under its `STORAGE_KEY` as a JSON array.
#[derive(Clone)]
pub struct LocalData {
    store: Arc<dyn LocalStore>,
}

impl LocalData {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Read and decode `key`; missing or unreadable data is `None`
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Local read failed: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let e = StoreError::Json {
                    key: key.to_string(),
                    source,
                };
                warn!("Ignoring corrupt local data: {}", e);
                None
            }
        }
    }

    /// Encode and store `value` under `key`. Returns false if the write was dropped.
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(source) => {
                warn!(
                    "Local write dropped: {}",
                    StoreError::Json {
                        key: key.to_string(),
                        source
                    }
                );
                return false;
            }
        };
        match self.store.set(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Local write dropped: {}", e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("Local remove failed: {}", e);
        }
    }

    /// All stored records of a family. Records stored without an id get one.
    pub fn list<E: Entity>(&self) -> Vec<E> {
        let mut records: Vec<E> = self.read_json(E::STORAGE_KEY).unwrap_or_default();
        let mut assigned = false;
        for i in 0..records.len() {
            if records[i].id().is_empty() {
                let id = unused_id(&records, records[i].generate_id());
                records[i].set_id(id);
                assigned = true;
            }
        }
        if assigned {
            debug!("Assigned ids to legacy local {} records", E::LABEL);
            self.write_json(E::STORAGE_KEY, &records);
        }
        records
    }

    pub fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.list::<E>().into_iter().find(|r| r.id() == id)
    }

    /// Insert or replace by id, filling in id and creation time when missing
    ///
    /// A generated id never replaces another record: if it is taken, a
    /// numeric suffix is added.
    pub fn upsert<E: Entity>(&self, mut record: E) -> E {
        let mut records = self.list::<E>();
        if record.id().is_empty() {
            let id = unused_id(&records, record.generate_id());
            record.set_id(id);
        }
        if record.created_at().is_none() {
            record.set_created_at(Utc::now());
        }

        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.write_json(E::STORAGE_KEY, &records);
        record
    }

    /// Replace the whole collection, e.g. with a fresh remote snapshot
    pub fn replace_all<E: Entity>(&self, records: &[E]) {
        self.write_json(E::STORAGE_KEY, records);
    }

    /// Mirror a list of summary records.
    ///
    /// The stored collection ends up with exactly the summarized records.
    /// Fields a summary leaves out keep their stored values, so embedded
    /// data fetched earlier survives.
    pub fn merge_summaries<E: Entity>(&self, summaries: &[Value]) {
        let stored: Vec<Value> = self.read_json(E::STORAGE_KEY).unwrap_or_default();
        let merged: Vec<Value> = summaries
            .iter()
            .map(|summary| {
                let previous = id_of(summary)
                    .and_then(|id| stored.iter().find(|v| id_of(v) == Some(id)));
                overlay(previous, summary)
            })
            .collect();
        self.write_json(E::STORAGE_KEY, &merged);
    }

    /// Remove by id. Returns whether a record was removed.
    pub fn delete<E: Entity>(&self, id: &str) -> bool {
        let mut records = self.list::<E>();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return false;
        }
        self.write_json(E::STORAGE_KEY, &records);
        true
    }
}

/// `base`, or `base-2`, `base-3`, ... when `base` is already taken
fn unused_id<E: Entity>(records: &[E], base: String) -> String {
    let taken = |id: &str| records.iter().any(|r| r.id() == id);
    let mut id = base.clone();
    let mut n = 2;
    while taken(&id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

fn id_of(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

fn overlay(stored: Option<&Value>, summary: &Value) -> Value {
    match (stored, summary) {
        (Some(Value::Object(fields)), Value::Object(update)) => {
            let mut merged = fields.clone();
            merged.extend(update.clone());
            Value::Object(merged)
        }
        _ => summary.clone(),
    }
}
