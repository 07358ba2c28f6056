//! Entity Service
//!
//! One implementation of the cache protocol, instantiated per entity type.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{CacheGateway, CacheKeys};
use crate::entities::{EntityKind, Record};
use crate::error::{AppError, Result};
use crate::store::{Document, DocumentStore, ObjectId};

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

// == Provenance ==
/// Where a read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Store,
}

/// A read result tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: Source,
}

impl<T> Fetched<T> {
    fn cache(data: T) -> Self {
        Self {
            data,
            source: Source::Cache,
        }
    }

    fn store(data: T) -> Self {
        Self {
            data,
            source: Source::Store,
        }
    }

    pub fn from_cache(&self) -> bool {
        self.source == Source::Cache
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

// == Entity Service ==
/// Cache-coherent CRUD and statistics for entity type `K`.
///
/// The service is the only writer of both the store collection and the
/// cache keys of its type.
pub struct EntityService<K: EntityKind> {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn CacheGateway>,
    keys: CacheKeys,
    /// Expiration applied to every cache write, in seconds
    ttl: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> EntityService<K> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn CacheGateway>,
        keys: CacheKeys,
        ttl: u64,
    ) -> Self {
        Self {
            store,
            cache,
            keys,
            ttl,
            _kind: PhantomData,
        }
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    // == Create ==
    /// Validates and stores a new record, then evicts the collection and
    /// stats keys. The per-record key is left for the next read to fill.
    pub async fn create(&self, draft: K::Draft) -> Result<Record<K::Fields>> {
        let fields = K::from_draft(draft)?;

        let mut document = to_document(&fields)?;
        document.insert(CREATED_AT.to_string(), serde_json::to_value(Utc::now())?);
        document.insert(UPDATED_AT.to_string(), Value::Null);

        let stored = self.store.create(K::COLLECTION, document).await?;
        let record = Record::from_document(stored)?;

        self.invalidate(&[self.keys.all(), self.keys.stats()]).await?;

        info!(collection = K::COLLECTION, id = %record.id, "record created");
        Ok(record)
    }

    // == Get All ==
    /// Returns every record, from the cache when present.
    pub async fn get_all(&self) -> Result<Fetched<Vec<Record<K::Fields>>>> {
        if let Some(records) = self.read_cached(self.keys.all()).await? {
            return Ok(Fetched::cache(records));
        }

        let records = self.load_all().await?;
        if records.is_empty() {
            return Err(self.empty_collection());
        }

        self.write_cached(self.keys.all(), &records).await?;
        Ok(Fetched::store(records))
    }

    // == Get One ==
    /// Returns one record, from the cache when present.
    pub async fn get_one(&self, raw_id: &str) -> Result<Fetched<Record<K::Fields>>> {
        let id = Self::parse_id(raw_id)?;
        let key = self.keys.record(&id);

        if let Some(record) = self.read_cached(&key).await? {
            return Ok(Fetched::cache(record));
        }

        let record = self
            .load_one(&id)
            .await?
            .ok_or_else(|| self.missing_record())?;

        self.write_cached(&key, &record).await?;
        Ok(Fetched::store(record))
    }

    // == Update ==
    /// Merges `patch` into the stored record, writes the result through to
    /// the per-record key and evicts the collection and stats keys.
    ///
    /// The current state is always read from the store, never the cache.
    pub async fn update(&self, raw_id: &str, patch: K::Draft) -> Result<Record<K::Fields>> {
        let id = Self::parse_id(raw_id)?;
        K::check_patch(&patch)?;

        let current = self
            .load_one(&id)
            .await?
            .ok_or_else(|| self.missing_record())?;

        let fields = K::merge(&current.fields, patch)?;
        let mut document = to_document(&fields)?;
        document.insert(UPDATED_AT.to_string(), serde_json::to_value(Utc::now())?);

        let stored = self
            .store
            .update(K::COLLECTION, &id, document)
            .await?
            .ok_or_else(|| self.missing_record())?;
        let record = Record::from_document(stored)?;

        self.write_cached(&self.keys.record(&id), &record).await?;
        self.invalidate(&[self.keys.all(), self.keys.stats()]).await?;

        info!(collection = K::COLLECTION, %id, "record updated");
        Ok(record)
    }

    // == Delete ==
    /// Removes a record and evicts its key along with the collection and
    /// stats keys.
    pub async fn delete(&self, raw_id: &str) -> Result<()> {
        let id = Self::parse_id(raw_id)?;

        if self.store.find_by_id(K::COLLECTION, &id).await?.is_none() {
            return Err(self.missing_record());
        }

        let removed = self.store.delete(K::COLLECTION, &id).await?;
        let record_key = self.keys.record(&id);
        self.invalidate(&[record_key.as_str(), self.keys.all(), self.keys.stats()])
            .await?;

        // Deleted by a concurrent caller between the lookup and our delete
        if !removed {
            return Err(self.missing_record());
        }

        info!(collection = K::COLLECTION, %id, "record deleted");
        Ok(())
    }

    // == Get Stats ==
    /// Returns the statistics summary, recomputing it from the whole
    /// collection on a cache miss.
    pub async fn get_stats(&self) -> Result<Fetched<K::Stats>> {
        if let Some(stats) = self.read_cached(self.keys.stats()).await? {
            return Ok(Fetched::cache(stats));
        }

        let records = self.load_all().await?;
        if records.is_empty() {
            return Err(self.empty_collection());
        }

        let stats = K::summarize(&records, Utc::now().year());
        self.write_cached(self.keys.stats(), &stats).await?;

        debug!(collection = K::COLLECTION, records = records.len(), "stats recomputed");
        Ok(Fetched::store(stats))
    }

    // == Helpers ==
    fn parse_id(raw: &str) -> Result<ObjectId> {
        ObjectId::parse_str(raw).map_err(|_| {
            AppError::Validation(format!("Invalid {} ID.", K::SINGULAR.to_lowercase()))
        })
    }

    fn missing_record(&self) -> AppError {
        AppError::NotFound(format!("{} not found.", K::SINGULAR))
    }

    fn empty_collection(&self) -> AppError {
        AppError::NotFound(format!("No {} found.", K::PLURAL.to_lowercase()))
    }

    async fn load_all(&self) -> Result<Vec<Record<K::Fields>>> {
        self.store
            .find_all(K::COLLECTION)
            .await?
            .into_iter()
            .map(Record::from_document)
            .collect()
    }

    async fn load_one(&self, id: &ObjectId) -> Result<Option<Record<K::Fields>>> {
        self.store
            .find_by_id(K::COLLECTION, id)
            .await?
            .map(Record::from_document)
            .transpose()
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await? {
            Some(raw) => {
                debug!(key, "served from cache");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.cache.set(key, &raw, self.ttl).await
    }

    /// Deletes each key in order, waiting for every call to complete.
    async fn invalidate(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.cache.delete(key).await?;
        }
        debug!(collection = K::COLLECTION, ?keys, "cache keys invalidated");
        Ok(())
    }
}
