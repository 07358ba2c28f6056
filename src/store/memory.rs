//! In-Memory Document Store
//!
//! Collections of JSON documents held behind a shared lock, listed in
//! insertion order.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::{reject_id_field, Document, DocumentStore, ObjectId, ID_FIELD};
use crate::error::{AppError, Result};

// == Collection ==
/// Documents keyed by insertion sequence, with an id index.
#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    documents: BTreeMap<u64, Document>,
    index: HashMap<ObjectId, u64>,
}

impl Collection {
    fn insert(&mut self, id: ObjectId, document: Document) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.documents.insert(seq, document);
        self.index.insert(id, seq);
    }

    fn get(&self, id: &ObjectId) -> Option<&Document> {
        self.index.get(id).and_then(|seq| self.documents.get(seq))
    }

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Document> {
        let seq = self.index.get(id)?;
        self.documents.get_mut(seq)
    }

    fn remove(&mut self, id: &ObjectId) -> bool {
        match self.index.remove(id) {
            Some(seq) => self.documents.remove(&seq).is_some(),
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

// == Store Calls ==
/// Snapshot of how many times each store operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCalls {
    pub find_by_id: u64,
    pub find_all: u64,
    pub create: u64,
    pub update: u64,
    pub delete: u64,
}

impl StoreCalls {
    /// Sum of all operations.
    pub fn total(&self) -> u64 {
        self.find_by_id + self.find_all + self.create + self.update + self.delete
    }

    /// Number of read operations.
    pub fn reads(&self) -> u64 {
        self.find_by_id + self.find_all
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    find_by_id: AtomicU64,
    find_all: AtomicU64,
    create: AtomicU64,
    update: AtomicU64,
    delete: AtomicU64,
}

impl CallCounters {
    fn snapshot(&self) -> StoreCalls {
        StoreCalls {
            find_by_id: self.find_by_id.load(Ordering::Relaxed),
            find_all: self.find_all.load(Ordering::Relaxed),
            create: self.create.load(Ordering::Relaxed),
            update: self.update.load(Ordering::Relaxed),
            delete: self.delete.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

// == Memory Document Store ==
/// Document store kept in process memory.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    /// Logical database name, reported in logs only
    database: String,
    /// Collections by name
    collections: RwLock<HashMap<String, Collection>>,
    /// False once the store has been closed
    connected: AtomicBool,
    calls: CallCounters,
}

impl MemoryDocumentStore {
    /// Opens a connected, empty store.
    pub async fn connect(database: impl Into<String>) -> Result<Self> {
        let database = database.into();
        info!(database = %database, "document store connected");

        Ok(Self {
            database,
            collections: RwLock::new(HashMap::new()),
            connected: AtomicBool::new(true),
            calls: CallCounters::default(),
        })
    }

    /// Returns the operation counters.
    pub fn calls(&self) -> StoreCalls {
        self.calls.snapshot()
    }

    /// Returns the number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Collection::len)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            error!(database = %self.database, "document store used after close");
            Err(AppError::StoreUnavailable(format!(
                "database '{}' is not connected",
                self.database
            )))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        bump(&self.calls.find_by_id);
        self.ensure_connected()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        bump(&self.calls.find_all);
        self.ensure_connected()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.documents.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Document) -> Result<Document> {
        bump(&self.calls.create);
        self.ensure_connected()?;
        reject_id_field(&fields, "create")?;

        let id = ObjectId::new();
        let mut document = Document::new();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
        document.extend(fields);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());

        debug!(collection, %id, "document created");
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<Option<Document>> {
        bump(&self.calls.update);
        self.ensure_connected()?;
        reject_id_field(&fields, "update")?;

        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };

        for (key, value) in fields {
            document.insert(key, value);
        }

        debug!(collection, %id, "document updated");
        Ok(Some(document.clone()))
    }

    async fn delete(&self, collection: &str, id: &ObjectId) -> Result<bool> {
        bump(&self.calls.delete);
        self.ensure_connected()?;

        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .map_or(false, |docs| docs.remove(id));

        debug!(collection, %id, removed, "document delete");
        Ok(removed)
    }

    async fn close(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::AcqRel) {
            info!(database = %self.database, "document store closed");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
