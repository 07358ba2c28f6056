//! Document Store Module
//!
//! Generic CRUD access to document collections keyed by [`ObjectId`].
//!
//! Failures are surfaced immediately; nothing in this layer retries.

mod memory;
mod mongo;
mod object_id;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::{AppError, Result};

pub use memory::{MemoryDocumentStore, StoreCalls};
pub use mongo::MongoDocumentStore;
pub use object_id::{InvalidObjectId, ObjectId, OBJECT_ID_LEN};

/// A stored document: field name to JSON value.
pub type Document = Map<String, Value>;

/// Name of the identifier field carried by every stored document.
pub const ID_FIELD: &str = "_id";

/// Identifiers are assigned by the store and never written by callers.
pub(crate) fn reject_id_field(fields: &Document, operation: &str) -> Result<()> {
    if fields.contains_key(ID_FIELD) {
        error!(operation, "rejected write to immutable field {}", ID_FIELD);
        return Err(AppError::StoreOperationFailed(format!(
            "{}: field '{}' is immutable",
            operation, ID_FIELD
        )));
    }
    Ok(())
}

// == Document Store ==
/// Gateway to the document store.
///
/// Every operation fails with `StoreUnavailable` when the connection is not
/// established and with `StoreOperationFailed` for store-level failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches one document, or `None` when no document has this id.
    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>>;

    /// Fetches every document of a collection in store order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Inserts a document and returns it with its generated `_id`.
    async fn create(&self, collection: &str, fields: Document) -> Result<Document>;

    /// Replaces the named top-level fields, leaving the others untouched.
    ///
    /// Returns the document after the merge, or `None` when nothing matched.
    async fn update(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<Option<Document>>;

    /// Removes a document. Returns false when nothing matched.
    async fn delete(&self, collection: &str, id: &ObjectId) -> Result<bool>;

    /// Closes the connection. Later operations fail with `StoreUnavailable`.
    async fn close(&self) -> Result<()>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
