//! MongoDB Document Store
//!
//! Document store over the official MongoDB driver. Documents cross the
//! boundary as JSON maps; `_id` is stored as a native BSON object id.

use async_trait::async_trait;
use bson::{doc, oid, Bson};
use mongodb::{
    error::Error as MongoError,
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, Collection,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::{reject_id_field, Document, DocumentStore, ObjectId, ID_FIELD};
use crate::error::{AppError, Result};

fn operation_failed(operation: &str, collection: &str, err: MongoError) -> AppError {
    error!(operation, collection, error = %err, "mongodb operation failed");
    AppError::StoreOperationFailed(format!("{} {}: {}", operation, collection, err))
}

/// Converts a JSON document into BSON for writing.
fn to_bson(fields: &Document) -> Result<bson::Document> {
    bson::to_document(fields)
        .map_err(|e| AppError::StoreOperationFailed(format!("cannot encode document: {}", e)))
}

/// Converts a stored BSON document back to JSON, rendering `_id` as hex.
fn from_bson(mut stored: bson::Document) -> Result<Document> {
    let id = match stored.remove(ID_FIELD) {
        Some(Bson::ObjectId(id)) => id,
        other => {
            return Err(AppError::StoreOperationFailed(format!(
                "stored document has no object id: {:?}",
                other
            )))
        }
    };

    let Value::Object(fields) = Bson::Document(stored).into_relaxed_extjson() else {
        return Err(AppError::StoreOperationFailed(
            "stored document is not an object".to_string(),
        ));
    };

    let mut document = Document::new();
    document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
    document.extend(fields);
    Ok(document)
}

fn id_filter(id: &ObjectId) -> bson::Document {
    let raw: oid::ObjectId = (*id).into();
    doc! { "_id": raw }
}

// == Mongo Document Store ==
/// Document store backed by a MongoDB database.
///
/// The client is connected once by [`MongoDocumentStore::connect`] and shared
/// by every caller. Commands are not retried.
pub struct MongoDocumentStore {
    database: String,
    /// `None` once closed
    client: RwLock<Option<Client>>,
}

impl MongoDocumentStore {
    /// Opens a client and verifies it with `ping`.
    pub async fn connect(uri: &str, database: impl Into<String>) -> Result<Self> {
        let database = database.into();

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("invalid MongoDB uri: {}", e)))?;

        client
            .database(&database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("MongoDB ping failed: {}", e)))?;

        info!(database = %database, "MongoDB connected");
        Ok(Self {
            database,
            client: RwLock::new(Some(client)),
        })
    }

    async fn collection(&self, name: &str) -> Result<Collection<bson::Document>> {
        match self.client.read().await.as_ref() {
            Some(client) => Ok(client.database(&self.database).collection(name)),
            None => {
                error!(database = %self.database, "MongoDB store used after close");
                Err(AppError::StoreUnavailable(format!(
                    "database '{}' is not connected",
                    self.database
                )))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        let stored = self
            .collection(collection)
            .await?
            .find_one(id_filter(id), None)
            .await
            .map_err(|e| operation_failed("find_one", collection, e))?;

        stored.map(from_bson).transpose()
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let mut cursor = self
            .collection(collection)
            .await?
            .find(None, None)
            .await
            .map_err(|e| operation_failed("find", collection, e))?;

        let mut documents = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| operation_failed("find", collection, e))?
        {
            let stored = cursor
                .deserialize_current()
                .map_err(|e| operation_failed("find", collection, e))?;
            documents.push(from_bson(stored)?);
        }
        Ok(documents)
    }

    async fn create(&self, collection: &str, fields: Document) -> Result<Document> {
        reject_id_field(&fields, "create")?;
        let target = self.collection(collection).await?;

        let mut stored = doc! { "_id": oid::ObjectId::new() };
        for (key, value) in to_bson(&fields)? {
            stored.insert(key, value);
        }

        target
            .insert_one(&stored, None)
            .await
            .map_err(|e| operation_failed("insert_one", collection, e))?;

        debug!(collection, "document created");
        from_bson(stored)
    }

    async fn update(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<Option<Document>> {
        reject_id_field(&fields, "update")?;
        let target = self.collection(collection).await?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let stored = target
            .find_one_and_update(id_filter(id), doc! { "$set": to_bson(&fields)? }, options)
            .await
            .map_err(|e| operation_failed("find_one_and_update", collection, e))?;

        debug!(collection, %id, matched = stored.is_some(), "document update");
        stored.map(from_bson).transpose()
    }

    async fn delete(&self, collection: &str, id: &ObjectId) -> Result<bool> {
        let result = self
            .collection(collection)
            .await?
            .delete_one(id_filter(id), None)
            .await
            .map_err(|e| operation_failed("delete_one", collection, e))?;

        debug!(collection, %id, deleted = result.deleted_count, "document delete");
        Ok(result.deleted_count > 0)
    }

    async fn close(&self) -> Result<()> {
        if let Some(client) = self.client.write().await.take() {
            client.shutdown().await;
            info!(database = %self.database, "MongoDB closed");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_of(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_bson_round_trip_renders_hex_id() {
        let raw = oid::ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let mut stored = doc! { "_id": raw };
        let fields = doc_of(json!({"title": "Rust", "createdAt": "2024-09-01T00:00:00Z"}));
        for (key, value) in to_bson(&fields).unwrap() {
            stored.insert(key, value);
        }

        let document = from_bson(stored).unwrap();

        assert_eq!(document[ID_FIELD], "507f1f77bcf86cd799439011");
        assert_eq!(document["title"], "Rust");
        assert_eq!(document["createdAt"], "2024-09-01T00:00:00Z");
    }

    #[test]
    fn test_document_without_object_id_is_rejected() {
        let result = from_bson(doc! { "_id": "not-an-oid", "title": "x" });
        assert!(matches!(result, Err(AppError::StoreOperationFailed(_))));
    }

    #[test]
    fn test_id_filter_uses_native_object_id() {
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let filter = id_filter(&id);
        assert!(matches!(filter.get(ID_FIELD), Some(Bson::ObjectId(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_uri() {
        let result = MongoDocumentStore::connect("not-a-mongodb-uri", "campus").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    /// Needs a running server: `MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_crud_against_live_server() {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let store = MongoDocumentStore::connect(&uri, "campus_cache_test")
            .await
            .unwrap();
        let collection = format!("courses_{}", ObjectId::new());

        let created = store
            .create(&collection, doc_of(json!({"title": "Rust", "category": "Systems"})))
            .await
            .unwrap();
        let id = ObjectId::parse_str(created[ID_FIELD].as_str().unwrap()).unwrap();

        let found = store.find_by_id(&collection, &id).await.unwrap();
        assert_eq!(found, Some(created));

        let updated = store
            .update(&collection, &id, doc_of(json!({"title": "Advanced Rust"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["title"], "Advanced Rust");
        assert_eq!(updated["category"], "Systems");

        assert_eq!(store.find_all(&collection).await.unwrap().len(), 1);
        assert!(store.delete(&collection, &id).await.unwrap());
        assert!(!store.delete(&collection, &id).await.unwrap());

        store.close().await.unwrap();
        assert!(matches!(
            store.find_all(&collection).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
