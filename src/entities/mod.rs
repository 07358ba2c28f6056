//! Entities Module
//!
//! Stored record shape and the per-type capabilities the generic
//! [`EntityService`](crate::service::EntityService) is parameterized by.

mod course;
mod fields;
mod student;

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;
use crate::store::{Document, ObjectId};

pub use course::{Course, CourseDraft, CourseStats, Courses};
pub use fields::{parse_date, required_text};
pub use student::{Student, StudentDraft, StudentStats, Students};

// == Record ==
/// A stored entity: identifier, type-specific fields and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: F,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<F: DeserializeOwned> Record<F> {
    /// Decodes a stored document.
    pub fn from_document(document: Document) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(document))?)
    }
}

// == Entity Kind ==
/// Capability set for one entity type.
pub trait EntityKind: Send + Sync + 'static {
    /// Type-specific stored fields.
    type Fields: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Request payload for create and update; every field optional.
    type Draft: DeserializeOwned + Debug + Default + Send + 'static;

    /// Aggregate recomputed from the whole collection.
    type Stats: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Store collection name.
    const COLLECTION: &'static str;

    /// Display name of one record, e.g. "Course".
    const SINGULAR: &'static str;

    /// Display name of the collection, e.g. "Courses".
    const PLURAL: &'static str;

    /// Builds new fields, failing with `Validation` when a required field is
    /// missing or malformed.
    fn from_draft(draft: Self::Draft) -> Result<Self::Fields>;

    /// Rejects a patch that names no field at all.
    fn check_patch(patch: &Self::Draft) -> Result<()>;

    /// Applies a partial update. Omitted fields keep their current values.
    fn merge(current: &Self::Fields, patch: Self::Draft) -> Result<Self::Fields>;

    /// Computes the statistics summary. `records` is never empty.
    fn summarize(records: &[Record<Self::Fields>], current_year: i32) -> Self::Stats;
}
