//! Response models for the campus API
//!
//! Request payloads live with their entities (`CourseDraft`, `StudentDraft`).

pub mod responses;

// Re-export commonly used types
pub use responses::{
    retrieved_message, CacheStatsResponse, DataResponse, ErrorResponse, HealthResponse,
    ListResponse, MessageResponse,
};
