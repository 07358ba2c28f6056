//! Service Module
//!
//! Read-through caching and write invalidation for one entity type.
//!
//! Reads consult the cache first and repopulate it from the store on a miss.
//! Mutations hit the store first; once the store call has returned, the
//! affected cache keys are invalidated or overwritten. Nothing serializes
//! concurrent operations on the same record, so a reader racing a writer may
//! briefly observe the previous value.

mod entity_service;


pub use entity_service::{EntityService, Fetched, Source};

use crate::entities::{Courses, Students};

/// Course service.
pub type CourseService = EntityService<Courses>;

/// Student service.
pub type StudentService = EntityService<Students>;
