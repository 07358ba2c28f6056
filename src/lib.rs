//! Campus Cache - course and student records behind a read-through cache
//!
//! A REST API over a document store. Reads are served from the cache when
//! possible; every write invalidates the cached views it affects.

pub mod api;
pub mod cache;
pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_cleanup_task;
