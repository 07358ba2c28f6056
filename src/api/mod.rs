//! API Module
//!
//! HTTP handlers and routing for the campus REST API.
//!
//! # Endpoints
//! - `/api/courses` - Course CRUD and statistics
//! - `/api/students` - Student CRUD and statistics
//! - `GET /health` - Health check endpoint

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::JsonBody;
pub use handlers::*;
pub use routes::create_router;
