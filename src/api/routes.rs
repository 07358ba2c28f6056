//! API Routes
//!
//! Configures the Axum router with the course, student and health endpoints.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, delete_handler, get_handler, health_handler, list_handler, stats_handler,
    update_handler, AppState,
};
use crate::entities::EntityKind;
use crate::service::EntityService;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `/api/courses` and `/api/students`, each with:
///   - `POST /` - Create a record
///   - `GET /` - List all records
///   - `GET /stats` - Collection statistics
///   - `GET /:id` - Fetch one record
///   - `PUT /:id` - Partially update a record
///   - `DELETE /:id` - Delete a record
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/courses", entity_routes(state.courses.clone()))
        .nest("/api/students", entity_routes(state.students.clone()))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes for one entity type, bound to its service.
///
/// `/stats` is a static segment and always wins over `/:id`.
fn entity_routes<K: EntityKind, S>(service: Arc<EntityService<K>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_handler::<K>).post(create_handler::<K>))
        .route("/stats", get(stats_handler::<K>))
        .route(
            "/:id",
            get(get_handler::<K>)
                .put(update_handler::<K>)
                .delete(delete_handler::<K>),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::Config;
    use crate::store::MemoryDocumentStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let store = Arc::new(MemoryDocumentStore::connect("test").await.unwrap());
        let state = AppState::new(store, Arc::new(MemoryCache::new()), &Config::default());
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_route_is_not_an_id() {
        let app = create_test_app().await;

        // Empty collection: 404 from the stats path, not 400 for a bad id
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/students/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/students")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","dateOfBirth":"1990-12-10"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_invalid_id() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/courses/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/teachers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
