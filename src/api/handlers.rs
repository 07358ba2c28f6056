//! API Handlers
//!
//! HTTP request handlers, generic over the entity type.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::extractors::JsonBody;
use crate::cache::CacheGateway;
use crate::config::Config;
use crate::entities::{EntityKind, Record};
use crate::error::Result;
use crate::models::{
    retrieved_message, DataResponse, HealthResponse, ListResponse, MessageResponse,
};
use crate::service::{CourseService, EntityService, StudentService};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// The store and cache handles are created once at startup and shared by
/// both entity services.
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<CourseService>,
    pub students: Arc<StudentService>,
    pub store: Arc<dyn DocumentStore>,
    pub cache: Arc<dyn CacheGateway>,
}

impl AppState {
    /// Builds both entity services over the shared store and cache.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn CacheGateway>,
        config: &Config,
    ) -> Self {
        Self {
            courses: Arc::new(EntityService::new(
                store.clone(),
                cache.clone(),
                config.course_keys.clone(),
                config.cache_ttl,
            )),
            students: Arc::new(EntityService::new(
                store.clone(),
                cache.clone(),
                config.student_keys.clone(),
                config.cache_ttl,
            )),
            store,
            cache,
        }
    }
}

/// Handler for POST /api/{entity}
pub async fn create_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
    JsonBody(draft): JsonBody<K::Draft>,
) -> Result<(StatusCode, Json<DataResponse<Record<K::Fields>>>)> {
    let record = service.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            format!("{} created successfully.", K::SINGULAR),
            record,
        )),
    ))
}

/// Handler for GET /api/{entity}
pub async fn list_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
) -> Result<Json<ListResponse<Record<K::Fields>>>> {
    let fetched = service.get_all().await?;

    Ok(Json(ListResponse::new(
        retrieved_message(K::PLURAL, fetched.source),
        fetched.data,
    )))
}

/// Handler for GET /api/{entity}/:id
pub async fn get_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Record<K::Fields>>>> {
    let fetched = service.get_one(&id).await?;

    Ok(Json(DataResponse::new(
        retrieved_message(K::SINGULAR, fetched.source),
        fetched.data,
    )))
}

/// Handler for PUT /api/{entity}/:id
pub async fn update_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<K::Draft>,
) -> Result<Json<DataResponse<Record<K::Fields>>>> {
    let record = service.update(&id, patch).await?;

    Ok(Json(DataResponse::new(
        format!("{} updated successfully.", K::SINGULAR),
        record,
    )))
}

/// Handler for DELETE /api/{entity}/:id
pub async fn delete_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    service.delete(&id).await?;

    Ok(Json(MessageResponse::new(format!(
        "{} deleted successfully.",
        K::SINGULAR
    ))))
}

/// Handler for GET /api/{entity}/stats
pub async fn stats_handler<K: EntityKind>(
    State(service): State<Arc<EntityService<K>>>,
) -> Result<Json<DataResponse<K::Stats>>> {
    let fetched = service.get_stats().await?;
    let subject = format!("{} statistics", K::SINGULAR);

    Ok(Json(DataResponse::new(
        retrieved_message(&subject, fetched.source),
        fetched.data,
    )))
}

/// Handler for GET /health
///
/// Includes cache hit/miss counters when the cache backend keeps them.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let counters = state.cache.counters().await;

    Json(
        HealthResponse::healthy(state.store.backend(), state.cache.backend())
            .with_cache_stats(counters),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::entities::{CourseDraft, Courses, StudentDraft, Students};
    use crate::error::AppError;
    use crate::store::MemoryDocumentStore;

    async fn test_state() -> AppState {
        let store = Arc::new(MemoryDocumentStore::connect("test").await.unwrap());
        AppState::new(store, Arc::new(MemoryCache::new()), &Config::default())
    }

    fn course_draft() -> CourseDraft {
        CourseDraft {
            title: Some("Rust".into()),
            description: Some("Ownership".into()),
            category: Some("Systems".into()),
            instructor: Some("Ferris".into()),
            start_date: Some("2024-09-01".into()),
            end_date: Some("2024-12-20".into()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_handler() {
        let state = test_state().await;

        let (status, created) =
            create_handler::<Courses>(State(state.courses.clone()), JsonBody(course_draft()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.message, "Course created successfully.");

        let id = created.data.id.to_hex();
        let first = get_handler::<Courses>(State(state.courses.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(first.message, "Course retrieved successfully.");

        let second = get_handler::<Courses>(State(state.courses.clone()), Path(id))
            .await
            .unwrap();
        assert_eq!(second.message, "Course retrieved successfully from cache.");
    }

    #[tokio::test]
    async fn test_list_handler_empty() {
        let state = test_state().await;

        let result = list_handler::<Students>(State(state.students.clone())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_handler_counts() {
        let state = test_state().await;
        for name in ["Ada", "Alan"] {
            create_handler::<Students>(
                State(state.students.clone()),
                JsonBody(StudentDraft {
                    first_name: Some(name.into()),
                    last_name: Some("X".into()),
                    email: Some("x@example.com".into()),
                    date_of_birth: Some("1999-01-01".into()),
                }),
            )
            .await
            .unwrap();
        }

        let response = list_handler::<Students>(State(state.students.clone()))
            .await
            .unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.message, "Students retrieved successfully.");
    }

    #[tokio::test]
    async fn test_stats_handler_message() {
        let state = test_state().await;
        create_handler::<Courses>(State(state.courses.clone()), JsonBody(course_draft()))
            .await
            .unwrap();

        let response = stats_handler::<Courses>(State(state.courses.clone()))
            .await
            .unwrap();
        assert_eq!(response.message, "Course statistics retrieved successfully.");
        assert_eq!(response.data.total_courses, 1);
    }

    #[tokio::test]
    async fn test_delete_handler_invalid_id() {
        let state = test_state().await;

        let result =
            delete_handler::<Courses>(State(state.courses.clone()), Path("nope".into())).await;
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg == "Invalid course ID."));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = test_state().await;
        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.store, "memory");
        assert_eq!(response.cache, "memory");
    }

    #[tokio::test]
    async fn test_health_handler_reports_hit_rate() {
        let state = test_state().await;
        let (_, created) =
            create_handler::<Courses>(State(state.courses.clone()), JsonBody(course_draft()))
                .await
                .unwrap();
        let id = created.data.id.to_hex();

        // miss then hit
        for _ in 0..2 {
            get_handler::<Courses>(State(state.courses.clone()), Path(id.clone()))
                .await
                .unwrap();
        }

        let response = health_handler(State(state)).await;
        let stats = response.cache_stats.as_ref().unwrap();
        assert_eq!(stats.counters.gets, 2);
        assert_eq!(stats.counters.hits, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }
}
