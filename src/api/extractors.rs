//! Request extractors
//!
//! Wrappers around axum extractors whose rejections use the API error body.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body.
///
/// Same as [`axum::Json`], but a missing content type, malformed JSON or a
/// field of the wrong type is rejected as a validation error (400 `{error}`)
/// instead of axum's plain-text 415/400/422.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CourseDraft;
    use axum::body::Body;

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header("content-type", value);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let JsonBody(draft) = JsonBody::<CourseDraft>::from_request(
            request(Some("application/json"), r#"{"title":"Rust"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(draft.title.as_deref(), Some("Rust"));
        assert!(draft.category.is_none());
    }

    #[tokio::test]
    async fn test_rejections_become_validation_errors() {
        let cases = [
            (Some("application/json"), r#"{"title":5}"#),
            (Some("application/json"), "{"),
            (None, r#"{"title":"Rust"}"#),
        ];

        for (content_type, body) in cases {
            let result =
                JsonBody::<CourseDraft>::from_request(request(content_type, body), &()).await;
            assert!(
                matches!(result, Err(AppError::Validation(ref msg)) if msg.starts_with("Invalid request body")),
                "body {:?} was not rejected as a validation error",
                body
            );
        }
    }
}
