use api_shared::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qphotos_core::StoreError;
use qphotos_media::MediaError;

/// Failure of a REST request, rendered as `{"error": "..."}`.
///
/// Server-side failures are logged where they are converted and reach the
/// client only as an opaque message.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden,
    NotFound(String),
    Conflict(String),
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => ApiError::BadRequest(msg),
            StoreError::Forbidden => ApiError::Forbidden,
            StoreError::NotFound(path) => ApiError::NotFound(format!("Not found: {path}")),
            StoreError::Conflict(path) => ApiError::Conflict(format!("Already exists: {path}")),
            other => {
                tracing::error!("storage error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Store(e) => e.into(),
            other => {
                tracing::error!("image processing error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden path".to_owned()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_owned(),
            ),
        };

        (status, Json(ErrorRes { error: message })).into_response()
    }
}
