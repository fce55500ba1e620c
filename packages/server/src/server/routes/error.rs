//! API error type shared by all route handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::images::ImageError;
use crate::domains::setups::SetupError;
use crate::server::middleware::{AuthState, AuthUser};

/// Route-level error carrying the HTTP status and the client-facing message
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SetupError> for ApiError {
    fn from(e: SetupError) -> Self {
        match e {
            SetupError::NotFound => ApiError::NotFound(e.to_string()),
            SetupError::Livestock { .. } | SetupError::Store(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::LimitReached | ImageError::InvalidType | ImageError::TooLarge => {
                ApiError::BadRequest(e.to_string())
            }
            ImageError::NotFound => ApiError::NotFound(e.to_string()),
            ImageError::Download | ImageError::Analysis(_) | ImageError::Store(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

/// Resolve the request's auth state or answer 401
///
/// The message distinguishes a missing header from a token that failed
/// verification.
pub fn require_user(state: &AuthState) -> Result<&AuthUser, ApiError> {
    match state {
        AuthState::Authenticated(user) => Ok(user),
        AuthState::Anonymous => Err(ApiError::Unauthorized("Authorization required".to_string())),
        AuthState::InvalidToken => Err(ApiError::Unauthorized("Invalid token".to_string())),
    }
}

/// Multipart bodies that cannot be read map to a generic 400
pub fn invalid_form() -> ApiError {
    ApiError::BadRequest("Invalid form data".to_string())
}
