use crate::domains::auth::JwtService;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Authenticated user information from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Outcome of bearer token extraction for one request
///
/// Protected routes answer differently for a missing header and a token that
/// failed verification, so both outcomes travel through request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    /// No Authorization header on the request
    Anonymous,
    /// A token was presented but did not verify
    InvalidToken,
    Authenticated(AuthUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// JWT authentication middleware
///
/// Extracts the JWT token from the Authorization header, verifies it, and adds
/// an AuthState to request extensions. Every request continues regardless;
/// public routes ignore the state entirely.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let state = extract_auth_state(&request, &jwt_service);

    match &state {
        AuthState::Authenticated(user) => debug!("Authenticated user: {}", user.user_id),
        AuthState::InvalidToken => debug!("Token failed verification"),
        AuthState::Anonymous => debug!("No authentication token"),
    }
    request.extensions_mut().insert(state);

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_state(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> AuthState {
    // Get Authorization header
    let Some(auth_header) = request.headers().get("authorization") else {
        return AuthState::Anonymous;
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return AuthState::InvalidToken;
    };

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    // Verify token
    match jwt_service.verify_token(token) {
        Ok(claims) => AuthState::Authenticated(AuthUser {
            user_id: claims.user_id,
        }),
        Err(_) => AuthState::InvalidToken,
    }
}
