//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode, Uri,
    },
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use analysis::AnalysisInvoker;

use crate::domains::images::ImageService;
use crate::domains::setups::SetupService;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    analysis_history_handler, analyze_handler, analyze_image_handler,
    analyze_saved_image_handler, delete_image_handler, delete_setup_handler, get_setup_handler,
    health_handler, list_images_handler, list_setups_handler, save_setup_handler,
    update_setup_handler, upload_image_handler,
};

// Multipart bodies carry up to a 10MB image plus form overhead
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub setups: Arc<SetupService>,
    pub images: Arc<ImageService>,
    pub invoker: Arc<AnalysisInvoker>,
    pub started_at: Instant,
}

/// Build the Axum application router
pub fn build_app(deps: &ServerDeps, allowed_origins: &[String]) -> Router {
    // Create domain services over the shared stores
    let setups = Arc::new(SetupService::new(deps.setup_store.clone()));
    let images = Arc::new(ImageService::new(
        deps.image_store.clone(),
        deps.object_store.clone(),
        deps.invoker.clone(),
    ));

    // Create shared app state
    let app_state = AxumAppState {
        setups,
        images,
        invoker: deps.invoker.clone(),
        started_at: Instant::now(),
    };

    // CORS configuration - explicit origins when configured, any otherwise
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| warn!(origin = %o, "ignoring unparseable allowed origin"))
                .ok()
        }))
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Clone jwt_service for middleware closure
    let jwt_service_for_middleware = deps.jwt_service.clone();

    // Build router
    Router::new()
        // Analysis pipeline
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze-image", post(analyze_image_handler))
        .route("/api/analyze-saved-image", post(analyze_saved_image_handler))
        // Image management
        .route("/api/upload-tank-image", post(upload_image_handler))
        .route("/api/user-tank-images", get(list_images_handler))
        .route("/api/user-tank-images/:id", delete(delete_image_handler))
        // Saved setups
        .route(
            "/api/tank-setups",
            post(save_setup_handler).get(list_setups_handler),
        )
        .route(
            "/api/tank-setups/:id",
            get(get_setup_handler)
                .put(update_setup_handler)
                .delete(delete_setup_handler),
        )
        // History and health
        .route("/api/analysis-history", get(analysis_history_handler))
        .route("/api/health", get(health_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        })) // JWT authentication
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Fallback for unknown routes
async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Route not found",
            "status": "error",
            "path": uri.path(),
        })),
    )
}
