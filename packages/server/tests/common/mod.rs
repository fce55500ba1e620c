// Common test utilities

use std::sync::Arc;

use axum::http::HeaderValue;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use uuid::Uuid;

use analysis::AnalysisInvoker;
use server_core::domains::auth::JwtService;
use server_core::kernel::{MemoryStore, ServerDeps};
use server_core::server::build_app;

/// One in-memory app instance plus the JWT service that minted its tokens
pub struct TestApp {
    pub server: TestServer,
    pub jwt_service: Arc<JwtService>,
}

impl TestApp {
    /// Spin up the app over in-memory stores and the mock analysis pipeline
    pub fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let jwt_service = Arc::new(JwtService::new("test_secret", "test_issuer".to_string()));
        let deps = ServerDeps::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(AnalysisInvoker::mock()),
            jwt_service.clone(),
        );
        let server = TestServer::new(build_app(&deps, &[])).expect("test server should start");
        Self {
            server,
            jwt_service,
        }
    }

    /// Bearer header value carrying a fresh token for `user_id`
    pub fn bearer(&self, user_id: Uuid) -> HeaderValue {
        let token = self.jwt_service.create_token(user_id).unwrap();
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }
}

/// Multipart form holding one file under the `image` field
pub fn image_form(file_name: &str, mime: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "image",
        Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_type(mime.to_string()),
    )
}

/// A few bytes standing in for image content; nothing sniffs the payload
pub fn image_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]
}
