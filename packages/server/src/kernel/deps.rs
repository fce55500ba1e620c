//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to the router. Storage and the
//! analysis invoker sit behind traits and Arcs so tests can wire in-memory
//! backends without touching the wiring code.

use std::sync::Arc;

use analysis::{AnalysisInvoker, AnalysisMode};
use openai_client::OpenAIClient;
use tracing::info;

use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::kernel::memory::MemoryStore;
use crate::kernel::traits::{BaseImageStore, BaseObjectStore, BaseSetupStore};

/// Server dependencies accessible to routes (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub setup_store: Arc<dyn BaseSetupStore>,
    pub image_store: Arc<dyn BaseImageStore>,
    /// Raw image bytes, addressed by storage path
    pub object_store: Arc<dyn BaseObjectStore>,
    /// Analysis pipeline entry point (mock or live)
    pub invoker: Arc<AnalysisInvoker>,
    /// JWT service for token creation and verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        setup_store: Arc<dyn BaseSetupStore>,
        image_store: Arc<dyn BaseImageStore>,
        object_store: Arc<dyn BaseObjectStore>,
        invoker: Arc<AnalysisInvoker>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            setup_store,
            image_store,
            object_store,
            invoker,
            jwt_service,
        }
    }

    /// Wire the default in-memory stack from configuration
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());

        let invoker = match (config.analysis_mode(), config.openai_api_key.as_deref()) {
            (AnalysisMode::Live, Some(key)) => {
                info!("Analysis pipeline running in live mode");
                AnalysisInvoker::live(OpenAIClient::new(key))
            }
            _ => {
                info!("Analysis pipeline running in mock mode");
                AnalysisInvoker::mock()
            }
        };

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
        ));

        Self::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(invoker),
            jwt_service,
        )
    }
}
