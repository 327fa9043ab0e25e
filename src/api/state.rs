use std::sync::Arc;

use crate::application::RagService;
use crate::domain::ports::VectorStore;
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub rag_service: Arc<RagService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        rag_service: Arc<RagService>,
        vector_store: Arc<dyn VectorStore>,
        config: Config,
    ) -> Self {
        Self {
            rag_service,
            vector_store,
            config: Arc::new(config),
        }
    }
}
