use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::OllamaConfig;
use crate::infrastructure::http::JsonClient;
use crate::infrastructure::retry::RetryPolicy;

const EMBED_PATH: &str = "/api/embed";

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

/// Embeddings from a local Ollama server.
pub struct OllamaEmbedding {
    http: JsonClient,
    model: String,
    dimension: usize,
}

impl OllamaEmbedding {
    pub fn new(http: JsonClient, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            http,
            model: model.into(),
            dimension,
        }
    }

    pub fn from_config(config: &OllamaConfig, retry: RetryPolicy) -> Result<Self, DomainError> {
        let http = JsonClient::new(
            &config.url,
            Duration::from_secs(config.timeout_seconds),
            retry,
        )?;
        Ok(Self::new(http, &config.embedding_model, config.dimension))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, input: &str) -> Result<Vec<Vec<f32>>, DomainError> {
        let request = EmbedRequest {
            model: &self.model,
            input,
        };
        let response: EmbedResponse = self.http.post_json(EMBED_PATH, &request).await?;
        Ok(response.embeddings)
    }
}

#[async_trait]
impl EmbeddingService for OllamaEmbedding {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.request(text)
            .await?
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .map(Embedding::new)
            .ok_or(DomainError::EmptyEmbedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
