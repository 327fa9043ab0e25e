use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::OllamaConfig;
use crate::infrastructure::http::JsonClient;
use crate::infrastructure::retry::RetryPolicy;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_ctx: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaLlm {
    http: JsonClient,
    model: String,
    context_window: u32,
}

impl OllamaLlm {
    pub fn new(http: JsonClient, model: impl Into<String>, context_window: u32) -> Self {
        Self {
            http,
            model: model.into(),
            context_window,
        }
    }

    pub fn from_config(config: &OllamaConfig, retry: RetryPolicy) -> Result<Self, DomainError> {
        let http = JsonClient::new(
            &config.url,
            Duration::from_secs(config.timeout_seconds),
            retry,
        )?;
        Ok(Self::new(http, &config.generation_model, config.context_window))
    }

    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_ctx: self.context_window,
            },
        };
        let response: GenerateResponse = self.http.post_json(GENERATE_PATH, &request).await?;
        Ok(response.response)
    }
}

#[async_trait]
impl LlmService for OllamaLlm {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.generate(prompt).await
    }
}
