use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Single non-streaming completion of `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}
