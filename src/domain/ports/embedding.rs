use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Fails with [`DomainError::EmptyEmbedding`] when the service answers
    /// with no vectors.
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    fn dimension(&self) -> usize;
}
