use crate::domain::{errors::DomainError, DistanceMetric, Embedding, ScoredPoint, StoredPoint};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection only if it does not exist yet.
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError>;

    /// Insert-or-replace by point id.
    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError>;

    /// Nearest neighbours, best first, at most `top_k`.
    async fn query(
        &self,
        collection: &str,
        vector: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError>;

    async fn health_check(&self) -> Result<(), DomainError>;
}
