use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorStore, DistanceMetric, DomainError, Embedding, ScoredPoint, StoredPoint,
};

struct Collection {
    dimension: usize,
    metric: DistanceMetric,
    points: Vec<StoredPoint>,
}

/// Brute-force store for tests and local runs without Qdrant.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of a collection's points in insertion order.
    pub fn points(&self, collection: &str) -> Vec<StoredPoint> {
        self.collections
            .read()
            .ok()
            .and_then(|store| store.get(collection).map(|c| c.points.clone()))
            .unwrap_or_default()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        let mut store = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.entry(collection.to_string()).or_insert(Collection {
            dimension,
            metric,
            points: Vec::new(),
        });
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError> {
        let mut store = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let target = store
            .get_mut(collection)
            .ok_or_else(|| DomainError::not_found(format!("collection {collection}")))?;

        if let Some(bad) = points.iter().find(|p| p.vector.dimension() != target.dimension) {
            return Err(DomainError::validation(format!(
                "vector of dimension {} does not fit collection {collection} ({})",
                bad.vector.dimension(),
                target.dimension
            )));
        }

        for point in points {
            target.points.retain(|p| p.id != point.id);
            target.points.push(point);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let store = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let target = store
            .get(collection)
            .ok_or_else(|| DomainError::not_found(format!("collection {collection}")))?;

        if vector.dimension() != target.dimension {
            return Err(DomainError::validation(format!(
                "query of dimension {} does not fit collection {collection} ({})",
                vector.dimension(),
                target.dimension
            )));
        }

        let mut results: Vec<ScoredPoint> = target
            .points
            .iter()
            .map(|point| ScoredPoint {
                id: point.id.to_string(),
                payload: point.payload.clone(),
                score: target.metric.score(vector, &point.vector),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
