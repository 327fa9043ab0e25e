use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, CreateCollectionBuilder, Distance, PointId,
    PointStruct, Query, QueryPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{
    ports::VectorStore, DistanceMetric, DomainError, Embedding, Metadata, ScoredPoint,
    StoredPoint,
};
use crate::infrastructure::config::QdrantConfig;
use crate::infrastructure::retry::RetryPolicy;

pub struct QdrantVectorStore {
    client: Qdrant,
    retry: RetryPolicy,
}

impl QdrantVectorStore {
    pub fn new(config: &QdrantConfig, retry: RetryPolicy) -> Result<Self, DomainError> {
        let mut builder =
            Qdrant::from_url(&config.url).timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::internal(format!("failed to build Qdrant client: {e}")))?;

        Ok(Self { client, retry })
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, DomainError> {
        self.retry
            .run("collection_exists", || async move {
                self.client
                    .collection_exists(collection)
                    .await
                    .map_err(store_error)
            })
            .await
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    #[instrument(skip(self))]
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, distance(metric))),
            )
            .await;

        match created {
            Ok(_) => {
                info!(collection, dimension, "created collection");
                Ok(())
            }
            Err(e) => {
                // Another ingester may have created it in the meantime.
                if self.collection_exists(collection).await.unwrap_or(false) {
                    info!(collection, error = %e, "collection appeared concurrently");
                    Ok(())
                } else {
                    Err(store_error(e))
                }
            }
        }
    }

    #[instrument(skip(self, points), fields(count = points.len()))]
    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError> {
        if points.is_empty() {
            return Ok(());
        }

        let points = points
            .into_iter()
            .map(|point| {
                let payload = Payload::try_from(Value::Object(point.payload))
                    .map_err(|e| DomainError::internal(format!("invalid payload: {e}")))?;
                Ok(PointStruct::new(
                    point.id.to_string(),
                    point.vector.into_inner(),
                    payload,
                ))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        let points = &points;

        self.retry
            .run("upsert_points", || async move {
                self.client
                    .upsert_points(UpsertPointsBuilder::new(collection, points.clone()).wait(true))
                    .await
                    .map_err(store_error)
            })
            .await?;

        Ok(())
    }

    #[instrument(skip(self, vector))]
    async fn query(
        &self,
        collection: &str,
        vector: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let response = self
            .retry
            .run("query_points", || async move {
                self.client
                    .query(
                        QueryPointsBuilder::new(collection)
                            .query(Query::new_nearest(vector.as_slice().to_vec()))
                            .limit(top_k as u64)
                            .with_payload(true),
                    )
                    .await
                    .map_err(store_error)
            })
            .await?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point_id_string(point.id),
                payload: payload_to_metadata(point.payload),
                score: point.score,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.client.health_check().await.map_err(store_error)?;
        Ok(())
    }
}

fn distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Dot => Distance::Dot,
        DistanceMetric::Euclid => Distance::Euclid,
    }
}

// gRPC status codes that no retry can fix.
const INVALID_ARGUMENT: i32 = 3;
const NOT_FOUND: i32 = 5;
const FAILED_PRECONDITION: i32 = 9;

fn store_error(e: QdrantError) -> DomainError {
    match e {
        QdrantError::ResponseError { status } => {
            status_error(i32::from(status.code()), status.message())
        }
        QdrantError::ConversionError(msg) => DomainError::validation(format!("qdrant: {msg}")),
        other => DomainError::unavailable(format!("qdrant: {other}")),
    }
}

fn status_error(code: i32, message: &str) -> DomainError {
    let msg = format!("qdrant: {message}");
    match code {
        INVALID_ARGUMENT | FAILED_PRECONDITION => DomainError::validation(msg),
        NOT_FOUND => DomainError::not_found(msg),
        _ => DomainError::unavailable(msg),
    }
}

fn point_id_string(id: Option<PointId>) -> String {
    match id.and_then(|id| id.point_id_options) {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

fn payload_to_metadata(payload: HashMap<String, QdrantValue>) -> Metadata {
    payload
        .into_iter()
        .map(|(key, value)| (key, to_json(value)))
        .collect()
}

fn to_json(value: QdrantValue) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(list.values.into_iter().map(to_json).collect()),
        Some(Kind::StructValue(object)) => Value::Object(
            object
                .fields
                .into_iter()
                .map(|(key, value)| (key, to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::{ListValue, Struct};
    use serde_json::json;

    fn value(kind: Kind) -> QdrantValue {
        QdrantValue { kind: Some(kind) }
    }

    #[test]
    fn test_payload_converts_nested_values() {
        let mut nested = HashMap::new();
        nested.insert("depth".to_string(), value(Kind::IntegerValue(2)));

        let mut payload = HashMap::new();
        payload.insert("title".to_string(), value(Kind::StringValue("Caves".into())));
        payload.insert("score".to_string(), value(Kind::DoubleValue(0.5)));
        payload.insert("draft".to_string(), value(Kind::BoolValue(false)));
        payload.insert(
            "tags".to_string(),
            value(Kind::ListValue(ListValue {
                values: vec![value(Kind::StringValue("a".into()))],
            })),
        );
        payload.insert(
            "extra".to_string(),
            value(Kind::StructValue(Struct { fields: nested })),
        );
        payload.insert("missing".to_string(), QdrantValue { kind: None });

        let meta = payload_to_metadata(payload);

        assert_eq!(
            Value::Object(meta),
            json!({
                "title": "Caves",
                "score": 0.5,
                "draft": false,
                "tags": ["a"],
                "extra": {"depth": 2},
                "missing": null
            })
        );
    }

    #[test]
    fn test_point_ids_render_as_strings() {
        let uuid = PointId {
            point_id_options: Some(PointIdOptions::Uuid("0b6f5c1e-0000-4000-8000-000000000000".into())),
        };
        let num = PointId {
            point_id_options: Some(PointIdOptions::Num(42)),
        };

        assert_eq!(point_id_string(Some(uuid)), "0b6f5c1e-0000-4000-8000-000000000000");
        assert_eq!(point_id_string(Some(num)), "42");
        assert_eq!(point_id_string(None), "");
    }

    #[test]
    fn test_rejected_requests_are_not_retried() {
        let bad_dimension = status_error(INVALID_ARGUMENT, "wrong vector size");
        let missing = status_error(NOT_FOUND, "collection articles not found");
        let down = status_error(14, "connection reset");

        assert!(matches!(bad_dimension, DomainError::Validation(_)));
        assert!(matches!(missing, DomainError::NotFound(_)));
        assert!(!bad_dimension.is_transient());
        assert!(!missing.is_transient());
        assert!(down.is_transient());
    }
}
