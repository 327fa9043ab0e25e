pub mod ask;
pub mod health;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/ask", post(ask::ask_handler))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{RagService, RagSettings};
    use crate::domain::ports::{EmbeddingService, LlmService, VectorStore};
    use crate::domain::{DistanceMetric, DomainError, Embedding, StoredPoint};
    use crate::infrastructure::{Config, InMemoryVectorStore};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct FixedEmbedding;

    #[async_trait]
    impl EmbeddingService for FixedEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            if text.contains("timeout") {
                return Err(DomainError::timeout("ollama did not answer"));
            }
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmService for EchoLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            Ok(format!("{} chars of context", prompt.len()))
        }
    }

    async fn app() -> Router {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .ensure_collection("articles", 2, DistanceMetric::Cosine)
            .await
            .unwrap();
        store
            .upsert(
                "articles",
                vec![StoredPoint {
                    id: Uuid::new_v4(),
                    vector: Embedding::new(vec![1.0, 0.0]),
                    payload: json!({"title": "Caves", "content": "Caves are dark."})
                        .as_object()
                        .cloned()
                        .unwrap(),
                }],
            )
            .await
            .unwrap();

        let rag = RagService::new(
            Arc::new(FixedEmbedding),
            store.clone(),
            Arc::new(EchoLlm),
            RagSettings::new("articles"),
        );
        create_router(AppState::new(Arc::new(rag), store, Config::default()))
    }

    fn ask(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_checks_vector_store() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["vector_store"], "connected");
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_sources() {
        let response = app()
            .await
            .oneshot(ask(r#"{"question": "Are caves dark?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["answer"].as_str().unwrap().ends_with("chars of context"));
        assert_eq!(body["sources"][0]["text"], "Caves are dark.");
        assert!(body["sources"][0]["id"].is_string());
    }

    #[tokio::test]
    async fn test_blank_question_is_bad_request() {
        let response = app().await.oneshot(ask(r#"{"question": "  "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = app().await.oneshot(ask(r#"{"query": 1}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_gateway_timeout() {
        let response = app()
            .await
            .oneshot(ask(r#"{"question": "timeout please"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("ollama"));
    }
}
