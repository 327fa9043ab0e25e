use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::prompt;
use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    Answer, DomainError, ScoredPoint, Source,
};

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_SOURCE_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub collection: String,
    pub top_k: usize,
    /// Length of each source excerpt returned for attribution.
    pub source_chars: usize,
}

impl RagSettings {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            top_k: DEFAULT_TOP_K,
            source_chars: DEFAULT_SOURCE_CHARS,
        }
    }
}

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    settings: RagSettings,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        settings: RagSettings,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            settings,
        }
    }

    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPoint>, DomainError> {
        self.retrieve_top_k(query, self.settings.top_k).await
    }

    /// Embeds the retrieval-prefixed query and returns the nearest chunks,
    /// best first. An empty embedding is an error here, not a skip.
    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let embedding = self.embedding.embed(&prompt::retrieval_query(query)).await?;
        self.vector_store
            .query(&self.settings.collection, &embedding, top_k)
            .await
    }

    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<Answer, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }

        let points = self.retrieve(question).await?;
        info!(hits = points.len(), "retrieved passages");

        let augmented = prompt::augment(&prompt::render_passages(&points), question);
        let answer = self.llm.complete(&augmented).await?;

        let sources = points
            .iter()
            .map(|point| Source::from_point(point, self.settings.source_chars))
            .collect();

        Ok(Answer { answer, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistanceMetric, Embedding, StoredPoint};
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Maps known texts to fixed vectors; anything else is empty.
    struct LookupEmbedding(Vec<(String, Vec<f32>)>);

    #[async_trait]
    impl EmbeddingService for LookupEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            self.0
                .iter()
                .find(|(t, _)| t == text)
                .map(|(_, v)| Embedding::new(v.clone()))
                .ok_or(DomainError::EmptyEmbedding)
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("It is a cave.".to_string())
        }
    }

    async fn seeded_store() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .ensure_collection("articles", 3, DistanceMetric::Cosine)
            .await
            .unwrap();

        let points = [
            ([1.0, 0.0, 0.0], "Caves are dark.", "Caves"),
            ([0.7, 0.7, 0.0], "Bats live in caves.", "Bats"),
            ([0.0, 0.0, 1.0], "Pumps need priming.", "Pumps"),
        ]
        .into_iter()
        .map(|(vector, content, title)| StoredPoint {
            id: Uuid::new_v4(),
            vector: Embedding::new(vector.to_vec()),
            payload: json!({"title": title, "slug": title.to_lowercase(), "content": content})
                .as_object()
                .cloned()
                .unwrap(),
        })
        .collect();
        store.upsert("articles", points).await.unwrap();
        store
    }

    fn service(store: Arc<InMemoryVectorStore>, llm: Arc<RecordingLlm>) -> RagService {
        let embedding = LookupEmbedding(vec![(
            prompt::retrieval_query("What is X?"),
            vec![0.9, 0.1, 0.0],
        )]);
        RagService::new(Arc::new(embedding), store, llm, RagSettings::new("articles"))
    }

    #[tokio::test]
    async fn test_answer_uses_ranked_passages() {
        let llm = Arc::new(RecordingLlm::default());
        let rag = service(seeded_store().await, llm.clone());

        let answer = rag.answer("What is X?").await.unwrap();

        assert_eq!(answer.answer, "It is a cave.");
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(answer.sources[0].text, "Caves are dark.");

        let prompts = llm.prompts.lock().unwrap();
        let prompt = &prompts[0];
        let caves = prompt.find("Caves are dark.").unwrap();
        let bats = prompt.find("Bats live in caves.").unwrap();
        let pumps = prompt.find("Pumps need priming.").unwrap();
        assert!(caves < bats && bats < pumps);
        assert!(prompt.contains("<user-prompt>\nWhat is X?\n</user-prompt>"));
    }

    #[tokio::test]
    async fn test_retrieval_scores_are_non_increasing() {
        let rag = service(seeded_store().await, Arc::new(RecordingLlm::default()));

        let points = rag.retrieve("What is X?").await.unwrap();

        assert!(points.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_surfaced() {
        let llm = Arc::new(RecordingLlm::default());
        let rag = service(seeded_store().await, llm.clone());

        let err = rag.answer("Unknown question").await.unwrap_err();

        assert!(matches!(err, DomainError::EmptyEmbedding));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let rag = service(seeded_store().await, Arc::new(RecordingLlm::default()));
        assert!(matches!(
            rag.answer("   ").await,
            Err(DomainError::Validation(_))
        ));
    }
}
