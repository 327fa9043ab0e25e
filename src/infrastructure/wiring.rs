use std::sync::Arc;

use crate::application::{
    IngestionOptions, IngestionService, PdfTextExtractor, RagService, RagSettings, SourceSpec,
};
use crate::domain::text::RecursiveSplitter;
use crate::domain::DomainError;
use crate::infrastructure::config::Config;
use crate::infrastructure::embedding::OllamaEmbedding;
use crate::infrastructure::llm::OllamaLlm;
use crate::infrastructure::pdf::{LopdfTextLayer, TesseractOcr};
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::vector_store::QdrantVectorStore;

pub fn vector_store(config: &Config) -> Result<Arc<QdrantVectorStore>, DomainError> {
    let retry = RetryPolicy::from_config(&config.retry);
    Ok(Arc::new(QdrantVectorStore::new(&config.qdrant, retry)?))
}

pub fn rag_service(
    config: &Config,
    vector_store: Arc<QdrantVectorStore>,
) -> Result<RagService, DomainError> {
    let retry = RetryPolicy::from_config(&config.retry);
    let embedding = Arc::new(OllamaEmbedding::from_config(&config.ollama, retry)?);
    let llm = Arc::new(OllamaLlm::from_config(&config.ollama, retry)?);

    let settings = RagSettings {
        collection: config.query_collection().to_string(),
        top_k: config.rag.top_k,
        source_chars: config.rag.source_chars,
    };
    Ok(RagService::new(embedding, vector_store, llm, settings))
}

pub fn ingestion_service(
    config: &Config,
    vector_store: Arc<QdrantVectorStore>,
) -> Result<IngestionService, DomainError> {
    let retry = RetryPolicy::from_config(&config.retry);
    let embedding = Arc::new(OllamaEmbedding::from_config(&config.ollama, retry)?);

    let pdf = PdfTextExtractor::new(
        Arc::new(LopdfTextLayer),
        Arc::new(TesseractOcr::from_config(&config.ingestion)),
    )
    .with_min_native_chars(config.ingestion.min_native_chars);

    let options = IngestionOptions {
        concurrency: config.ingestion.concurrency,
        metric: config.collections.metric,
        point_ids: config.ingestion.point_ids,
        splitter: RecursiveSplitter::new(
            config.ingestion.chunk_size,
            config.ingestion.chunk_overlap,
        )?,
    };
    Ok(IngestionService::new(embedding, vector_store, pdf, options))
}

pub fn article_source(config: &Config) -> SourceSpec {
    let mut source = SourceSpec::articles(
        &config.ingestion.articles_dir,
        &config.collections.articles,
    );
    source.extensions = config
        .ingestion
        .article_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    source
}

pub fn pdf_source(config: &Config) -> SourceSpec {
    SourceSpec::pdfs(&config.ingestion.pdf_dir, &config.collections.pdfs)
}
