use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};
use walkdir::WalkDir;

use crate::application::observer::{IngestObserver, TracingObserver};
use crate::application::services::PdfTextExtractor;
use crate::domain::text::{
    chunk_paragraphs, clean_content, extract_front_matter, normalize_newlines, RecursiveSplitter,
};
use crate::domain::{
    index_chunks,
    ports::{EmbeddingService, VectorStore},
    Chunk, DistanceMetric, Document, DocumentReport, DomainError, IngestSummary, Metadata,
    PointIdStrategy, SourceKind, StoredPoint,
};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// A directory of documents of one kind, stored into one collection.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub directory: PathBuf,
    pub kind: SourceKind,
    /// Lowercase, without the dot.
    pub extensions: Vec<String>,
    pub collection: String,
}

impl SourceSpec {
    pub fn articles(directory: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            kind: SourceKind::Article,
            extensions: vec!["html".to_string()],
            collection: collection.into(),
        }
    }

    pub fn pdfs(directory: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            kind: SourceKind::Pdf,
            extensions: vec!["pdf".to_string()],
            collection: collection.into(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Outcome of [`IngestionService::ingest_sources`].
#[derive(Debug, Default)]
pub struct IngestRun {
    pub summary: IngestSummary,
    /// Collection of the source that stopped the run, with its error.
    pub aborted: Option<(String, DomainError)>,
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub concurrency: usize,
    pub metric: DistanceMetric,
    pub point_ids: PointIdStrategy,
    pub splitter: RecursiveSplitter,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            metric: DistanceMetric::Cosine,
            point_ids: PointIdStrategy::default(),
            splitter: RecursiveSplitter::default(),
        }
    }
}

enum ChunkOutcome {
    Stored,
    Skipped,
    Failed(String),
}

pub struct IngestionService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    pdf: PdfTextExtractor,
    observer: Arc<dyn IngestObserver>,
    options: IngestionOptions,
    workers: Arc<Semaphore>,
}

impl IngestionService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        pdf: PdfTextExtractor,
        options: IngestionOptions,
    ) -> Self {
        let workers = Arc::new(Semaphore::new(options.concurrency.max(1)));
        Self {
            embedding,
            vector_store,
            pdf,
            observer: Arc::new(TracingObserver),
            options,
            workers,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn IngestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Files directly inside the source directory with a matching
    /// extension, sorted by path.
    pub fn discover(&self, source: &SourceSpec) -> Result<Vec<PathBuf>, DomainError> {
        std::fs::metadata(&source.directory)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&source.directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| DomainError::Io(e.into()))?;
            if entry.file_type().is_file() && source.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort_unstable();
        Ok(files)
    }

    /// Ingests every matching file. Only failures that stop the whole run
    /// (unreadable directory, collection setup) are returned as errors;
    /// per-document failures land in the summary.
    #[instrument(skip(self, source), fields(dir = %source.directory.display(), collection = %source.collection))]
    pub async fn ingest_source(&self, source: &SourceSpec) -> Result<IngestSummary, DomainError> {
        self.vector_store
            .ensure_collection(
                &source.collection,
                self.embedding.dimension(),
                self.options.metric,
            )
            .await?;

        let files = self.discover(source)?;
        info!(files = files.len(), "found documents");

        let mut summary = IngestSummary::default();
        for path in files {
            match self.ingest_file(&path, source.kind, &source.collection).await {
                Ok(report) => summary.record(&report),
                Err(e) => {
                    self.observer.document_failed(&path, &e);
                    summary.record_failure(&path, e.to_string());
                }
            }
        }

        self.observer.run_finished(&summary);
        Ok(summary)
    }

    /// Ingests the sources in order. The first source that cannot be
    /// ingested at all stops the run; `summary` still covers the sources
    /// handled before it.
    pub async fn ingest_sources(&self, sources: &[SourceSpec]) -> IngestRun {
        let mut run = IngestRun::default();
        for source in sources {
            match self.ingest_source(source).await {
                Ok(partial) => run.summary.merge(partial),
                Err(e) => {
                    run.aborted = Some((source.collection.clone(), e));
                    break;
                }
            }
        }
        run
    }

    /// Loads, chunks, embeds and stores one document. The collection must
    /// already exist.
    #[instrument(skip(self))]
    pub async fn ingest_file(
        &self,
        path: &Path,
        kind: SourceKind,
        collection: &str,
    ) -> Result<DocumentReport, DomainError> {
        let started = Instant::now();
        self.observer.document_started(path);

        let document = self.load(path, kind).await?;
        let chunks = self.prepare_chunks(&document);
        let report = self.store_chunks(&document.path, chunks, collection).await;

        self.observer.document_finished(&report, started.elapsed());
        Ok(report)
    }

    pub async fn load(&self, path: &Path, kind: SourceKind) -> Result<Document, DomainError> {
        let raw_content = match kind {
            SourceKind::Article => tokio::fs::read_to_string(path).await?,
            SourceKind::Pdf => {
                let pdf = self.pdf.clone();
                let owned = path.to_path_buf();
                tokio::task::spawn_blocking(move || pdf.extract(&owned))
                    .await
                    .map_err(|e| DomainError::internal(format!("pdf extraction panicked: {e}")))??
            }
        };
        Ok(Document::new(path, kind, raw_content))
    }

    /// Chunk indices are fixed here, before any network call.
    pub fn prepare_chunks(&self, document: &Document) -> Vec<Chunk> {
        let (metadata, texts) = match document.kind {
            SourceKind::Article => {
                let text = normalize_newlines(&document.raw_content);
                let (metadata, body) = extract_front_matter(&text);
                (metadata, chunk_paragraphs(&clean_content(&body)))
            }
            SourceKind::Pdf => (
                Metadata::new(),
                self.options.splitter.split(&document.raw_content),
            ),
        };
        index_chunks(texts, &document.synthesized_metadata(metadata))
    }

    async fn store_chunks(&self, path: &Path, chunks: Vec<Chunk>, collection: &str) -> DocumentReport {
        let mut report = DocumentReport::new(path, chunks.len());
        let ingested_at = Utc::now();
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let permit = match self.workers.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    report.chunks_failed += 1;
                    self.observer.chunk_failed(path, chunk.index, &e.to_string());
                    continue;
                }
            };

            let id = self.options.point_ids.point_id(path, &chunk);
            let embedding = self.embedding.clone();
            let store = self.vector_store.clone();
            let collection = collection.to_string();

            tasks.spawn(async move {
                let _permit = permit;
                let index = chunk.index;
                let outcome = match embedding.embed(&chunk.text).await {
                    Ok(vector) => {
                        let point = StoredPoint::from_chunk(id, &chunk, vector, ingested_at);
                        match store.upsert(&collection, vec![point]).await {
                            Ok(()) => ChunkOutcome::Stored,
                            Err(e) => ChunkOutcome::Failed(e.to_string()),
                        }
                    }
                    Err(DomainError::EmptyEmbedding) => ChunkOutcome::Skipped,
                    Err(e) => ChunkOutcome::Failed(e.to_string()),
                };
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, ChunkOutcome::Stored)) => report.chunks_stored += 1,
                Ok((index, ChunkOutcome::Skipped)) => {
                    report.chunks_skipped += 1;
                    self.observer.chunk_skipped(path, index);
                }
                Ok((index, ChunkOutcome::Failed(error))) => {
                    report.chunks_failed += 1;
                    self.observer.chunk_failed(path, index, &error);
                }
                Err(e) => {
                    report.chunks_failed += 1;
                    error!(path = %path.display(), error = %e, "chunk task aborted");
                }
            }
        }

        report
    }
}
