use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{DistanceMetric, PointIdStrategy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub qdrant: QdrantConfig,
    pub ollama: OllamaConfig,
    pub collections: CollectionsConfig,
    pub ingestion: IngestionConfig,
    pub rag: RagConfig,
    pub retry: RetryConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    /// gRPC endpoint.
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Must match what `embedding_model` produces.
    pub dimension: usize,
    pub context_window: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub articles: String,
    pub pdfs: String,
    pub metric: DistanceMetric,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub articles_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub article_extensions: Vec<String>,
    pub concurrency: usize,
    pub point_ids: PointIdStrategy,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_native_chars: usize,
    pub ocr_dpi: u32,
    pub ocr_language: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Defaults to the articles collection.
    pub collection: Option<String>,
    pub top_k: usize,
    pub source_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            embedding_model: "mistral".to_string(),
            generation_model: "mistral".to_string(),
            dimension: 4096,
            context_window: 10000,
            timeout_seconds: 120,
        }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            articles: "articles".to_string(),
            pdfs: "pdf_documents".to_string(),
            metric: DistanceMetric::Cosine,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from("docs"),
            pdf_dir: PathBuf::from("docs"),
            article_extensions: vec!["html".to_string()],
            concurrency: 4,
            point_ids: PointIdStrategy::ContentHash,
            chunk_size: 500,
            chunk_overlap: 50,
            min_native_chars: 100,
            ocr_dpi: 300,
            ocr_language: "eng".to_string(),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: None,
            top_k: 10,
            source_chars: 200,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

/// Output dimensionality of embedding models we know about.
pub fn known_dimension(model: &str) -> Option<usize> {
    match model.split(':').next().unwrap_or(model) {
        "llama3.2" => Some(3072),
        "mistral" => Some(4096),
        _ => None,
    }
}

impl Config {
    /// Reads `RAG_CONFIG` (YAML) when set, then applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("RAG_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("QDRANT_URL") {
            self.qdrant.url = v;
        }
        if let Some(v) = lookup("QDRANT_API_KEY") {
            self.qdrant.api_key = Some(v);
        }
        if let Some(v) = lookup("OLLAMA_URL") {
            self.ollama.url = v;
        }
        let mut unsized_model = None;
        if let Some(v) = lookup("MODEL_NAME") {
            self.ollama.generation_model = v.clone();
            unsized_model = self.set_embedding_model(v);
        }
        if let Some(v) = lookup("EMBEDDING_MODEL") {
            unsized_model = self.set_embedding_model(v);
        }
        if let Some(v) = lookup("GENERATION_MODEL") {
            self.ollama.generation_model = v;
        }
        match (lookup("VECTOR_SIZE"), unsized_model) {
            (Some(v), _) => self.ollama.dimension = parse("VECTOR_SIZE", v)?,
            (None, Some(model)) => {
                return Err(ConfigError::Invalid(format!(
                    "embedding dimension of model {model} is unknown, set VECTOR_SIZE"
                )))
            }
            (None, None) => {}
        }
        if let Some(v) = lookup("CONTEXT_WINDOW") {
            self.ollama.context_window = parse("CONTEXT_WINDOW", v)?;
        }
        if let Some(v) = lookup("COLLECTION_NAME") {
            self.collections.articles = v;
        }
        if let Some(v) = lookup("PDF_COLLECTION_NAME") {
            self.collections.pdfs = v;
        }
        if let Some(v) = lookup("DOCS_DIRECTORY") {
            self.ingestion.articles_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PDF_DIRECTORY") {
            self.ingestion.pdf_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("INGEST_CONCURRENCY") {
            self.ingestion.concurrency = parse("INGEST_CONCURRENCY", v)?;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = parse("SERVER_PORT", v)?;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.log.format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOG_FORMAT".to_string(),
                        value: v,
                    })
                }
            };
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ollama.dimension == 0 {
            return Err(ConfigError::Invalid("vector dimension must be positive".into()));
        }
        if self.ingestion.chunk_size == 0 || self.ingestion.chunk_overlap >= self.ingestion.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "chunk overlap {} must be smaller than chunk size {}",
                self.ingestion.chunk_overlap, self.ingestion.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be positive".into()));
        }
        if self.ingestion.concurrency == 0 {
            return Err(ConfigError::Invalid("ingestion concurrency must be positive".into()));
        }
        Ok(())
    }

    pub fn query_collection(&self) -> &str {
        self.rag
            .collection
            .as_deref()
            .unwrap_or(&self.collections.articles)
    }

    /// Switches the embedding model, returning its name when its dimension
    /// is not known.
    fn set_embedding_model(&mut self, model: String) -> Option<String> {
        let unsized_model = match known_dimension(&model) {
            Some(dimension) => {
                self.ollama.dimension = dimension;
                None
            }
            None => Some(model.clone()),
        };
        self.ollama.embedding_model = model;
        unsized_model
    }
}

fn parse<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}
