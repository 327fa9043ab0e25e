pub mod config;
pub mod embedding;
pub mod http;
pub mod llm;
pub mod pdf;
pub mod retry;
pub mod telemetry;
pub mod vector_store;
pub mod wiring;

pub use config::{known_dimension, Config, ConfigError, LogFormat};
pub use embedding::OllamaEmbedding;
pub use http::JsonClient;
pub use llm::OllamaLlm;
pub use pdf::{LopdfTextLayer, TesseractOcr};
pub use retry::RetryPolicy;
pub use telemetry::init_tracing;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
