use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::Embedding;

/// Document-level metadata attached to every chunk derived from it.
pub type Metadata = serde_json::Map<String, Value>;

pub const CONTENT_KEY: &str = "content";
pub const CHUNK_INDEX_KEY: &str = "chunk_index";
pub const INGESTED_AT_KEY: &str = "ingested_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Front-matter delimited text, usually exported as `.html`.
    Article,
    Pdf,
}

impl SourceKind {
    /// Value stored under the `source` payload key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "html",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub raw_content: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind, raw_content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            raw_content: raw_content.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn slug(&self) -> String {
        slug_for(&self.path)
    }

    /// Metadata every chunk carries regardless of front-matter. The slug is
    /// always the file stem, replacing any front-matter `slug`.
    pub fn synthesized_metadata(&self, mut metadata: Metadata) -> Metadata {
        metadata.insert("slug".into(), Value::String(self.slug()));
        metadata.insert("filename".into(), Value::String(self.file_name()));
        metadata.insert("source".into(), Value::String(self.kind.as_str().into()));
        metadata
    }
}

pub fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, index: usize, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            index,
            metadata,
        }
    }
}

/// Builds one chunk per text, numbered in order, all sharing `metadata`.
pub fn index_chunks(texts: Vec<String>, metadata: &Metadata) -> Vec<Chunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::new(text, index, metadata.clone()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub id: Uuid,
    pub vector: Embedding,
    pub payload: Metadata,
}

impl StoredPoint {
    pub fn from_chunk(id: Uuid, chunk: &Chunk, vector: Embedding, ingested_at: DateTime<Utc>) -> Self {
        let mut payload = chunk.metadata.clone();
        payload.insert(CONTENT_KEY.into(), Value::String(chunk.text.clone()));
        payload.insert(CHUNK_INDEX_KEY.into(), Value::from(chunk.index));
        payload.insert(INGESTED_AT_KEY.into(), Value::String(ingested_at.to_rfc3339()));
        Self {
            id,
            vector,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub payload: Metadata,
    pub score: f32,
}

impl ScoredPoint {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn content(&self) -> &str {
        self.field(CONTENT_KEY).unwrap_or_default()
    }
}

/// How point ids are derived at ingestion time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointIdStrategy {
    /// Hash of path, chunk index and text. Re-ingesting overwrites.
    #[default]
    ContentHash,
    /// Fresh UUIDv4 per chunk. Re-ingesting appends duplicates.
    Random,
}

impl PointIdStrategy {
    pub fn point_id(&self, path: &Path, chunk: &Chunk) -> Uuid {
        match self {
            Self::Random => Uuid::new_v4(),
            Self::ContentHash => {
                let mut hasher = Sha256::new();
                hasher.update(path.to_string_lossy().as_bytes());
                hasher.update((chunk.index as u64).to_le_bytes());
                hasher.update(chunk.text.as_bytes());
                let digest = hasher.finalize();
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&digest[..16]);
                uuid::Builder::from_random_bytes(bytes).into_uuid()
            }
        }
    }
}
