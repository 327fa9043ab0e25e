use std::path::PathBuf;

use serde::Serialize;

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub chunks_total: usize,
    pub chunks_stored: usize,
    pub chunks_skipped: usize,
    pub chunks_failed: usize,
}

impl DocumentReport {
    pub fn new(path: impl Into<PathBuf>, chunks_total: usize) -> Self {
        Self {
            path: path.into(),
            chunks_total,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregated outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub documents_ingested: usize,
    pub documents_failed: usize,
    pub chunks_stored: usize,
    pub chunks_skipped: usize,
    pub chunks_failed: usize,
    pub failures: Vec<DocumentFailure>,
}

impl IngestSummary {
    pub fn record(&mut self, report: &DocumentReport) {
        self.documents_ingested += 1;
        self.chunks_stored += report.chunks_stored;
        self.chunks_skipped += report.chunks_skipped;
        self.chunks_failed += report.chunks_failed;
    }

    pub fn record_failure(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) {
        self.documents_failed += 1;
        self.failures.push(DocumentFailure {
            path: path.into(),
            reason: reason.into(),
        });
    }

    pub fn merge(&mut self, other: IngestSummary) {
        self.documents_ingested += other.documents_ingested;
        self.documents_failed += other.documents_failed;
        self.chunks_stored += other.chunks_stored;
        self.chunks_skipped += other.chunks_skipped;
        self.chunks_failed += other.chunks_failed;
        self.failures.extend(other.failures);
    }
}
