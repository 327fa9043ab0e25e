use anyhow::bail;
use clap::{Parser, ValueEnum};
use docs_rag::application::SourceSpec;
use docs_rag::domain::IngestSummary;
use docs_rag::infrastructure::{init_tracing, wiring, Config};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Articles,
    Pdfs,
    All,
}

#[derive(Debug, Parser)]
#[command(name = "ingest", version, about = "Embed documents into the vector store")]
struct Cli {
    /// Which document set to ingest.
    #[arg(value_enum, default_value_t = SourceArg::All)]
    source: SourceArg,
}

impl Cli {
    fn sources(&self, config: &Config) -> Vec<SourceSpec> {
        match self.source {
            SourceArg::Articles => vec![wiring::article_source(config)],
            SourceArg::Pdfs => vec![wiring::pdf_source(config)],
            SourceArg::All => vec![wiring::article_source(config), wiring::pdf_source(config)],
        }
    }
}

fn log_summary(summary: &IngestSummary) {
    for failure in &summary.failures {
        error!(path = %failure.path.display(), reason = %failure.reason, "document not ingested");
    }
    info!(
        documents = summary.documents_ingested,
        failed = summary.documents_failed,
        chunks_stored = summary.chunks_stored,
        chunks_skipped = summary.chunks_skipped,
        chunks_failed = summary.chunks_failed,
        "ingestion summary"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing("ingest=info,docs_rag=info", &config.log);

    let vector_store = wiring::vector_store(&config)?;
    let ingestion = wiring::ingestion_service(&config, vector_store)?;

    let sources = cli.sources(&config);
    for source in &sources {
        info!(
            directory = %source.directory.display(),
            collection = %source.collection,
            "queued source"
        );
    }

    let run = ingestion.ingest_sources(&sources).await;
    log_summary(&run.summary);
    if let Some((collection, e)) = run.aborted {
        error!(collection = %collection, error = %e, "ingestion aborted");
        return Err(e.into());
    }
    if run.summary.documents_ingested == 0 && run.summary.documents_failed > 0 {
        bail!("no document could be ingested");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_defaults_to_all() {
        let cli = Cli::try_parse_from(["ingest"]).unwrap();
        assert_eq!(cli.source, SourceArg::All);
        assert_eq!(cli.sources(&Config::default()).len(), 2);
    }

    #[test]
    fn test_single_source() {
        let cli = Cli::try_parse_from(["ingest", "pdfs"]).unwrap();
        let sources = cli.sources(&Config::default());
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].collection, "pdf_documents");
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["ingest", "videos"]).is_err());
    }
}
