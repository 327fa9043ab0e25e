use docs_rag::infrastructure::{init_tracing, wiring, Config};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Interactive question loop against the articles collection.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing("ask=info,docs_rag=warn", &config.log);

    let vector_store = wiring::vector_store(&config)?;
    let rag = wiring::rag_service(&config, vector_store)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"Enter a prompt: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match rag.answer(question).await {
            Ok(answer) => {
                let mut out = format!("\n{}\n\nSources:\n", answer.answer);
                for source in &answer.sources {
                    out.push_str(&format!("- [{}] {}\n", source.id, source.text));
                }
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "could not answer");
                stdout.write_all(format!("error: {e}\n\n").as_bytes()).await?;
            }
        }
    }

    Ok(())
}
