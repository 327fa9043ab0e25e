use docs_rag::api::{create_router, AppState};
use docs_rag::infrastructure::{init_tracing, wiring, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing("api=debug,docs_rag=debug,tower_http=debug", &config.log);

    let vector_store = wiring::vector_store(&config)?;
    let rag = Arc::new(wiring::rag_service(&config, vector_store.clone())?);
    info!(
        collection = rag.collection(),
        model = %config.ollama.generation_model,
        "RAG service initialized"
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = create_router(AppState::new(rag, vector_store, config));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
