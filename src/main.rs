use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lnurl_service::{
    AppState, ServerConfig,
    db::{SqliteGiftCardStore, init_pool},
    documents::{DirectoryDocuments, DocumentProvider, InMemoryDocuments},
    handlers,
    lightning::{ClnRpc, NodeRpc},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lnurl_service=debug,lnurl_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    let pool = init_pool(&config.database_url).await?;
    let gift_cards = Arc::new(SqliteGiftCardStore::new(pool));

    let node: Arc<dyn NodeRpc> = Arc::new(
        ClnRpc::new(config.lightning_rpc_path.clone(), config.rpc_timeout())
            .with_pay_timeout(config.pay_timeout()),
    );

    let documents: Arc<dyn DocumentProvider> = match &config.well_known_dir {
        Some(dir) => Arc::new(DirectoryDocuments::new(dir.clone())),
        None => Arc::new(InMemoryDocuments::default()),
    };

    let socket_addr = config.socket_addr();
    let public_url = config.public_url.clone();
    let state = AppState::new(config, node, documents, gift_cards);
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&socket_addr).await?;

    tracing::info!("Server running on {}", socket_addr);
    tracing::info!("Public URL: {}", public_url);
    tracing::info!("LNURL-pay: {}/lnurl6", public_url.trim_end_matches('/'));

    axum::serve(listener, app).await?;

    Ok(())
}
