use anyhow::Result;
use cakeshop::config::AppConfig;
use cakeshop::server::ServerBuilder;
use cakeshop::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cakeshop=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;
    let addr = config.server.bind_address();
    let store = storage::connect(&config.storage).await?;

    ServerBuilder::new()
        .with_config(config)
        .with_shared_order_store(store)
        .serve(&addr)
        .await
}
