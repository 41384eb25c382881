use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use postboard::config::{Config, StoreKind};
use postboard::store::{MemoryStore, PgStore, PostStore};
use postboard::{PostResource, Server, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), store = ?config.store, "starting postboard");

    let store: Arc<dyn PostStore> = match config.store {
        StoreKind::Memory if config.seed => Arc::new(MemoryStore::seeded()),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("--database-url is required for the postgres store"))?;
            Arc::new(PgStore::connect_with_retry(url, &config.connect_options()).await?)
        }
    };

    let app = routes::app(PostResource::new(store));
    Server::bind(&config.bind)?
        .drain_timeout(config.drain_timeout())
        .serve(app)
        .await?;
    Ok(())
}
