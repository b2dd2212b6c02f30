//! Shop catalog node.
//!
//! Opens the configured catalog store, optionally loads a JSON fixture into
//! it, serves the shop read API until Ctrl-C / SIGTERM, then closes the store.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use shopfront_node::config::{load_seed, Backend, Cli};
use shopfront_node::store::{apply_seed, CatalogStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopfront_node::init_tracing();
    let cli = Cli::parse();

    match cli.backend {
        Backend::Memory => run(&cli, Arc::new(MemoryStore::new())).await,
        Backend::Postgres => {
            let store = PgStore::connect(cli.database_url()?, cli.pool_size)
                .await
                .context("failed to open postgres catalog")?;
            run(&cli, Arc::new(store)).await
        }
    }
}

async fn run<S: CatalogStore>(cli: &Cli, store: Arc<S>) -> anyhow::Result<()> {
    if let Some(path) = &cli.seed {
        let seed = load_seed(path)?;
        apply_seed(store.as_ref(), seed)
            .await
            .context("failed to seed catalog")?;
    }

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;

    let served = shopfront_node::serve(
        listener,
        store.clone(),
        cli.page_limits(),
        shopfront_node::shutdown_signal(),
    )
    .await;

    store.close();
    served.context("server error")
}
