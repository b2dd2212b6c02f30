use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use shopfront_common::query::{PageLimits, DEFAULT_LIMIT, MAX_LIMIT};
use shopfront_common::seed::CatalogSeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-process maps; contents are lost on exit.
    Memory,
    /// PostgreSQL via `--database-url`.
    Postgres,
}

#[derive(Debug, Parser)]
#[command(name = "shopfront-node", about = "Shop catalog HTTP service")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SHOPFRONT_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Catalog storage backend.
    #[arg(long, env = "SHOPFRONT_BACKEND", value_enum, default_value_t = Backend::Memory)]
    pub backend: Backend,

    /// PostgreSQL connection string (required for `--backend postgres`).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "SHOPFRONT_POOL_SIZE", default_value_t = 16)]
    pub pool_size: usize,

    /// JSON fixture of categories and products to load before serving.
    #[arg(long, env = "SHOPFRONT_SEED")]
    pub seed: Option<PathBuf>,

    /// Page size when a request gives no usable `limit`.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub default_limit: u32,

    /// Largest page size a request may ask for.
    #[arg(long, default_value_t = MAX_LIMIT)]
    pub max_limit: u32,
}

impl Cli {
    pub fn page_limits(&self) -> PageLimits {
        let max_limit = self.max_limit.max(1);
        PageLimits {
            default_limit: self.default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("--database-url (or DATABASE_URL) is required for the postgres backend")
    }
}

pub fn load_seed(path: &Path) -> anyhow::Result<CatalogSeed> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let seed = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;
    Ok(seed)
}
