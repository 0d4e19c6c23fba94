use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

use stomp_client_lib::storage::FileStorage;
use stomp_client_lib::{Client, ClientConfig};

/// Interactive STOMP client for game event reports
#[derive(Debug, Parser)]
#[command(name = "stomp-client", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for relative summary paths
    #[arg(long)]
    reports_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = ClientConfig::resolve(args.config.as_deref())?;
    if let Some(dir) = args.reports_dir {
        config.reports_dir = Some(dir);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    let mut storage = FileStorage::new();
    if let Some(dir) = &config.reports_dir {
        storage = storage.with_base_dir(dir);
    }

    let client = Client::new(config, Arc::new(storage));
    client.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
