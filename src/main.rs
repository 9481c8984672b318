//! Budgetweb main entry point

use budgetweb_api::start_server;
use budgetweb_config::Config;
use budgetweb_core::{Finance, MemoryStore};
use budgetweb_parser::DefaultStatementParser;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "budgetweb")]
#[command(author = "Budgetweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Personal finance tracker with statement import, budgets and monthly summaries", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config_found = args.config.exists();
    let config = Config::load_or_default(&args.config)?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if !config_found {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }

    log::info!(
        "Config loaded from {}: data path={}, persist={}",
        args.config.display(),
        config.data.path.display(),
        config.data.persist
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = if config.data.persist {
            let path = config.snapshot_path();
            log::info!("Using snapshot file {}", path.display());
            MemoryStore::open(path).await?
        } else {
            log::warn!("Persistence disabled, data lives only as long as the process");
            MemoryStore::new()
        };

        let stores = Arc::new(store).into_stores();
        let finance = Arc::new(Finance::new(config.clone(), Arc::new(DefaultStatementParser), stores));

        start_server(config, finance).await
    })
}
