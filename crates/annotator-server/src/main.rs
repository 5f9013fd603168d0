//! Annotator Server
//!
//! Serves the annotation page and its JSON API on top of an embedded SQLite
//! database.

use annotator_server::config::{LogConfig, LogFormat, ServerConfig};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "annotator-server")]
#[command(version, about = "Annotation collection server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "ANNOTATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config), e.g. 0.0.0.0:8475
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config.log) {
        eprintln!("[FATAL] Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    info!("Starting Annotator Server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address,
        config.database.path.display()
    );

    if let Err(e) = annotator_server::run(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(args.config.as_deref())?;

    if let Some(bind) = &args.bind {
        config.bind_address = bind.clone();
    }
    if let Some(database) = &args.database {
        config.database.path = database.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(log: &LogConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("{}", e))
}
