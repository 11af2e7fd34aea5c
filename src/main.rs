//! lbryweb: web-facing gateway to an lbrynet content daemon

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lbryweb::config::{Config, LogFormat, LoggingConfig};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "lbryweb")]
#[command(about = "Per-account JSON-RPC gateway and content server for lbrynet")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "lbryweb.toml")]
    config: PathBuf,

    /// Daemon JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true)]
    daemon_url: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway and content server
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Call a daemon method directly and print the result
    Call {
        /// Daemon method name
        method: String,

        /// Parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = logging.level.more_verbose(verbose).to_tracing();
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `init` writes a fresh file and ignores any existing one
    let mut config = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ if cli.config.exists() => Config::load(&cli.config)?,
        _ => Config::default(),
    };

    init_logging(&config.logging, cli.verbose)?;

    if let Some(url) = cli.daemon_url {
        config.daemon.url = url;
    }

    match cli.command {
        Commands::Serve { listen } => {
            if let Some(addr) = listen {
                config.http.listen_addr = addr;
            }
            config.validate()?;
            commands::serve(config).await
        }
        Commands::Call { method, params } => {
            config.validate()?;
            commands::call_method(config, method, params).await
        }
        Commands::Init { path } => commands::init_config(path).await,
    }
}
