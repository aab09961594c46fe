//! pdcs - podman image and network listings
//!
//! ## Usage
//!
//! ```sh
//! pdcs images [--format table|json]
//! pdcs networks [--format table|json]
//! pdcs --connection prod images
//! pdcs --url ssh://core@host/run/podman/podman.sock --identity ~/.ssh/id networks
//! ```
//!
//! Every global option can also be set through its `PDCS_*` environment
//! variable. Logging goes to stderr and follows `RUST_LOG` (default `warn`).

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use pdcs::{
    DEFAULT_PODMAN_BINARY, ENGINE_COMMAND_TIMEOUT, ENV_CONNECTION, ENV_PODMAN_BINARY,
    ENV_REMOTE_IDENTITY, ENV_REMOTE_URL, ENV_TIMEOUT_SECS, Image, Network, PodmanCli,
    PodmanConfig, list_images, list_networks,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI Parsing
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "pdcs", version, about = "List podman images and networks")]
struct Cli {
    /// Podman binary to run.
    #[arg(long, global = true, env = ENV_PODMAN_BINARY, default_value = DEFAULT_PODMAN_BINARY)]
    podman: PathBuf,

    /// Remote service URL (unix://, ssh://, tcp://).
    #[arg(long, global = true, env = ENV_REMOTE_URL)]
    url: Option<String>,

    /// SSH identity for remote URLs.
    #[arg(long, global = true, env = ENV_REMOTE_IDENTITY)]
    identity: Option<PathBuf>,

    /// Named system connection.
    #[arg(long, global = true, env = ENV_CONNECTION)]
    connection: Option<String>,

    /// Engine command timeout in seconds.
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS, default_value_t = ENGINE_COMMAND_TIMEOUT.as_secs())]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List images, one row per repo-tag.
    Images {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// List networks.
    Networks {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

impl Cli {
    fn engine_config(&self) -> PodmanConfig {
        let mut config = PodmanConfig::default()
            .with_binary(&self.podman)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(url) = &self.url {
            config = config.with_url(url);
        }
        if let Some(identity) = &self.identity {
            config = config.with_identity(identity);
        }
        if let Some(connection) = &self.connection {
            config = config.with_connection(connection);
        }
        config
    }
}

// =============================================================================
// Output Formatting
// =============================================================================

fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut size = bytes.max(0) as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes.max(0), UNITS[0])
    } else {
        format!("{:.3} {}", size, UNITS[unit])
    }
}

fn format_created(created: i64) -> String {
    DateTime::<Utc>::from_timestamp(created, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| created.to_string())
}

fn print_images(images: &[Image], format: Format) -> Result<(), String> {
    if format == Format::Json {
        let json = serde_json::to_string_pretty(images).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{:<40} {:<20} {:<12} {:<19} {}",
        "REPOSITORY", "TAG", "IMAGE ID", "CREATED", "SIZE"
    );
    for image in images {
        println!(
            "{:<40} {:<20} {:<12} {:<19} {}",
            image.repository,
            image.tag,
            image.id,
            format_created(image.created),
            human_size(image.size)
        );
    }
    Ok(())
}

fn print_networks(networks: &[Network], format: Format) -> Result<(), String> {
    if format == Format::Json {
        let json = serde_json::to_string_pretty(networks).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }

    println!("{:<24} {:<12} {:<8} {}", "NAME", "ID", "DRIVER", "LABELS");
    for network in networks {
        println!(
            "{:<24} {:<12} {:<8} {}",
            network.name, network.id, network.driver, network.labels
        );
    }
    Ok(())
}

// =============================================================================
// Entry Point
// =============================================================================

async fn run(cli: Cli) -> Result<(), String> {
    let engine = PodmanCli::with_config(cli.engine_config());
    debug!("engine config: {:?}", engine.config());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match cli.command {
        Command::Images { format } => {
            let images = list_images(&engine, &cancel)
                .await
                .map_err(|e| e.to_string())?;
            print_images(&images, format)
        }
        Command::Networks { format } => {
            let networks = list_networks(&engine, &cancel)
                .await
                .map_err(|e| e.to_string())?;
            print_networks(&networks, format)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pdcs: {}", e);
            ExitCode::FAILURE
        }
    }
}
