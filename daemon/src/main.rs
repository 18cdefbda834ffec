//! Agora daemon — entry point for running the proposal service.

use agora_service::{AgoraService, LogFormat, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agora-daemon", about = "Agora community proposal daemon")]
struct Cli {
    /// Data directory for proposal storage.
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port.
    #[arg(long, env = "AGORA_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Admin token required to close proposals. When unset, closing is
    /// disabled and proposals can only expire.
    #[arg(long, env = "AGORA_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Default number of days a new proposal stays open for voting.
    #[arg(long, env = "AGORA_DEFAULT_OPEN_DAYS")]
    default_open_days: Option<u32>,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long, env = "AGORA_ENABLE_METRICS")]
    metrics: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicitly named config file that cannot be loaded is a fatal
    // error, not a silent fallback to defaults.
    let base = match cli.config {
        Some(ref path) => ServiceConfig::from_toml_file(&path.to_string_lossy())?,
        None => ServiceConfig::default(),
    };

    let config = ServiceConfig {
        data_dir: cli.data_dir.unwrap_or(base.data_dir),
        rpc_port: cli.rpc_port.unwrap_or(base.rpc_port),
        admin_token: cli.admin_token.or(base.admin_token),
        default_open_days: cli.default_open_days.unwrap_or(base.default_open_days),
        enable_metrics: cli.metrics || base.enable_metrics,
        log_format: cli.log_format.unwrap_or(base.log_format),
        log_level: cli.log_level.unwrap_or(base.log_level),
    };

    let format = config
        .log_format
        .parse::<LogFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;
    agora_service::init_logging(format, &config.log_level);

    if let Some(ref path) = cli.config {
        tracing::info!("loaded config from {}", path.display());
    }
    tracing::info!(
        "starting agora on port {} (metrics: {}, admin close: {})",
        config.rpc_port,
        if config.enable_metrics { "on" } else { "off" },
        if config.admin_token.is_some() {
            "enabled"
        } else {
            "disabled"
        },
    );

    let service = AgoraService::open(config)?;
    service.run().await?;

    tracing::info!("agora daemon exited cleanly");
    Ok(())
}
