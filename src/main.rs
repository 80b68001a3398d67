//! Nominatim wrapper entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nominatim_wrapper::api;
use nominatim_wrapper::api::BaseApplication;
use nominatim_wrapper::config::Config;
use nominatim_wrapper::metrics;
use nominatim_wrapper::nominatim::NominatimClient;
use nominatim_wrapper::utils::shutdown_signal;

/// Log filter used by `--verbose`.
const VERBOSE_FILTER: &str = "nominatim_wrapper=debug,tower_http=debug,info";

/// Nominatim front with an always-on health endpoint.
#[derive(Parser, Debug)]
#[command(name = "nominatim-wrapper")]
#[command(about = "Serve Nominatim with an added /health liveness endpoint")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the composed application (default).
    Run {
        /// HTTP server port.
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Query the upstream Nominatim /status endpoint.
    CheckUpstream,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env feeds both clap's env fallbacks and RUST_LOG
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    match args.command {
        Some(Command::Run { port }) => cmd_run(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::CheckUpstream) => cmd_check_upstream().await,
        None => cmd_run(args.port).await,
    }
}

/// Load and validate configuration, logging the failure reason.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    let config = load_config()?;

    println!("Configuration OK");
    println!("  Upstream:  {}", config.upstream_url);
    println!("  Listen:    {}", config.listen_addr());
    println!("  Timeout:   {}ms", config.http_timeout_ms);
    println!("  Pool size: {}", config.http_pool_size);
    println!("  CORS:      {}", if config.enable_cors { "Enabled" } else { "Disabled" });
    println!("  Metrics:   {}", if config.enable_metrics { "Enabled" } else { "Disabled" });

    Ok(())
}

/// Query the upstream status endpoint.
async fn cmd_check_upstream() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = NominatimClient::new(&config)?;

    let status = client.status().await?;
    println!("Upstream {}: {} (status {})", client.base_url(), status.message, status.status);
    if let Some(version) = &status.software_version {
        println!("  Software version: {}", version);
    }
    if let Some(updated) = &status.data_updated {
        println!("  Data updated:     {}", updated);
    }

    if !status.is_ok() {
        return Err(anyhow::anyhow!("Upstream reports status {}", status.status));
    }
    Ok(())
}

/// Compose the application once and serve it until shutdown.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    let mut app = api::build(&config)?;

    if config.enable_metrics {
        let handle = metrics::init_metrics()?;
        metrics::register_route(&mut app, handle)?;
    }

    let mut router = app.into_router().layer(TraceLayer::new_for_http());
    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
