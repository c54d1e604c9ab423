//! K-Le PaaS backend test server entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, fmt::writer::MakeWriterExt, prelude::*, EnvFilter};

use k_le_paas_backend_test::api::{create_router, AppState};
use k_le_paas_backend_test::config::Config;
use k_le_paas_backend_test::utils::shutdown_signal;

/// K-Le PaaS backend test server.
#[derive(Parser, Debug)]
#[command(name = "k-le-paas-backend-test")]
#[command(about = "Health, echo and static JSON endpoints for PaaS deployment checks")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP requests (default).
    Run {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

fn init_logging(args: &Args, default_directive: &str) {
    let filter = if args.verbose {
        EnvFilter::new("k_le_paas_backend_test=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Warnings and errors go to stderr, everything else to stdout.
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.with(fmt::layer().with_writer(writer)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration first so RUST_LOG from .env reaches the filter
    let config = Config::load();
    let directive = config
        .as_ref()
        .map(|c| c.rust_log.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&args, &directive);

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::Run { port }) => cmd_run(config, port.or(args.port)).await,
        None => cmd_run(config, args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("K-LE PAAS BACKEND TEST - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!(
        "  Port: {}{}",
        config.listen_port(),
        if config.port_env().is_some() { "" } else { " (default)" }
    );
    println!(
        "  Environment: {}{}",
        config.node_env,
        if config.is_production() { " (production)" } else { "" }
    );
    println!("  Log Filter: {}", config.rust_log);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve the API until a shutdown signal arrives.
async fn cmd_run(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = Some(port.to_string());
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let port = config.listen_port();
    info!("Environment: {}", config.node_env);
    let router = create_router(AppState::new(config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;

    info!("K-Le PaaS Backend Test server running on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("API endpoint: http://localhost:{}/api", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
