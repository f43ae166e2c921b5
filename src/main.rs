use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{Config, load_config};
use database::SqlStudentGateway;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod console;

/// The main entry point for the Student Result Management System.
fn main() -> anyhow::Result<()> {
    // Load environment variables (e.g. DATABASE_URL) from a .env file if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            serve(config)
        }
        Commands::Console => run_console(config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Stores student marks, grades them and serves them over HTTP.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and static front end.
    Serve(ServeArgs),
    /// Run the interactive text menu.
    Console,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the configured listening port.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Serves requests on a fixed pool of `server.workers` threads.
fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(workers = config.server.workers, "Starting worker pool.");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()
        .context("building the worker pool")?;

    runtime.block_on(web_server::run_server(&config))
}

fn run_console(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the console runtime")?;

    runtime.block_on(async {
        let gateway = Arc::new(SqlStudentGateway::new(config.database.url));
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut console = console::Console::new(stdin, tokio::io::stdout(), gateway);
        console.run().await
    })
}
