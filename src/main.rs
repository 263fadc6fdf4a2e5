use chrono::Utc;
use clap::{Parser, Subcommand};
use configuration::{load_config, LoggingSettings};
use database::{CatalogStore, DbRepository};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web_server::health::{check_database_at_boot, LivenessReporter};

/// The main entry point for the AnimeHeaven backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Captured before anything else so the reported uptime covers startup.
    let started_at = Utc::now();

    // A missing .env file is fine; the environment and config.toml still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config()?;
    let _log_guard = init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => web_server::run_server(config, started_at).await,
        Commands::CheckDb => {
            let pool = database::connect(&config.database)?;
            let store: Arc<dyn CatalogStore> =
                Arc::new(DbRepository::new(pool, config.database.query_timeout()));
            let liveness = LivenessReporter::new(started_at, store);
            if check_database_at_boot(&liveness).await {
                Ok(())
            } else {
                anyhow::bail!("database at the configured URL is not reachable")
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// REST backend for the AnimeHeaven catalog.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default).
    Serve,
    /// Ping the database once and exit non-zero if it is unreachable.
    CheckDb,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// when a log directory is configured. `RUST_LOG` wins over the configured filter.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))?;

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "animeheaven.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
