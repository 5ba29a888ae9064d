//! Schema bootstrap: creates the declared tables and verifies the live
//! database against them.

use gridlab_store::config::Config;
use gridlab_store::pool::{create_pool, ping};
use gridlab_store::schema::{SchemaRegistry, SchemaVerifier, TableDeployer};

use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env file if present
    let dotenv = dotenvy::dotenv();

    // Load configuration
    let config = Config::from_env()?;
    let _guard = init_logging(config.log_dir.as_deref());

    if let Err(e) = dotenv {
        warn!("No .env file found or error loading it: {}", e);
    }

    let database = config.database_name().to_string();

    info!("Max connections: {}", config.max_connections);
    info!(
        "Username unique per table: {}",
        config.unique_username_per_table
    );

    let pool = create_pool(&config)?;
    ping(&pool, &database).await?;

    let registry = SchemaRegistry::new(config.schema_options());

    let deployed = TableDeployer::new().deploy(&pool, &registry).await?;
    if !deployed.creation_order.is_empty() {
        info!("Created tables: {}", deployed.creation_order.join(", "));
    }
    for table in &deployed.drifted {
        warn!("Table {} differs from its declaration", table);
    }

    let verification = SchemaVerifier::new().verify(&pool, &registry).await?;
    if !verification.passed {
        error!("{}", verification.error_log());
        anyhow::bail!("Schema verification failed for database {}", database);
    }

    info!("Database {} is ready", database);
    Ok(())
}

fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // File output with JSON format for easy parsing, daily rotation
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Warning: Could not create log directory {:?}: {}", dir, e);
            }
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "gridlab-store.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gridlab_store=debug")),
        )
        // Console output
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    debug!("Logging initialized - log directory: {:?}", log_dir);

    guard
}
