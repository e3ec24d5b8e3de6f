//! `dealerdeskd` — the DealerDesk server binary.
//!
//! Usage:
//!   dealerdeskd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/dealerdesk/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use account::AccountModule;
use account::mailing::LogMailer;
use dealerdesk_core::{Module, StorageConfig};
use showroom::ShowroomModule;

use config::ServerConfig;

/// DealerDesk server.
#[derive(Parser, Debug)]
#[command(name = "dealerdeskd", about = "DealerDesk server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let storage = StorageConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn dealerdesk_sql::SQLStore> = Arc::new(
        dealerdesk_sql::SqliteStore::open(&storage.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // ── Initialize modules ──

    let account_module = AccountModule::new(
        Arc::clone(&sql),
        Arc::new(LogMailer),
        server_config.account_config(),
    )?;
    info!("Account module initialized");

    let showroom_module = ShowroomModule::new(
        Arc::clone(&sql),
        Arc::clone(account_module.service()),
    )?;
    info!("Showroom module initialized");

    let module_routes = vec![
        (account_module.name(), account_module.routes()),
        (showroom_module.name(), showroom_module.routes()),
    ];

    // Build router with the JWT middleware on top.
    let app = routes::build_router(Arc::clone(account_module.service()), module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("DealerDesk server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
