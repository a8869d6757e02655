use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scorer_core::{
    create_audit_system, load_config, validate_config, AuditEvent, AuditStore, Config,
    GoogleSheetSource, MatchStore, RosterSource, RosterStore, SqliteAuditStore, SqliteMatchStore,
    SqliteRosterStore,
};
use scorer_server::api::create_router;
use scorer_server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capacity of the audit channel
const AUDIT_BUFFER_SIZE: usize = 1000;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Persistent stores, all opened on the configured database file.
struct Stores {
    audit: Arc<dyn AuditStore>,
    roster: Arc<dyn RosterStore>,
    matches: Arc<dyn MatchStore>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn read_config() -> Result<Config> {
    let path = std::env::var_os("SCORER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    info!("Loading configuration from {:?}", path);
    let config =
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Short SHA-256 of the effective configuration, recorded at startup.
fn config_fingerprint(config: &Config) -> String {
    let json = serde_json::to_string(config).unwrap_or_default();
    let digest = format!("{:x}", Sha256::digest(json.as_bytes()));
    digest[..16].to_string()
}

fn open_stores(config: &Config) -> Result<Stores> {
    let path = &config.database.path;
    let stores = Stores {
        audit: Arc::new(SqliteAuditStore::new(path).context("Failed to open audit store")?),
        roster: Arc::new(SqliteRosterStore::new(path).context("Failed to open roster store")?),
        matches: Arc::new(SqliteMatchStore::new(path).context("Failed to open match store")?),
    };
    info!(database = %path.display(), "Stores opened");
    Ok(stores)
}

async fn run() -> Result<()> {
    let config = read_config()?;
    info!(
        undo_depth = config.scoring.undo_depth,
        wide_runs = config.scoring.default_wide_runs,
        no_ball_runs = config.scoring.default_no_ball_runs,
        "Configuration loaded"
    );

    let stores = open_stores(&config)?;
    let sheets: Arc<dyn RosterSource> = Arc::new(
        GoogleSheetSource::new(Duration::from_secs(config.roster.sheet_timeout_secs))
            .context("Failed to create sheet client")?,
    );

    let (audit, audit_writer) = create_audit_system(Arc::clone(&stores.audit), AUDIT_BUFFER_SIZE);
    let writer_task = tokio::spawn(audit_writer.run());

    audit
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_fingerprint(&config),
        })
        .await;

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        audit.clone(),
        stores.audit,
        stores.roster,
        stores.matches,
        sheets,
    ));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Scorer {} listening on {}", VERSION, addr);

    // Serving consumes the router, and with it the state's audit handle
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down");
    audit
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The writer drains the channel and exits once the last handle is gone
    drop(audit);
    if let Err(e) = writer_task.await {
        error!("Audit writer task failed: {}", e);
    }
    info!("Audit writer stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
