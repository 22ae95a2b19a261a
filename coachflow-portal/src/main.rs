//! coachflow-portal - member portal service
//!
//! Serves gated catalog views and demo subscription endpoints behind the
//! gateway's caller headers.

use anyhow::Result;
use clap::Parser;
use coachflow_common::api::auth::load_shared_secret;
use coachflow_common::config::{resolve_root_folder, PortalConfig, DATABASE_FILE, ROOT_FOLDER_ENV};
use coachflow_common::db::init_database;
use coachflow_portal::{build_router, AppState};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "CoachFlow member portal")]
struct Args {
    /// Root folder holding coachflow.db and coachflow.toml
    /// (falls back to COACHFLOW_ROOT, then the user config file)
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Listen address, overrides `bind_addr` from coachflow.toml
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachflow_portal=info,coachflow_common=info,tower_http=info".into()),
        )
        .init();

    info!(
        "Starting CoachFlow portal v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    info!("Root folder: {}", root_folder.display());

    let mut config = PortalConfig::load(&root_folder)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let db_path = root_folder.join(DATABASE_FILE);
    info!("Database path: {}", db_path.display());
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let shared_secret = load_shared_secret(&pool).await?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    } else {
        info!("Loaded shared secret for API authentication");
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config, shared_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("coachflow-portal listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
