//! coachflow-portal library - member portal service
//!
//! Serves tier-gated catalog views and subscription lifecycle endpoints for
//! members of a coach or gym, plus the owner console that publishes what
//! members see.

use axum::Router;
use coachflow_common::config::PortalConfig;
use coachflow_common::entitlement::SqliteStore;
use coachflow_common::storage::ObjectStorage;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub config: Arc<PortalConfig>,
    pub storage: ObjectStorage,
    /// Gateway shared secret; 0 disables hash checking
    pub shared_secret: i64,
}

impl AppState {
    pub fn new(db: SqlitePool, config: PortalConfig, shared_secret: i64) -> Self {
        let storage = ObjectStorage::new(
            &config.storage_base_url,
            &config.storage_signing_secret,
            config.signed_url_ttl(),
        )
        .with_public_buckets(config.public_buckets.clone());
        Self {
            store: SqliteStore::new(db),
            config: Arc::new(config),
            storage,
            shared_secret,
        }
    }

    pub fn db(&self) -> &SqlitePool {
        self.store.pool()
    }
}

/// Build application router
///
/// `/health` and `/api/buildinfo` are public; everything under
/// `/api/providers` and `/api/console` requires gateway credentials.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    const CONSOLE: &str = "/api/console/providers/:provider_id";

    let protected = Router::new()
        .route("/api/providers/:provider_id/catalog", get(api::get_catalog))
        .route("/api/providers/:provider_id/packages", get(api::list_packages))
        .route(
            "/api/providers/:provider_id/subscription",
            get(api::get_subscription).post(api::register_subscription),
        )
        .route(
            "/api/providers/:provider_id/subscription/cancel",
            post(api::cancel_subscription),
        )
        .route(
            "/api/providers/:provider_id/subscription/tier",
            put(api::change_tier),
        )
        .route(
            &format!("{CONSOLE}/packages"),
            get(api::list_console_packages).post(api::create_package),
        )
        .route(
            &format!("{CONSOLE}/packages/:package_id"),
            put(api::update_package).delete(api::delete_package),
        )
        .route(
            &format!("{CONSOLE}/packages/:package_id/publish"),
            put(api::publish_package),
        )
        .route(
            &format!("{CONSOLE}/content"),
            get(api::list_console_content).post(api::create_content),
        )
        .route(
            &format!("{CONSOLE}/content/:content_id"),
            axum::routing::delete(api::delete_content),
        )
        .route(
            &format!("{CONSOLE}/content/:content_id/publish"),
            put(api::publish_content),
        )
        .route(&format!("{CONSOLE}/members"), get(api::list_members))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
