//! Catalog endpoints
//!
//! GET /api/providers/:provider_id/catalog
//! GET /api/providers/:provider_id/packages

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use coachflow_common::console;
use coachflow_common::db::models::{Package, Provider};
use coachflow_common::entitlement::{
    build_catalog_view, with_deadline, CatalogSource, CatalogView, MemberSession,
};
use coachflow_common::FetchError;
use serde::Serialize;
use uuid::Uuid;

use super::auth::Caller;
use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub provider: Provider,
    #[serde(flatten)]
    pub view: CatalogView,
}

/// Provider lookup under the store deadline; 404 if absent
pub(crate) async fn require_provider(state: &AppState, provider_id: Uuid) -> Result<Provider, ApiError> {
    Ok(console::require_provider(state.db(), provider_id, state.config.store_timeout()).await?)
}

/// GET /api/providers/:provider_id/catalog
///
/// The caller's gated view of the provider's published content.
pub async fn get_catalog(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let provider = require_provider(&state, provider_id).await?;

    let session = MemberSession::open(
        &state.store,
        caller_id,
        provider_id,
        state.config.store_timeout(),
    )
    .await?;

    let view = build_catalog_view(
        &session,
        &state.store,
        &state.storage,
        state.config.no_subscription_policy,
    )
    .await?;

    Ok(Json(CatalogResponse { provider, view }))
}

/// GET /api/providers/:provider_id/packages
pub async fn list_packages(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<Package>>, ApiError> {
    require_provider(&state, provider_id).await?;

    let packages = with_deadline(
        state.config.store_timeout(),
        state.store.published_packages(provider_id),
        FetchError::Timeout,
    )
    .await?;

    Ok(Json(packages))
}
