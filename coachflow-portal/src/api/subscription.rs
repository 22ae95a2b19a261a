//! Subscription endpoints
//!
//! GET  /api/providers/:provider_id/subscription         current active subscription
//! POST /api/providers/:provider_id/subscription         demo registration
//! POST /api/providers/:provider_id/subscription/cancel  cancel
//! PUT  /api/providers/:provider_id/subscription/tier    plan change

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use coachflow_common::db::models::Subscription;
use coachflow_common::db::packages::get_package;
use coachflow_common::entitlement::{with_deadline, MemberSession};
use coachflow_common::{Error, Tier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::Caller;
use super::catalog::require_provider;
use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: Option<Subscription>,
}

/// Body for registration and plan change
#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub tier: String,
    pub package_id: Option<Uuid>,
}

impl TierRequest {
    /// Parse the tier and check the package, if given, belongs to the
    /// provider, is published, and grants that tier
    async fn validate(&self, state: &AppState, provider_id: Uuid) -> Result<(Tier, Option<Uuid>), ApiError> {
        let tier: Tier = self
            .tier
            .parse()
            .map_err(|e: coachflow_common::UnknownTierError| ApiError::BadRequest(e.to_string()))?;

        if let Some(package_id) = self.package_id {
            let lookup = get_package(state.db(), package_id);
            let package = with_deadline(state.config.store_timeout(), lookup, Error::Timeout)
                .await?
                .filter(|p| p.provider_id == provider_id && p.is_published)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown package {}", package_id)))?;
            if package.tier != tier {
                return Err(ApiError::BadRequest(format!(
                    "package {} grants {}, not {}",
                    package_id,
                    package.tier.as_str(),
                    tier.as_str()
                )));
            }
        }

        Ok((tier, self.package_id))
    }
}

async fn open_session<'a>(
    state: &'a AppState,
    caller_id: Uuid,
    provider_id: Uuid,
) -> Result<MemberSession<'a>, ApiError> {
    require_provider(state, provider_id).await?;
    Ok(MemberSession::open(&state.store, caller_id, provider_id, state.config.store_timeout()).await?)
}

/// GET /api/providers/:provider_id/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let session = open_session(&state, caller_id, provider_id).await?;
    Ok(Json(SubscriptionResponse {
        subscription: session.subscription().cloned(),
    }))
}

/// POST /api/providers/:provider_id/subscription
///
/// 409 if the caller already holds an active subscription here.
pub async fn register_subscription(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<TierRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let (tier, package_id) = request.validate(&state, provider_id).await?;
    let mut session = open_session(&state, caller_id, provider_id).await?;

    let created = session.register(tier, package_id).await?.clone();
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse {
            subscription: Some(created),
        }),
    ))
}

/// POST /api/providers/:provider_id/subscription/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut session = open_session(&state, caller_id, provider_id).await?;
    session.cancel().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/providers/:provider_id/subscription/tier
pub async fn change_tier(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<TierRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let (tier, package_id) = request.validate(&state, provider_id).await?;
    let mut session = open_session(&state, caller_id, provider_id).await?;

    let updated = session.change_tier(tier, package_id).await?.clone();
    Ok(Json(SubscriptionResponse {
        subscription: Some(updated),
    }))
}
