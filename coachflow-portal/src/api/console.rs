//! Provider console endpoints
//!
//! Only the provider's owner may call these; anyone else gets 403.
//!
//! GET    /api/console/providers/:provider_id/packages
//! POST   /api/console/providers/:provider_id/packages
//! PUT    /api/console/providers/:provider_id/packages/:package_id
//! DELETE /api/console/providers/:provider_id/packages/:package_id
//! PUT    /api/console/providers/:provider_id/packages/:package_id/publish
//! GET    /api/console/providers/:provider_id/content
//! POST   /api/console/providers/:provider_id/content
//! PUT    /api/console/providers/:provider_id/content/:content_id/publish
//! DELETE /api/console/providers/:provider_id/content/:content_id
//! GET    /api/console/providers/:provider_id/members

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use coachflow_common::console::{ContentDraft, ProviderConsole};
use coachflow_common::db::models::{
    BillingInterval, ContentItem, ContentType, Package, PackageChanges, Subscription,
};
use coachflow_common::Tier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::Caller;
use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PackageRequest {
    pub name: String,
    pub tier: String,
    pub price_cents: i64,
    pub billing_interval: Option<String>,
}

impl TryFrom<PackageRequest> for PackageChanges {
    type Error = ApiError;

    fn try_from(req: PackageRequest) -> Result<Self, Self::Error> {
        let billing_interval = match req.billing_interval.as_deref() {
            None => BillingInterval::Month,
            Some(label) => BillingInterval::parse(label)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown billing interval {:?}", label)))?,
        };
        Ok(PackageChanges {
            name: req.name,
            tier: parse_tier(&req.tier)?,
            price_cents: req.price_cents,
            billing_interval,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub required_tier: Option<String>,
    pub storage_ref: String,
    pub sort_order: Option<i64>,
    pub package_id: Option<Uuid>,
}

impl TryFrom<ContentRequest> for ContentDraft {
    type Error = ApiError;

    fn try_from(req: ContentRequest) -> Result<Self, Self::Error> {
        let content_type = ContentType::parse(&req.content_type)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown content type {:?}", req.content_type)))?;
        let required_tier = match req.required_tier.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(parse_tier(label)?),
        };
        Ok(ContentDraft {
            package_id: req.package_id,
            required_tier,
            title: req.title,
            description: req.description,
            content_type,
            storage_ref: req.storage_ref,
            sort_order: req.sort_order.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub members: Vec<Subscription>,
}

fn parse_tier(label: &str) -> Result<Tier, ApiError> {
    label
        .parse()
        .map_err(|e: coachflow_common::UnknownTierError| ApiError::BadRequest(e.to_string()))
}

async fn open_console(
    state: &AppState,
    caller_id: Uuid,
    provider_id: Uuid,
) -> Result<ProviderConsole<'_>, ApiError> {
    Ok(ProviderConsole::open(state.db(), caller_id, provider_id, state.config.store_timeout()).await?)
}

pub async fn list_console_packages(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<Package>>, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(console.packages().await?))
}

/// Created packages start as unpublished drafts
pub async fn create_package(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<PackageRequest>,
) -> Result<(StatusCode, Json<Package>), ApiError> {
    let changes = PackageChanges::try_from(request)?;
    let console = open_console(&state, caller_id, provider_id).await?;
    let package = console.create_package(changes).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

pub async fn update_package(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path((provider_id, package_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PackageRequest>,
) -> Result<Json<Package>, ApiError> {
    let changes = PackageChanges::try_from(request)?;
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(console.update_package(package_id, changes).await?))
}

pub async fn publish_package(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path((provider_id, package_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<Package>, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(
        console
            .set_package_published(package_id, request.published)
            .await?,
    ))
}

/// 409 while a subscription or content item still references the package
pub async fn delete_package(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path((provider_id, package_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    console.delete_package(package_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_console_content(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(console.content().await?))
}

pub async fn create_content(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    let draft = ContentDraft::try_from(request)?;
    let console = open_console(&state, caller_id, provider_id).await?;
    let item = console.create_content(draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn publish_content(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path((provider_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<ContentItem>, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(
        console
            .set_content_published(content_id, request.published)
            .await?,
    ))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path((provider_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    console.delete_content(content_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subscriber roster, newest first, every status
pub async fn list_members(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<RosterResponse>, ApiError> {
    let console = open_console(&state, caller_id, provider_id).await?;
    Ok(Json(RosterResponse {
        members: console.members().await?,
    }))
}
