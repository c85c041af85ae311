//! Landing-page handlers: the read-only summary plus the block editor
//! (hero singleton and ordered home blocks). All editor mutations are
//! restricted to privileged roles; readers only ever see active blocks.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::{require_privileged, Principal};
use crate::{ApiError, AppState};
use lectio_core::{HeroConfig, HomeBlockFieldUpdate, HomeBlockKind, HomeRepository, HomeSummary};

/// Best-rated and newest documents plus the busiest forum categories,
/// assembled in one round trip for the landing page.
pub async fn home_summary(State(state): State<AppState>) -> Result<Json<HomeSummary>, ApiError> {
    Ok(Json(state.db.home_summary().await?))
}

// ─── Hero section ────────────────────────────────────────────────────────────

/// The hero configuration; 404 until one has been saved.
pub async fn get_hero(State(state): State<AppState>) -> Result<Json<HeroConfig>, ApiError> {
    state
        .db
        .home
        .hero()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("hero configuration not set".into()))
}

/// Replace the hero configuration wholesale. Teachers and admins only.
pub async fn set_hero(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(hero): Json<HeroConfig>,
) -> Result<Json<HeroConfig>, ApiError> {
    require_privileged(&principal)?;
    Ok(Json(state.db.home.set_hero(hero).await?))
}

// ─── Home blocks ─────────────────────────────────────────────────────────────

/// Request body for appending a home block.
#[derive(Debug, Deserialize)]
pub struct AppendHomeBlockRequest {
    pub kind: HomeBlockKind,
}

/// Append an empty block at the end of the landing page.
pub async fn create_home_block(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(req): Json<AppendHomeBlockRequest>,
) -> Result<(StatusCode, Json<lectio_core::HomeBlock>), ApiError> {
    require_privileged(&principal)?;

    let block = state.db.home.insert_block(req.kind).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Query parameters for listing home blocks.
#[derive(Debug, Deserialize, Default)]
pub struct ListHomeBlocksQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Home blocks in position order. Inactive blocks only show up for
/// privileged callers who ask for them.
pub async fn list_home_blocks(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Query(query): Query<ListHomeBlocksQuery>,
) -> Result<Json<Vec<lectio_core::HomeBlock>>, ApiError> {
    let privileged = principal
        .map(|Principal(p)| p.role.is_privileged())
        .unwrap_or(false);
    let include_inactive = query.include_inactive && privileged;

    Ok(Json(state.db.home.list_blocks(include_inactive).await?))
}

pub async fn update_home_block(
    State(state): State<AppState>,
    Path(block_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(updates): Json<Vec<HomeBlockFieldUpdate>>,
) -> Result<Json<lectio_core::HomeBlock>, ApiError> {
    require_privileged(&principal)?;
    Ok(Json(state.db.home.update_block(block_id, updates).await?))
}

pub async fn delete_home_block(
    State(state): State<AppState>,
    Path(block_id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<StatusCode, ApiError> {
    require_privileged(&principal)?;

    state.db.home.delete_block(block_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for reordering home blocks.
#[derive(Debug, Deserialize)]
pub struct ReorderHomeBlocksRequest {
    /// The block ids in their new order; must exactly cover the list.
    pub order: Vec<Uuid>,
}

/// Atomically rewrite all home block positions.
pub async fn reorder_home_blocks(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(req): Json<ReorderHomeBlocksRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_privileged(&principal)?;

    state.db.home.reorder_blocks(req.order).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
