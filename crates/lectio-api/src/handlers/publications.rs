//! Publication HTTP handlers: CMS publications, their ordered content
//! blocks, and the pin toggle.
//!
//! Embed blocks go through the normalizer at the boundary: a block update
//! carrying embed content is validated (and converted, and sanitized)
//! before anything is written, so the database only ever holds cleaned
//! markup from allow-listed domains.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::{require_privileged, Principal};
use crate::{ApiError, AppState};
use lectio_core::{
    BlockFieldUpdate, BlockKind, CreatePublicationRequest, ListPublicationsRequest,
    PublicationFieldUpdate, PublicationRepository,
};

/// Query parameters for listing publications.
#[derive(Debug, Deserialize)]
pub struct ListPublicationsQuery {
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create a draft publication. Teachers and admins only.
pub async fn create_publication(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(req): Json<CreatePublicationRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_privileged(&principal)?;

    let id = state.db.publications.insert(principal.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// List publications, pinned first then newest publish date. Drafts and
/// future-dated rows are only visible to privileged callers.
pub async fn list_publications(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Query(query): Query<ListPublicationsQuery>,
) -> Result<Json<Vec<lectio_core::Publication>>, ApiError> {
    let include_unpublished = principal
        .map(|Principal(p)| p.role.is_privileged())
        .unwrap_or(false);

    let publications = state
        .db
        .publications
        .list(ListPublicationsRequest {
            tag: query.tag,
            include_unpublished,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(publications))
}

pub async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<lectio_core::Publication>, ApiError> {
    Ok(Json(state.db.publications.fetch(id).await?))
}

pub async fn update_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
    Json(updates): Json<Vec<PublicationFieldUpdate>>,
) -> Result<Json<lectio_core::Publication>, ApiError> {
    require_privileged(&principal)?;
    Ok(Json(state.db.publications.update(id, updates).await?))
}

/// Flip the pinned flag, returning the new value.
pub async fn toggle_pin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_privileged(&principal)?;

    let pinned = state.db.publications.toggle_pin(id).await?;
    Ok(Json(serde_json::json!({ "pinned": pinned })))
}

pub async fn delete_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<StatusCode, ApiError> {
    require_privileged(&principal)?;

    state.db.publications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Content blocks ─────────────────────────────────────────────────────────

/// Request body for appending a block.
#[derive(Debug, Deserialize)]
pub struct AppendBlockRequest {
    pub kind: BlockKind,
}

/// Append an empty block at the end of the publication.
pub async fn append_block(
    State(state): State<AppState>,
    Path(publication_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<AppendBlockRequest>,
) -> Result<(StatusCode, Json<lectio_core::ContentBlock>), ApiError> {
    require_privileged(&principal)?;

    let block = state
        .db
        .publications
        .insert_block(publication_id, req.kind)
        .await?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn list_blocks(
    State(state): State<AppState>,
    Path(publication_id): Path<Uuid>,
) -> Result<Json<Vec<lectio_core::ContentBlock>>, ApiError> {
    Ok(Json(state.db.publications.list_blocks(publication_id).await?))
}

/// Apply field updates to a block. Embed content is normalized and
/// allow-list checked before it is stored.
pub async fn update_block(
    State(state): State<AppState>,
    Path(block_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(updates): Json<Vec<BlockFieldUpdate>>,
) -> Result<Json<lectio_core::ContentBlock>, ApiError> {
    require_privileged(&principal)?;

    let mut cleaned_updates = Vec::with_capacity(updates.len());
    for update in updates {
        match update {
            BlockFieldUpdate::EmbedContent(raw) => {
                let result = state.embeds.validate(&raw);
                if !result.ok {
                    return Err(ApiError::BadRequest(result.error));
                }
                cleaned_updates.push(BlockFieldUpdate::EmbedContent(result.cleaned));
            }
            other => cleaned_updates.push(other),
        }
    }

    let block = state
        .db
        .publications
        .update_block(block_id, cleaned_updates)
        .await?;
    Ok(Json(block))
}

pub async fn delete_block(
    State(state): State<AppState>,
    Path(block_id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<StatusCode, ApiError> {
    require_privileged(&principal)?;

    state.db.publications.delete_block(block_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for reordering blocks.
#[derive(Debug, Deserialize)]
pub struct ReorderBlocksRequest {
    /// The publication's block ids in their new order; must exactly
    /// cover the publication's blocks.
    pub order: Vec<Uuid>,
}

/// Atomically rewrite all block positions.
pub async fn reorder_blocks(
    State(state): State<AppState>,
    Path(publication_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<ReorderBlocksRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_privileged(&principal)?;

    state
        .db
        .publications
        .reorder_blocks(publication_id, req.order)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_body_uses_order_key() {
        let req: ReorderBlocksRequest = serde_json::from_str(
            r#"{"order": ["018f4e2a-0000-7000-8000-000000000001"]}"#,
        )
        .unwrap();
        assert_eq!(req.order.len(), 1);
    }

    #[test]
    fn test_reorder_body_requires_order_key() {
        assert!(serde_json::from_str::<ReorderBlocksRequest>(
            r#"{"ordered_ids": ["018f4e2a-0000-7000-8000-000000000001"]}"#,
        )
        .is_err());
    }
}
