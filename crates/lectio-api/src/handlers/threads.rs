//! Discussion tree HTTP handlers.
//!
//! Document comments and topic replies share one implementation; the
//! route wrappers pick the scoped repository. Create responses carry a
//! rendered HTML fragment next to the structured node so the page can
//! splice it into the tree in place.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::Principal;
use crate::render::{render_node, render_nodes};
use crate::{ApiError, AppState};
use lectio_core::{AuthPrincipal, CreateNodeRequest, ListRootsRequest, ThreadRepository};
use lectio_db::PgThreadRepository;

/// Query parameters for listing root nodes.
#[derive(Debug, Deserialize)]
pub struct ListRootsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for editing a node.
#[derive(Debug, Deserialize)]
pub struct EditNodeRequest {
    pub body: String,
    pub attachment_url: Option<String>,
    pub image_url: Option<String>,
}

async fn create_node(
    repo: &PgThreadRepository,
    root_item_id: Uuid,
    principal: AuthPrincipal,
    req: CreateNodeRequest,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let created = repo.create(root_item_id, principal.user_id, req).await?;

    let body = serde_json::json!({
        "success": true,
        "html": render_node(&created.node),
        "is_nested": created.node.parent_id.is_some(),
        "parent_id": created.node.parent_id,
        "node": created.node,
        "new_count": created.sibling_count,
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn list_roots(
    repo: &PgThreadRepository,
    root_item_id: Uuid,
    query: ListRootsQuery,
) -> Result<Json<Vec<lectio_core::ThreadNode>>, ApiError> {
    let nodes = repo
        .roots(
            root_item_id,
            ListRootsRequest {
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(Json(nodes))
}

async fn list_children(
    repo: &PgThreadRepository,
    node_id: Uuid,
) -> Result<Json<serde_json::Value>, ApiError> {
    let nodes = repo.children(node_id).await?;
    Ok(Json(serde_json::json!({
        "html": render_nodes(&nodes),
        "nodes": nodes,
    })))
}

async fn edit_node(
    repo: &PgThreadRepository,
    node_id: Uuid,
    principal: AuthPrincipal,
    req: EditNodeRequest,
) -> Result<Json<serde_json::Value>, ApiError> {
    let node = repo
        .edit(
            node_id,
            principal,
            req.body,
            req.attachment_url,
            req.image_url,
        )
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "html": render_node(&node),
        "node": node,
    })))
}

// ─── Document comments ──────────────────────────────────────────────────────

pub async fn create_comment(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    // Unknown documents 404 before the tree is touched.
    use lectio_core::DocumentRepository;
    state.db.documents.fetch(document_id).await?;

    create_node(&state.db.comments, document_id, principal, req).await
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Query(query): Query<ListRootsQuery>,
) -> Result<Json<Vec<lectio_core::ThreadNode>>, ApiError> {
    list_roots(&state.db.comments, document_id, query).await
}

pub async fn list_comment_children(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    list_children(&state.db.comments, node_id).await
}

pub async fn edit_comment(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<EditNodeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    edit_node(&state.db.comments, node_id, principal, req).await
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.comments.delete(node_id, principal).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// ─── Topic replies ──────────────────────────────────────────────────────────

pub async fn create_reply(
    State(state): State<AppState>,
    Path(topic_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    use lectio_core::ForumRepository;
    state.db.forum.fetch_topic(topic_id).await?;

    create_node(&state.db.replies, topic_id, principal, req).await
}

pub async fn list_replies(
    State(state): State<AppState>,
    Path(topic_id): Path<Uuid>,
    Query(query): Query<ListRootsQuery>,
) -> Result<Json<Vec<lectio_core::ThreadNode>>, ApiError> {
    list_roots(&state.db.replies, topic_id, query).await
}

pub async fn list_reply_children(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    list_children(&state.db.replies, node_id).await
}

pub async fn edit_reply(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<EditNodeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    edit_node(&state.db.replies, node_id, principal, req).await
}

pub async fn delete_reply(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.replies.delete(node_id, principal).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
