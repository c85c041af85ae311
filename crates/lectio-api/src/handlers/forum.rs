//! Forum HTTP handlers: categories and topics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::{require_privileged, Principal};
use crate::{ApiError, AppState};
use lectio_core::{CreateTopicRequest, ForumRepository};

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for listing topics.
#[derive(Debug, Deserialize)]
pub struct ListTopicsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create a forum category. Teachers and admins only.
pub async fn create_category(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<lectio_core::Category>), ApiError> {
    require_privileged(&principal)?;

    let category = state
        .db
        .forum
        .create_category(&req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<lectio_core::Category>>, ApiError> {
    Ok(Json(state.db.forum.list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<lectio_core::Category>, ApiError> {
    Ok(Json(state.db.forum.category_by_slug(&slug).await?))
}

/// Open a topic in a category, addressed by the category's slug.
pub async fn create_topic(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Principal(principal): Principal,
    Json(req): Json<CreateTopicRequest>,
) -> Result<(StatusCode, Json<lectio_core::Topic>), ApiError> {
    let category = state.db.forum.category_by_slug(&slug).await?;
    let topic = state
        .db
        .forum
        .create_topic(category.id, principal.user_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn list_topics(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListTopicsQuery>,
) -> Result<Json<Vec<lectio_core::Topic>>, ApiError> {
    let category = state.db.forum.category_by_slug(&slug).await?;
    let topics = state
        .db
        .forum
        .list_topics(category.id, query.limit, query.offset)
        .await?;
    Ok(Json(topics))
}

pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<lectio_core::Topic>, ApiError> {
    Ok(Json(state.db.forum.fetch_topic(id).await?))
}

/// Delete a topic with its reply tree. Author or privileged role only.
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<StatusCode, ApiError> {
    state.db.forum.delete_topic(id, principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
