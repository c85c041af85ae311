//! Document HTTP handlers: library CRUD and per-user ratings.

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
    CreateDocumentRequest, DocumentFieldUpdate, DocumentRepository, Grade, Language,
    ListDocumentsRequest, RatingRepository,
};

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub language: Option<Language>,
    pub grade: Option<Grade>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create a document. Teachers and admins only.
pub async fn create_document(
    State(state): State<AppState>,
    Principal(principal): Principal,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_privileged(&principal)?;

    let id = state.db.documents.insert(principal.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// List documents newest-first, optionally filtered by language and grade.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<lectio_core::DocumentSummary>>, ApiError> {
    let documents = state
        .db
        .documents
        .list(ListDocumentsRequest {
            language: query.language,
            grade: query.grade,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(documents))
}

/// Fetch one document with its rating aggregate.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<lectio_core::Document>, ApiError> {
    Ok(Json(state.db.documents.fetch(id).await?))
}

/// Apply field updates to a document. Author or privileged role only.
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
    Json(updates): Json<Vec<DocumentFieldUpdate>>,
) -> Result<Json<lectio_core::Document>, ApiError> {
    Ok(Json(state.db.documents.update(id, principal, updates).await?))
}

/// Delete a document with its comments and ratings.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<StatusCode, ApiError> {
    state.db.documents.delete(id, principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for submitting a rating.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: i16,
}

/// Submit or replace the caller's rating for a document.
pub async fn rate_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
    Json(req): Json<RateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .ratings
        .upsert(id, principal.user_id, req.score)
        .await?;

    let (average, count) = state.db.ratings.aggregate(id).await?;
    Ok(Json(serde_json::json!({
        "average_rating": average,
        "rating_count": count,
        "user_score": req.score,
    })))
}

/// The document's rating aggregate plus the caller's own score.
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Principal(principal): Principal,
) -> Result<Json<serde_json::Value>, ApiError> {
    // 404 for unknown documents rather than an empty aggregate.
    state.db.documents.fetch(id).await?;

    let (average, count) = state.db.ratings.aggregate(id).await?;
    let user_score = state.db.ratings.user_score(id, principal.user_id).await?;
    Ok(Json(serde_json::json!({
        "average_rating": average,
        "rating_count": count,
        "user_score": user_score,
    })))
}
