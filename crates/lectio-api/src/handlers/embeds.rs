//! Embed normalization HTTP handlers.
//!
//! Exposes the validate/describe pipeline so editors can check pasted
//! content before it lands in a publication block.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::AppState;

/// Request body for embed validation and description.
#[derive(Debug, Deserialize)]
pub struct EmbedContentRequest {
    pub content: String,
}

/// Validate (and convert, and sanitize) embed-field input.
///
/// # Returns
/// - 200 OK with `{success:true, html, info}` when the content is accepted
/// - 400 Bad Request with `{success:false, error, info}` otherwise
///
/// The classification report rides along in both cases so the editor can
/// show what the input was taken for.
pub async fn validate_embed(
    State(state): State<AppState>,
    Json(req): Json<EmbedContentRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let info = state.embeds.describe(&req.content);
    let result = state.embeds.validate(&req.content);

    if result.ok {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "html": result.cleaned,
                "info": info,
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": result.error,
                "info": info,
            })),
        )
    }
}

/// Classify embed-field input without converting it. Always 200; the
/// report says whether conversion would succeed.
pub async fn describe_embed(
    State(state): State<AppState>,
    Json(req): Json<EmbedContentRequest>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "info": state.embeds.describe(&req.content),
    }))
}
