//! lectio-api - HTTP API server for lectio

mod extract;
mod handlers;
mod render;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use lectio_core::EmbedNormalizer;
use lectio_db::Database;

use handlers::{
    documents::{
        create_document, delete_document, get_document, get_rating, list_documents, rate_document,
        update_document,
    },
    embeds::{describe_embed, validate_embed},
    forum::{
        create_category, create_topic, delete_topic, get_category, get_topic, list_categories,
        list_topics,
    },
    home::{
        create_home_block, delete_home_block, get_hero, home_summary, list_home_blocks,
        reorder_home_blocks, set_hero, update_home_block,
    },
    publications::{
        append_block, create_publication, delete_block, delete_publication, get_publication,
        list_blocks, list_publications, reorder_blocks, toggle_pin, update_block,
        update_publication,
    },
    threads::{
        create_comment, create_reply, delete_comment, delete_reply, edit_comment, edit_reply,
        list_comment_children, list_comments, list_replies, list_reply_children,
    },
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically, which keeps
/// log correlation cheap when chasing production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// Embed normalization pipeline, shared and immutable.
    embeds: Arc<EmbedNormalizer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "lectio_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lectio_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("lectio-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/lectio".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let state = AppState {
        db,
        embeds: Arc::new(EmbedNormalizer::default()),
    };

    // Periodic pool health snapshot in the logs.
    let metrics_pool = state.db.pool().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            lectio_db::log_pool_metrics(&metrics_pool);
        }
    });

    // CORS origins: comma-separated list, or permissive when unset
    let cors = match std::env::var("CORS_ORIGINS") {
        Ok(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers(tower_http::cors::Any)
        }
        Err(_) => CorsLayer::permissive(),
    };

    let app = Router::new()
        // ─── System ─────────────────────────────────────────────────────
        .route("/health", get(health_check))
        .route("/api/v1/home", get(home_summary))
        .route("/api/v1/home/hero", get(get_hero).put(set_hero))
        .route(
            "/api/v1/home/blocks",
            post(create_home_block).get(list_home_blocks),
        )
        .route("/api/v1/home/blocks/order", put(reorder_home_blocks))
        .route(
            "/api/v1/home/blocks/:id",
            patch(update_home_block).delete(delete_home_block),
        )
        // ─── Embed normalization ────────────────────────────────────────
        .route("/api/v1/embeds/validate", post(validate_embed))
        .route("/api/v1/embeds/describe", post(describe_embed))
        // ─── Documents ──────────────────────────────────────────────────
        .route("/api/v1/documents", post(create_document).get(list_documents))
        .route(
            "/api/v1/documents/:id",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .route(
            "/api/v1/documents/:id/rating",
            put(rate_document).get(get_rating),
        )
        // ─── Document comments ──────────────────────────────────────────
        .route(
            "/api/v1/documents/:id/comments",
            post(create_comment).get(list_comments),
        )
        .route("/api/v1/comments/:id/children", get(list_comment_children))
        .route(
            "/api/v1/comments/:id",
            patch(edit_comment).delete(delete_comment),
        )
        // ─── Forum ──────────────────────────────────────────────────────
        .route(
            "/api/v1/forum/categories",
            post(create_category).get(list_categories),
        )
        .route("/api/v1/forum/categories/:slug", get(get_category))
        .route(
            "/api/v1/forum/categories/:slug/topics",
            post(create_topic).get(list_topics),
        )
        .route("/api/v1/topics/:id", get(get_topic).delete(delete_topic))
        .route(
            "/api/v1/topics/:id/replies",
            post(create_reply).get(list_replies),
        )
        .route("/api/v1/replies/:id/children", get(list_reply_children))
        .route(
            "/api/v1/replies/:id",
            patch(edit_reply).delete(delete_reply),
        )
        // ─── Publications ───────────────────────────────────────────────
        .route(
            "/api/v1/publications",
            post(create_publication).get(list_publications),
        )
        .route(
            "/api/v1/publications/:id",
            get(get_publication)
                .patch(update_publication)
                .delete(delete_publication),
        )
        .route("/api/v1/publications/:id/pin", post(toggle_pin))
        .route(
            "/api/v1/publications/:id/blocks",
            post(append_block).get(list_blocks),
        )
        .route("/api/v1/publications/:id/blocks/order", put(reorder_blocks))
        .route("/api/v1/blocks/:id", patch(update_block).delete(delete_block))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)) // 10 MB
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lectio-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

// Public because it is the extractor rejection type of `Principal`.
#[derive(Debug)]
pub enum ApiError {
    Database(lectio_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<lectio_core::Error> for ApiError {
    fn from(err: lectio_core::Error) -> Self {
        match &err {
            lectio_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            lectio_core::Error::DocumentNotFound(id) => {
                ApiError::NotFound(format!("document {} not found", id))
            }
            lectio_core::Error::NodeNotFound(id) => {
                ApiError::NotFound(format!("node {} not found", id))
            }
            lectio_core::Error::PublicationNotFound(id) => {
                ApiError::NotFound(format!("publication {} not found", id))
            }
            lectio_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            lectio_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            lectio_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            lectio_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    return ApiError::Conflict(msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
