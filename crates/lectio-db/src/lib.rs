//! # lectio-db
//!
//! PostgreSQL database layer for lectio.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Two threaded discussion trees (document comments, topic replies)
//!   served by one scoped repository implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use lectio_db::Database;
//! use lectio_core::{CreateDocumentRequest, DocumentRepository, Grade, Language};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/lectio").await?;
//!
//!     let document_id = db.documents.insert(author_id, CreateDocumentRequest {
//!         language: Language::Es,
//!         grade: Grade::Seventh,
//!         title: "La Odisea".to_string(),
//!         description: "<p>Lectura guiada</p>".to_string(),
//!         attachment_url: None,
//!         image_url: None,
//!     }).await?;
//!
//!     println!("Created document: {}", document_id);
//!     Ok(())
//! }
//! ```
pub mod documents;
pub mod forum;
pub mod home;
pub mod pool;
pub mod publications;
pub mod ratings;
pub mod threads;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use lectio_core::*;

// Re-export repository implementations
pub use documents::PgDocumentRepository;
pub use forum::{slugify, PgForumRepository};
pub use home::PgHomeRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use publications::PgPublicationRepository;
pub use ratings::PgRatingRepository;
pub use threads::{PgThreadRepository, ThreadScope};

/// Number of top-rated documents on the landing page.
pub const HOME_TOP_RATED: i64 = 8;

/// Number of most recent documents on the landing page.
pub const HOME_RECENT: i64 = 8;

/// Number of busiest forum categories on the landing page.
pub const HOME_ACTIVE_CATEGORIES: i64 = 4;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Reading-library documents.
    pub documents: PgDocumentRepository,
    /// Comment tree under documents.
    pub comments: PgThreadRepository,
    /// Reply tree under forum topics.
    pub replies: PgThreadRepository,
    /// Forum categories and topics.
    pub forum: PgForumRepository,
    /// CMS publications and their content blocks.
    pub publications: PgPublicationRepository,
    /// Per-user document ratings.
    pub ratings: PgRatingRepository,
    /// Editable landing page (hero and blocks).
    pub home: PgHomeRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: PgDocumentRepository::new(pool.clone()),
            comments: PgThreadRepository::document_comments(pool.clone()),
            replies: PgThreadRepository::topic_replies(pool.clone()),
            forum: PgForumRepository::new(pool.clone()),
            publications: PgPublicationRepository::new(pool.clone()),
            ratings: PgRatingRepository::new(pool.clone()),
            home: PgHomeRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Landing-page aggregate: best rated and newest documents plus the
    /// busiest forum categories.
    pub async fn home_summary(&self) -> Result<HomeSummary> {
        let top_rated = self.documents.top_rated(HOME_TOP_RATED).await?;
        let recent = self.documents.recent(HOME_RECENT).await?;
        let active_categories = self
            .forum
            .most_active_categories(HOME_ACTIVE_CATEGORIES)
            .await?;

        Ok(HomeSummary {
            top_rated,
            recent,
            active_categories,
        })
    }
}
