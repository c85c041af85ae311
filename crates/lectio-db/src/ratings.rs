//! PostgreSQL implementation of RatingRepository.

use async_trait::async_trait;
use lectio_core::{Error, Rating, RatingRepository, Result};
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

/// Lowest accepted score.
pub const MIN_SCORE: i16 = 1;

/// Highest accepted score.
pub const MAX_SCORE: i16 = 5;

#[derive(Clone)]
pub struct PgRatingRepository {
    pool: Pool<Postgres>,
}

impl PgRatingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    async fn upsert(&self, document_id: Uuid, user_id: Uuid, score: i16) -> Result<Rating> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(Error::InvalidInput(format!(
                "rating score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document WHERE id = $1")
            .bind(document_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        if exists == 0 {
            return Err(Error::DocumentNotFound(document_id));
        }

        // One row per (document, user); concurrent submissions by the
        // same user converge to the last committed score.
        let row = sqlx::query(
            r#"
            INSERT INTO document_rating (document_id, user_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (document_id, user_id)
            DO UPDATE SET score = EXCLUDED.score, updated_at = NOW()
            RETURNING document_id, user_id, score, updated_at
            "#,
        )
        .bind(document_id)
        .bind(user_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "ratings",
            op = "upsert",
            document_id = %document_id,
            user_id = %user_id,
            score = score,
            "Rating stored"
        );
        Ok(Rating {
            document_id: row.get("document_id"),
            user_id: row.get("user_id"),
            score: row.get("score"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn aggregate(&self, document_id: Uuid) -> Result<(Option<f64>, i64)> {
        let row = sqlx::query(
            "SELECT AVG(score)::FLOAT8 AS average, COUNT(*) AS total
             FROM document_rating WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((row.get("average"), row.get("total")))
    }

    async fn user_score(&self, document_id: Uuid, user_id: Uuid) -> Result<Option<i16>> {
        sqlx::query_scalar(
            "SELECT score FROM document_rating WHERE document_id = $1 AND user_id = $2",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
