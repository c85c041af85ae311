//! PostgreSQL implementation of DocumentRepository.

use async_trait::async_trait;
use lectio_core::{
    new_v7, AuthPrincipal, CreateDocumentRequest, Document, DocumentFieldUpdate,
    DocumentRepository, DocumentSummary, Error, Grade, Language, ListDocumentsRequest, Result,
};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Default page size for document listings.
const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // Helper to parse language from string
    fn parse_language(s: &str) -> Language {
        s.parse().unwrap_or(Language::Es)
    }

    // Helper to parse grade from string
    fn parse_grade(s: &str) -> Grade {
        s.parse().unwrap_or(Grade::Sixth)
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> Document {
        Document {
            id: row.get("id"),
            language: Self::parse_language(row.get("language")),
            grade: Self::parse_grade(row.get("grade")),
            title: row.get("title"),
            description: row.get("description"),
            attachment_url: row.get("attachment_url"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            author_id: row.get("author_id"),
            average_rating: row.get("average_rating"),
            rating_count: row.get("rating_count"),
        }
    }

    fn row_to_summary(row: &sqlx::postgres::PgRow) -> DocumentSummary {
        DocumentSummary {
            id: row.get("id"),
            language: Self::parse_language(row.get("language")),
            grade: Self::parse_grade(row.get("grade")),
            title: row.get("title"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            author_id: row.get("author_id"),
            average_rating: row.get("average_rating"),
        }
    }

    /// Load author_id for authorization checks.
    async fn author_of(&self, id: Uuid) -> Result<Uuid> {
        sqlx::query_scalar("SELECT author_id FROM document WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::DocumentNotFound(id))
    }

    /// Best-rated documents for the landing page.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.language, d.grade, d.title, d.image_url,
                   d.created_at, d.author_id,
                   AVG(r.score)::FLOAT8 AS average_rating
            FROM document d
            JOIN document_rating r ON r.document_id = d.id
            GROUP BY d.id
            ORDER BY average_rating DESC, d.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_summary).collect())
    }

    /// Most recently added documents for the landing page.
    pub async fn recent(&self, limit: i64) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.language, d.grade, d.title, d.image_url,
                   d.created_at, d.author_id,
                   (SELECT AVG(score)::FLOAT8 FROM document_rating
                     WHERE document_id = d.id) AS average_rating
            FROM document d
            ORDER BY d.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_summary).collect())
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, author_id: Uuid, req: CreateDocumentRequest) -> Result<Uuid> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidInput("document title must not be empty".into()));
        }

        let id = new_v7();
        sqlx::query(
            r#"
            INSERT INTO document (id, language, grade, title, description,
                                  attachment_url, image_url, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(req.language.to_string())
        .bind(req.grade.to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.attachment_url)
        .bind(&req.image_url)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "insert",
            document_id = %id,
            user_id = %author_id,
            "Document created"
        );
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        let row = sqlx::query(
            r#"
            SELECT d.id, d.language, d.grade, d.title, d.description,
                   d.attachment_url, d.image_url, d.created_at, d.author_id,
                   (SELECT AVG(score)::FLOAT8 FROM document_rating
                     WHERE document_id = d.id) AS average_rating,
                   (SELECT COUNT(*) FROM document_rating
                     WHERE document_id = d.id) AS rating_count
            FROM document d
            WHERE d.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_document(&r))
            .ok_or(Error::DocumentNotFound(id))
    }

    async fn list(&self, req: ListDocumentsRequest) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.language, d.grade, d.title, d.image_url,
                   d.created_at, d.author_id,
                   (SELECT AVG(score)::FLOAT8 FROM document_rating
                     WHERE document_id = d.id) AS average_rating
            FROM document d
            WHERE ($1::TEXT IS NULL OR d.language = $1)
              AND ($2::TEXT IS NULL OR d.grade = $2)
            ORDER BY d.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(req.language.map(|l| l.to_string()))
        .bind(req.grade.map(|g| g.to_string()))
        .bind(req.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .bind(req.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "documents",
            op = "list",
            result_count = rows.len(),
            "Listed documents"
        );
        Ok(rows.iter().map(Self::row_to_summary).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        requester: AuthPrincipal,
        updates: Vec<DocumentFieldUpdate>,
    ) -> Result<Document> {
        let author_id = self.author_of(id).await?;
        if !requester.can_modify(author_id) {
            return Err(Error::Forbidden(
                "only the author or a privileged role may edit this document".into(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for update in &updates {
            match update {
                DocumentFieldUpdate::Language(v) => {
                    sqlx::query("UPDATE document SET language = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v.to_string())
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                DocumentFieldUpdate::Grade(v) => {
                    sqlx::query("UPDATE document SET grade = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v.to_string())
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                DocumentFieldUpdate::Title(v) => {
                    if v.trim().is_empty() {
                        return Err(Error::InvalidInput(
                            "document title must not be empty".into(),
                        ));
                    }
                    sqlx::query("UPDATE document SET title = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                DocumentFieldUpdate::Description(v) => {
                    sqlx::query("UPDATE document SET description = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                DocumentFieldUpdate::AttachmentUrl(v) => {
                    sqlx::query("UPDATE document SET attachment_url = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                DocumentFieldUpdate::ImageUrl(v) => {
                    sqlx::query("UPDATE document SET image_url = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
            }
        }
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "update",
            document_id = %id,
            user_id = %requester.user_id,
            "Document updated"
        );
        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid, requester: AuthPrincipal) -> Result<()> {
        let author_id = self.author_of(id).await?;
        if !requester.can_modify(author_id) {
            return Err(Error::Forbidden(
                "only the author or a privileged role may delete this document".into(),
            ));
        }

        // Comments and ratings go with it via ON DELETE CASCADE.
        sqlx::query("DELETE FROM document WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "delete",
            document_id = %id,
            user_id = %requester.user_id,
            "Document deleted"
        );
        Ok(())
    }
}
