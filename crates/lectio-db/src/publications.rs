//! PostgreSQL implementation of PublicationRepository.
//!
//! Content-block positions are contiguous and zero-based within a
//! publication at rest. There is deliberately no unique constraint on
//! (publication_id, position): reorders rewrite every position inside a
//! single transaction, and intermediate states would violate such a
//! constraint. The repository is the sole writer of positions.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use lectio_core::{
    new_v7, BlockFieldUpdate, BlockKind, ContentBlock, CreatePublicationRequest, Error,
    ImageAlignment, ImageSize, ListPublicationsRequest, Publication, PublicationFieldUpdate,
    PublicationRepository, PublicationState, Result,
};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Default page size for publication listings.
const DEFAULT_LIST_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct PgPublicationRepository {
    pool: Pool<Postgres>,
}

impl PgPublicationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_state(s: &str) -> PublicationState {
        s.parse().unwrap_or(PublicationState::Draft)
    }

    fn parse_kind(s: &str) -> BlockKind {
        s.parse().unwrap_or(BlockKind::Text)
    }

    fn parse_size(s: &str) -> Option<ImageSize> {
        match s {
            "small" => Some(ImageSize::Small),
            "medium" => Some(ImageSize::Medium),
            "large" => Some(ImageSize::Large),
            "full" => Some(ImageSize::Full),
            _ => None,
        }
    }

    fn parse_alignment(s: &str) -> Option<ImageAlignment> {
        match s {
            "left" => Some(ImageAlignment::Left),
            "center" => Some(ImageAlignment::Center),
            "right" => Some(ImageAlignment::Right),
            _ => None,
        }
    }

    fn row_to_publication(row: &sqlx::postgres::PgRow) -> Publication {
        Publication {
            id: row.get("id"),
            title: row.get("title"),
            state: Self::parse_state(row.get("state")),
            publish_at: row.get("publish_at"),
            author_id: row.get("author_id"),
            pinned: row.get("pinned"),
            tags: row.get("tags"),
        }
    }

    fn row_to_block(row: &sqlx::postgres::PgRow) -> ContentBlock {
        ContentBlock {
            id: row.get("id"),
            publication_id: row.get("publication_id"),
            kind: Self::parse_kind(row.get("kind")),
            position: row.get("position"),
            text_content: row.get("text_content"),
            image_url: row.get("image_url"),
            image_size: row
                .get::<Option<&str>, _>("image_size")
                .and_then(Self::parse_size),
            image_alignment: row
                .get::<Option<&str>, _>("image_alignment")
                .and_then(Self::parse_alignment),
            image_caption: row.get("image_caption"),
            embed_content: row.get("embed_content"),
            quote_content: row.get("quote_content"),
            quote_author: row.get("quote_author"),
        }
    }

    const BLOCK_COLUMNS: &'static str = "id, publication_id, kind, position, text_content, \
         image_url, image_size, image_alignment, image_caption, \
         embed_content, quote_content, quote_author";

    async fn fetch_block(&self, block_id: Uuid) -> Result<ContentBlock> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM content_block WHERE id = $1",
            Self::BLOCK_COLUMNS
        ))
        .bind(block_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_block(&r))
            .ok_or_else(|| Error::NotFound(format!("content block {} not found", block_id)))
    }

    fn size_str(size: ImageSize) -> &'static str {
        match size {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
            ImageSize::Full => "full",
        }
    }

    fn alignment_str(alignment: ImageAlignment) -> &'static str {
        match alignment {
            ImageAlignment::Left => "left",
            ImageAlignment::Center => "center",
            ImageAlignment::Right => "right",
        }
    }
}

#[async_trait]
impl PublicationRepository for PgPublicationRepository {
    async fn insert(&self, author_id: Uuid, req: CreatePublicationRequest) -> Result<Uuid> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "publication title must not be empty".into(),
            ));
        }

        let id = new_v7();
        sqlx::query(
            r#"
            INSERT INTO publication (id, title, state, publish_at, author_id, tags)
            VALUES ($1, $2, 'draft', $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(req.publish_at.unwrap_or_else(Utc::now))
        .bind(author_id)
        .bind(&req.tags)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "publications",
            op = "insert",
            publication_id = %id,
            user_id = %author_id,
            "Publication created as draft"
        );
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Publication> {
        let row = sqlx::query(
            "SELECT id, title, state, publish_at, author_id, pinned, tags
             FROM publication WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_publication(&r))
            .ok_or(Error::PublicationNotFound(id))
    }

    async fn list(&self, req: ListPublicationsRequest) -> Result<Vec<Publication>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, state, publish_at, author_id, pinned, tags
            FROM publication
            WHERE ($1 OR (state = 'published' AND publish_at <= NOW()))
              AND ($2::TEXT IS NULL OR $2 = ANY(tags))
            ORDER BY pinned DESC, publish_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(req.include_unpublished)
        .bind(&req.tag)
        .bind(req.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .bind(req.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "publications",
            op = "list",
            result_count = rows.len(),
            "Listed publications"
        );
        Ok(rows.iter().map(Self::row_to_publication).collect())
    }

    async fn update(&self, id: Uuid, updates: Vec<PublicationFieldUpdate>) -> Result<Publication> {
        // Existence check up front for a clean 404.
        self.fetch(id).await?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for update in &updates {
            match update {
                PublicationFieldUpdate::Title(v) => {
                    if v.trim().is_empty() {
                        return Err(Error::InvalidInput(
                            "publication title must not be empty".into(),
                        ));
                    }
                    sqlx::query("UPDATE publication SET title = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                PublicationFieldUpdate::State(v) => {
                    sqlx::query("UPDATE publication SET state = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v.to_string())
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                PublicationFieldUpdate::PublishAt(v) => {
                    sqlx::query("UPDATE publication SET publish_at = $2 WHERE id = $1")
                        .bind(id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                PublicationFieldUpdate::Tags(v) => {
                    sqlx::query("UPDATE publication SET tags = $2 WHERE id = $1")
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
            component = "publications",
            op = "update",
            publication_id = %id,
            "Publication updated"
        );
        self.fetch(id).await
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<bool> {
        let pinned: Option<bool> = sqlx::query_scalar(
            "UPDATE publication SET pinned = NOT pinned WHERE id = $1 RETURNING pinned",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let pinned = pinned.ok_or(Error::PublicationNotFound(id))?;
        info!(
            subsystem = "db",
            component = "publications",
            op = "toggle_pin",
            publication_id = %id,
            pinned = pinned,
            "Publication pin toggled"
        );
        Ok(pinned)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM publication WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::PublicationNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "publications",
            op = "delete",
            publication_id = %id,
            "Publication deleted with its blocks"
        );
        Ok(())
    }

    async fn insert_block(&self, publication_id: Uuid, kind: BlockKind) -> Result<ContentBlock> {
        self.fetch(publication_id).await?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // New blocks append at the end: position = current count.
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_block WHERE publication_id = $1")
                .bind(publication_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let id = new_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO content_block (id, publication_id, kind, position)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            Self::BLOCK_COLUMNS
        ))
        .bind(id)
        .bind(publication_id)
        .bind(kind.to_string())
        .bind(count as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "publications",
            op = "insert_block",
            publication_id = %publication_id,
            kind = %kind,
            position = count,
            "Content block appended"
        );
        Ok(Self::row_to_block(&row))
    }

    async fn list_blocks(&self, publication_id: Uuid) -> Result<Vec<ContentBlock>> {
        self.fetch(publication_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM content_block WHERE publication_id = $1 ORDER BY position",
            Self::BLOCK_COLUMNS
        ))
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_block).collect())
    }

    async fn update_block(
        &self,
        block_id: Uuid,
        updates: Vec<BlockFieldUpdate>,
    ) -> Result<ContentBlock> {
        let block = self.fetch_block(block_id).await?;

        // Every field must match the block's kind before anything is
        // written, so a rejected update changes nothing.
        for update in &updates {
            if !update.applies_to(block.kind) {
                return Err(Error::InvalidInput(format!(
                    "field does not apply to a {} block",
                    block.kind
                )));
            }
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for update in &updates {
            let (column, value): (&str, String) = match update {
                BlockFieldUpdate::TextContent(v) => ("text_content", v.clone()),
                BlockFieldUpdate::ImageUrl(v) => ("image_url", v.clone()),
                BlockFieldUpdate::ImageSize(v) => ("image_size", Self::size_str(*v).to_string()),
                BlockFieldUpdate::ImageAlignment(v) => {
                    ("image_alignment", Self::alignment_str(*v).to_string())
                }
                BlockFieldUpdate::ImageCaption(v) => ("image_caption", v.clone()),
                BlockFieldUpdate::EmbedContent(v) => ("embed_content", v.clone()),
                BlockFieldUpdate::QuoteContent(v) => ("quote_content", v.clone()),
                BlockFieldUpdate::QuoteAuthor(v) => ("quote_author", v.clone()),
            };
            sqlx::query(&format!(
                "UPDATE content_block SET {} = $2 WHERE id = $1",
                column
            ))
            .bind(block_id)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }
        tx.commit().await.map_err(Error::Database)?;

        self.fetch_block(block_id).await
    }

    async fn delete_block(&self, block_id: Uuid) -> Result<()> {
        let block = self.fetch_block(block_id).await?;

        // Delete and close the gap in one transaction so positions stay
        // contiguous for every reader.
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM content_block WHERE id = $1")
            .bind(block_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query(
            "UPDATE content_block SET position = position - 1
             WHERE publication_id = $1 AND position > $2",
        )
        .bind(block.publication_id)
        .bind(block.position)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "publications",
            op = "delete_block",
            publication_id = %block.publication_id,
            "Content block deleted and survivors resequenced"
        );
        Ok(())
    }

    async fn reorder_blocks(&self, publication_id: Uuid, ordered_ids: Vec<Uuid>) -> Result<()> {
        self.fetch(publication_id).await?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Lock the publication's blocks and demand an exact id-set cover:
        // no missing blocks, no strangers, no duplicates.
        let existing: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM content_block WHERE publication_id = $1 FOR UPDATE",
        )
        .bind(publication_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
        let ordered_set: HashSet<Uuid> = ordered_ids.iter().copied().collect();
        if ordered_ids.len() != existing.len() || existing_set != ordered_set {
            return Err(Error::InvalidInput(
                "reorder id set must exactly match the publication's blocks".into(),
            ));
        }

        for (position, block_id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE content_block SET position = $2 WHERE id = $1")
                .bind(block_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "publications",
            op = "reorder",
            publication_id = %publication_id,
            block_count = ordered_ids.len(),
            "Content blocks reordered"
        );
        Ok(())
    }
}
