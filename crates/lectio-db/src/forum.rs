//! PostgreSQL implementation of ForumRepository.

use async_trait::async_trait;
use lectio_core::{
    new_v7, AuthPrincipal, Category, CategoryActivity, CreateTopicRequest, Error, ForumRepository,
    Result, Topic,
};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Default page size for topic listings.
const DEFAULT_TOPICS_LIMIT: i64 = 50;

/// Derive a URL slug from a category name: lowercase, non-alphanumeric
/// runs collapse to single hyphens, no leading or trailing hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for c in name.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[derive(Clone)]
pub struct PgForumRepository {
    pool: Pool<Postgres>,
}

impl PgForumRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_category(row: &sqlx::postgres::PgRow) -> Category {
        Category {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            slug: row.get("slug"),
        }
    }

    fn row_to_topic(row: &sqlx::postgres::PgRow) -> Topic {
        Topic {
            id: row.get("id"),
            category_id: row.get("category_id"),
            title: row.get("title"),
            body: row.get("body"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            author_id: row.get("author_id"),
        }
    }

    /// Pick a slug that is unique among existing categories by suffixing
    /// a counter when the base slug is taken.
    async fn unique_slug(&self, base: &str) -> Result<String> {
        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM forum_category WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        if taken == 0 {
            Ok(base.to_string())
        } else {
            Ok(format!("{}-{}", base, taken + 1))
        }
    }
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    async fn create_category(&self, name: &str, description: &str) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("category name must not be empty".into()));
        }

        let base = slugify(name);
        if base.is_empty() {
            return Err(Error::InvalidInput(
                "category name must contain at least one alphanumeric character".into(),
            ));
        }
        let slug = self.unique_slug(&base).await?;

        let id = new_v7();
        let row = sqlx::query(
            r#"
            INSERT INTO forum_category (id, name, description, slug)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, slug
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "forum",
            op = "create_category",
            slug = %slug,
            "Forum category created"
        );
        Ok(Self::row_to_category(&row))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, description, slug FROM forum_category ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_category).collect())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Category> {
        let row = sqlx::query(
            "SELECT id, name, description, slug FROM forum_category WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_category(&r))
            .ok_or_else(|| Error::NotFound(format!("forum category '{}' not found", slug)))
    }

    async fn most_active_categories(&self, limit: i64) -> Result<Vec<CategoryActivity>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.description, c.slug,
                   COUNT(t.id) AS topic_count
            FROM forum_category c
            LEFT JOIN forum_topic t ON t.category_id = c.id
            GROUP BY c.id
            ORDER BY topic_count DESC, c.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| CategoryActivity {
                category: Self::row_to_category(row),
                topic_count: row.get("topic_count"),
            })
            .collect())
    }

    async fn create_topic(
        &self,
        category_id: Uuid,
        author_id: Uuid,
        req: CreateTopicRequest,
    ) -> Result<Topic> {
        if req.title.trim().is_empty() || req.body.trim().is_empty() {
            return Err(Error::InvalidInput(
                "topic title and body must not be empty".into(),
            ));
        }

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_category WHERE id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        if exists == 0 {
            return Err(Error::NotFound(format!(
                "forum category {} not found",
                category_id
            )));
        }

        let id = new_v7();
        let row = sqlx::query(
            r#"
            INSERT INTO forum_topic (id, category_id, title, body, image_url, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, title, body, image_url, created_at, author_id
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(&req.title)
        .bind(&req.body)
        .bind(&req.image_url)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "forum",
            op = "create_topic",
            topic_id = %id,
            user_id = %author_id,
            "Forum topic created"
        );
        Ok(Self::row_to_topic(&row))
    }

    async fn fetch_topic(&self, id: Uuid) -> Result<Topic> {
        let row = sqlx::query(
            r#"
            SELECT id, category_id, title, body, image_url, created_at, author_id
            FROM forum_topic
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_topic(&r))
            .ok_or_else(|| Error::NotFound(format!("forum topic {} not found", id)))
    }

    async fn list_topics(
        &self,
        category_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Topic>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category_id, title, body, image_url, created_at, author_id
            FROM forum_topic
            WHERE category_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_id)
        .bind(limit.unwrap_or(DEFAULT_TOPICS_LIMIT))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "forum",
            op = "list_topics",
            result_count = rows.len(),
            "Listed topics"
        );
        Ok(rows.iter().map(Self::row_to_topic).collect())
    }

    async fn delete_topic(&self, id: Uuid, requester: AuthPrincipal) -> Result<()> {
        let topic = self.fetch_topic(id).await?;
        if !requester.can_modify(topic.author_id) {
            return Err(Error::Forbidden(
                "only the author or a privileged role may delete this topic".into(),
            ));
        }

        // The reply tree cascades with the topic.
        sqlx::query("DELETE FROM forum_topic WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "forum",
            op = "delete_topic",
            topic_id = %id,
            user_id = %requester.user_id,
            "Forum topic deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Club de Lectura"), "club-de-lectura");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  Ciencia & Tecnología!! "), "ciencia-tecnología");
    }

    #[test]
    fn test_slugify_empty_for_symbols_only() {
        assert_eq!(slugify("!!!"), "");
    }
}
