//! PostgreSQL implementation of HomeRepository.
//!
//! The landing page is one hero row plus an ordered block list. Block
//! positions follow the content-block rules: contiguous and zero-based
//! at rest, rewritten only inside a transaction. This repository is the
//! sole writer of positions. The hero is a singleton enforced by a
//! `CHECK (id = 1)` primary key.

use std::collections::HashSet;

use async_trait::async_trait;
use lectio_core::{
    new_v7, ButtonStyle, ContentPosition, Error, HeroConfig, HomeBlock, HomeBlockFieldUpdate,
    HomeBlockKind, HomeButton, HomeRepository, Result,
};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgHomeRepository {
    pool: Pool<Postgres>,
}

impl PgHomeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_kind(s: &str) -> HomeBlockKind {
        s.parse().unwrap_or(HomeBlockKind::Reflection)
    }

    fn parse_position(s: &str) -> ContentPosition {
        match s {
            "left" => ContentPosition::Left,
            "right" => ContentPosition::Right,
            _ => ContentPosition::Center,
        }
    }

    fn position_str(p: ContentPosition) -> &'static str {
        match p {
            ContentPosition::Left => "left",
            ContentPosition::Center => "center",
            ContentPosition::Right => "right",
        }
    }

    fn parse_style(s: &str) -> ButtonStyle {
        match s {
            "secondary" => ButtonStyle::Secondary,
            _ => ButtonStyle::Primary,
        }
    }

    fn style_str(s: ButtonStyle) -> &'static str {
        match s {
            ButtonStyle::Primary => "primary",
            ButtonStyle::Secondary => "secondary",
        }
    }

    /// A button exists when its text column is set; the other three
    /// columns ride along.
    fn row_to_button(row: &sqlx::postgres::PgRow, prefix: &str) -> Option<HomeButton> {
        let text: Option<String> = row.get(format!("{}_text", prefix).as_str());
        text.map(|text| HomeButton {
            text,
            url: row
                .get::<Option<String>, _>(format!("{}_url", prefix).as_str())
                .unwrap_or_default(),
            style: Self::parse_style(
                row.get::<Option<&str>, _>(format!("{}_style", prefix).as_str())
                    .unwrap_or("primary"),
            ),
            new_tab: row
                .get::<Option<bool>, _>(format!("{}_new_tab", prefix).as_str())
                .unwrap_or(false),
        })
    }

    fn row_to_block(row: &sqlx::postgres::PgRow) -> HomeBlock {
        HomeBlock {
            id: row.get("id"),
            kind: Self::parse_kind(row.get("kind")),
            position: row.get("position"),
            title: row.get("title"),
            content: row.get("content"),
            background_url: row.get("background_url"),
            content_position: Self::parse_position(row.get("content_position")),
            primary_button: Self::row_to_button(row, "button1"),
            secondary_button: Self::row_to_button(row, "button2"),
            active: row.get("active"),
        }
    }

    const BLOCK_COLUMNS: &'static str = "id, kind, position, title, content, background_url, \
         content_position, button1_text, button1_url, button1_style, button1_new_tab, \
         button2_text, button2_url, button2_style, button2_new_tab, active";

    async fn fetch_block(&self, block_id: Uuid) -> Result<HomeBlock> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM home_block WHERE id = $1",
            Self::BLOCK_COLUMNS
        ))
        .bind(block_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| Self::row_to_block(&r))
            .ok_or_else(|| Error::NotFound(format!("home block {} not found", block_id)))
    }

    /// Write one button's four columns inside an open transaction.
    async fn write_button(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        block_id: Uuid,
        prefix: &str,
        button: &Option<HomeButton>,
    ) -> Result<()> {
        sqlx::query(&format!(
            "UPDATE home_block
             SET {p}_text = $2, {p}_url = $3, {p}_style = $4, {p}_new_tab = $5
             WHERE id = $1",
            p = prefix
        ))
        .bind(block_id)
        .bind(button.as_ref().map(|b| b.text.clone()))
        .bind(button.as_ref().map(|b| b.url.clone()))
        .bind(button.as_ref().map(|b| Self::style_str(b.style)))
        .bind(button.as_ref().map(|b| b.new_tab))
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl HomeRepository for PgHomeRepository {
    async fn hero(&self) -> Result<Option<HeroConfig>> {
        let row = sqlx::query(
            "SELECT title, subtitle, button_text, button_url, background_url
             FROM hero_configuration WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| HeroConfig {
            title: r.get("title"),
            subtitle: r.get("subtitle"),
            button_text: r.get("button_text"),
            button_url: r.get("button_url"),
            background_url: r.get("background_url"),
        }))
    }

    async fn set_hero(&self, hero: HeroConfig) -> Result<HeroConfig> {
        if hero.title.trim().is_empty() {
            return Err(Error::InvalidInput("hero title must not be empty".into()));
        }
        if hero.background_url.trim().is_empty() {
            return Err(Error::InvalidInput(
                "hero background image must not be empty".into(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO hero_configuration (id, title, subtitle, button_text, button_url, background_url)
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                subtitle = EXCLUDED.subtitle,
                button_text = EXCLUDED.button_text,
                button_url = EXCLUDED.button_url,
                background_url = EXCLUDED.background_url
            "#,
        )
        .bind(&hero.title)
        .bind(&hero.subtitle)
        .bind(&hero.button_text)
        .bind(&hero.button_url)
        .bind(&hero.background_url)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "home",
            op = "set_hero",
            "Hero configuration replaced"
        );
        Ok(hero)
    }

    async fn insert_block(&self, kind: HomeBlockKind) -> Result<HomeBlock> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // New blocks append at the end: position = current count.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM home_block")
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let id = new_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO home_block (id, kind, position)
             VALUES ($1, $2, $3)
             RETURNING {}",
            Self::BLOCK_COLUMNS
        ))
        .bind(id)
        .bind(kind.to_string())
        .bind(count as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "home",
            op = "insert_block",
            kind = %kind,
            position = count,
            "Home block appended"
        );
        Ok(Self::row_to_block(&row))
    }

    async fn list_blocks(&self, include_inactive: bool) -> Result<Vec<HomeBlock>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM home_block WHERE ($1 OR active) ORDER BY position",
            Self::BLOCK_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "home",
            op = "list_blocks",
            result_count = rows.len(),
            "Listed home blocks"
        );
        Ok(rows.iter().map(Self::row_to_block).collect())
    }

    async fn update_block(
        &self,
        block_id: Uuid,
        updates: Vec<HomeBlockFieldUpdate>,
    ) -> Result<HomeBlock> {
        // Existence check up front for a clean 404.
        self.fetch_block(block_id).await?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for update in &updates {
            match update {
                HomeBlockFieldUpdate::Kind(v) => {
                    sqlx::query("UPDATE home_block SET kind = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(v.to_string())
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                HomeBlockFieldUpdate::Title(v) => {
                    sqlx::query("UPDATE home_block SET title = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                HomeBlockFieldUpdate::Content(v) => {
                    sqlx::query("UPDATE home_block SET content = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                HomeBlockFieldUpdate::BackgroundUrl(v) => {
                    sqlx::query("UPDATE home_block SET background_url = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                HomeBlockFieldUpdate::ContentPosition(v) => {
                    sqlx::query("UPDATE home_block SET content_position = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(Self::position_str(*v))
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
                HomeBlockFieldUpdate::PrimaryButton(v) => {
                    Self::write_button(&mut tx, block_id, "button1", v).await?;
                }
                HomeBlockFieldUpdate::SecondaryButton(v) => {
                    Self::write_button(&mut tx, block_id, "button2", v).await?;
                }
                HomeBlockFieldUpdate::Active(v) => {
                    sqlx::query("UPDATE home_block SET active = $2 WHERE id = $1")
                        .bind(block_id)
                        .bind(v)
                        .execute(&mut *tx)
                        .await
                        .map_err(Error::Database)?;
                }
            }
        }
        tx.commit().await.map_err(Error::Database)?;

        self.fetch_block(block_id).await
    }

    async fn delete_block(&self, block_id: Uuid) -> Result<()> {
        let block = self.fetch_block(block_id).await?;

        // Delete and close the gap in one transaction so positions stay
        // contiguous for every reader.
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM home_block WHERE id = $1")
            .bind(block_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query("UPDATE home_block SET position = position - 1 WHERE position > $1")
            .bind(block.position)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "home",
            op = "delete_block",
            block_id = %block_id,
            "Home block deleted and survivors resequenced"
        );
        Ok(())
    }

    async fn reorder_blocks(&self, ordered_ids: Vec<Uuid>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Lock the block list and demand an exact id-set cover: no
        // missing blocks, no strangers, no duplicates.
        let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM home_block FOR UPDATE")
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
        let ordered_set: HashSet<Uuid> = ordered_ids.iter().copied().collect();
        if ordered_ids.len() != existing.len() || existing_set != ordered_set {
            return Err(Error::InvalidInput(
                "reorder id set must exactly match the home blocks".into(),
            ));
        }

        for (position, block_id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE home_block SET position = $2 WHERE id = $1")
                .bind(block_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "home",
            op = "reorder",
            block_count = ordered_ids.len(),
            "Home blocks reordered"
        );
        Ok(())
    }
}
