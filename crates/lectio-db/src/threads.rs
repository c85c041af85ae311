//! PostgreSQL implementation of ThreadRepository.
//!
//! One implementation serves both discussion trees: comments under
//! library documents and replies under forum topics. The two tables are
//! structurally identical; [`ThreadScope`] selects the table and the
//! root-item foreign key column at construction time.
//!
//! Ordering contract: root nodes list newest first, children of a node
//! list oldest first. Both orderings tie-break on id, which is a UUIDv7
//! and therefore time-ordered, so listings are stable even when two
//! nodes share a `created_at` timestamp.

use async_trait::async_trait;
use lectio_core::{
    new_v7, AuthPrincipal, CreateNodeRequest, CreatedNode, Error, ListRootsRequest, Result,
    ThreadNode, ThreadRepository,
};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Default page size for root-node listings.
const DEFAULT_ROOTS_LIMIT: i64 = 100;

/// Which discussion tree a repository instance operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadScope {
    /// Comments under a library document.
    DocumentComments,
    /// Replies under a forum topic.
    TopicReplies,
}

impl ThreadScope {
    /// Backing table name.
    fn table(self) -> &'static str {
        match self {
            ThreadScope::DocumentComments => "document_comment",
            ThreadScope::TopicReplies => "topic_reply",
        }
    }

    /// Column holding the root-item foreign key.
    fn root_column(self) -> &'static str {
        match self {
            ThreadScope::DocumentComments => "document_id",
            ThreadScope::TopicReplies => "topic_id",
        }
    }
}

#[derive(Clone)]
pub struct PgThreadRepository {
    pool: Pool<Postgres>,
    scope: ThreadScope,
}

impl PgThreadRepository {
    pub fn new(pool: Pool<Postgres>, scope: ThreadScope) -> Self {
        Self { pool, scope }
    }

    /// Repository over the document-comment tree.
    pub fn document_comments(pool: Pool<Postgres>) -> Self {
        Self::new(pool, ThreadScope::DocumentComments)
    }

    /// Repository over the topic-reply tree.
    pub fn topic_replies(pool: Pool<Postgres>) -> Self {
        Self::new(pool, ThreadScope::TopicReplies)
    }

    fn row_to_node(&self, row: &sqlx::postgres::PgRow) -> ThreadNode {
        ThreadNode {
            id: row.get("id"),
            root_item_id: row.get(self.scope.root_column()),
            parent_id: row.get("parent_id"),
            author_id: row.get("author_id"),
            body: row.get("body"),
            created_at: row.get("created_at"),
            attachment_url: row.get("attachment_url"),
            image_url: row.get("image_url"),
        }
    }

    fn select_clause(&self) -> String {
        format!(
            "SELECT id, {root}, parent_id, author_id, body, created_at,
                    attachment_url, image_url
             FROM {table}",
            root = self.scope.root_column(),
            table = self.scope.table(),
        )
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    async fn create(
        &self,
        root_item_id: Uuid,
        author_id: Uuid,
        req: CreateNodeRequest,
    ) -> Result<CreatedNode> {
        if req.body.trim().is_empty() {
            return Err(Error::InvalidInput("node body must not be empty".into()));
        }

        // A parent must exist and hang off the same root item. The check
        // runs before the insert so cross-root grafts are rejected with a
        // clear error instead of silently corrupting the tree.
        if let Some(parent_id) = req.parent_id {
            let parent_root: Option<Uuid> = sqlx::query_scalar(&format!(
                "SELECT {root} FROM {table} WHERE id = $1",
                root = self.scope.root_column(),
                table = self.scope.table(),
            ))
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

            match parent_root {
                None => return Err(Error::NodeNotFound(parent_id)),
                Some(root) if root != root_item_id => {
                    return Err(Error::InvalidInput(
                        "parent node belongs to a different root item".into(),
                    ));
                }
                Some(_) => {}
            }
        }

        let id = new_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO {table} (id, {root}, parent_id, author_id, body,
                                  attachment_url, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, {root}, parent_id, author_id, body, created_at,
                       attachment_url, image_url",
            root = self.scope.root_column(),
            table = self.scope.table(),
        ))
        .bind(id)
        .bind(root_item_id)
        .bind(req.parent_id)
        .bind(author_id)
        .bind(&req.body)
        .bind(&req.attachment_url)
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let node = self.row_to_node(&row);

        // The UI refreshes the sibling strip in place after a nested
        // create, so return the new direct-sibling count with the node.
        let sibling_count = match req.parent_id {
            Some(parent_id) => Some(
                sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM {table} WHERE parent_id = $1",
                    table = self.scope.table(),
                ))
                .bind(parent_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?,
            ),
            None => None,
        };

        info!(
            subsystem = "db",
            component = "threads",
            op = "create_node",
            db_table = self.scope.table(),
            node_id = %node.id,
            user_id = %author_id,
            nested = req.parent_id.is_some(),
            "Thread node created"
        );
        Ok(CreatedNode {
            node,
            sibling_count,
        })
    }

    async fn fetch(&self, node_id: Uuid) -> Result<ThreadNode> {
        let row = sqlx::query(&format!("{} WHERE id = $1", self.select_clause()))
            .bind(node_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| self.row_to_node(&r))
            .ok_or(Error::NodeNotFound(node_id))
    }

    async fn roots(&self, root_item_id: Uuid, req: ListRootsRequest) -> Result<Vec<ThreadNode>> {
        let rows = sqlx::query(&format!(
            "{select} WHERE {root} = $1 AND parent_id IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
            select = self.select_clause(),
            root = self.scope.root_column(),
        ))
        .bind(root_item_id)
        .bind(req.limit.unwrap_or(DEFAULT_ROOTS_LIMIT))
        .bind(req.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "threads",
            op = "roots",
            db_table = self.scope.table(),
            result_count = rows.len(),
            "Listed root nodes"
        );
        Ok(rows.iter().map(|r| self.row_to_node(r)).collect())
    }

    async fn children(&self, node_id: Uuid) -> Result<Vec<ThreadNode>> {
        // Existence check so an unknown node yields a 404 rather than an
        // indistinguishable empty list.
        self.fetch(node_id).await?;

        let rows = sqlx::query(&format!(
            "{select} WHERE parent_id = $1
             ORDER BY created_at ASC, id ASC",
            select = self.select_clause(),
        ))
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(|r| self.row_to_node(r)).collect())
    }

    async fn edit(
        &self,
        node_id: Uuid,
        requester: AuthPrincipal,
        body: String,
        attachment_url: Option<String>,
        image_url: Option<String>,
    ) -> Result<ThreadNode> {
        if body.trim().is_empty() {
            return Err(Error::InvalidInput("node body must not be empty".into()));
        }

        let existing = self.fetch(node_id).await?;
        if !requester.can_modify(existing.author_id) {
            return Err(Error::Forbidden(
                "only the author or a privileged role may edit this node".into(),
            ));
        }

        // Tree position (parent, root item) is immutable after creation;
        // only content fields are writable.
        let row = sqlx::query(&format!(
            "UPDATE {table}
             SET body = $2, attachment_url = $3, image_url = $4
             WHERE id = $1
             RETURNING id, {root}, parent_id, author_id, body, created_at,
                       attachment_url, image_url",
            table = self.scope.table(),
            root = self.scope.root_column(),
        ))
        .bind(node_id)
        .bind(&body)
        .bind(&attachment_url)
        .bind(&image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "threads",
            op = "edit_node",
            db_table = self.scope.table(),
            node_id = %node_id,
            user_id = %requester.user_id,
            "Thread node edited"
        );
        Ok(self.row_to_node(&row))
    }

    async fn delete(&self, node_id: Uuid, requester: AuthPrincipal) -> Result<()> {
        let existing = self.fetch(node_id).await?;
        if !requester.can_modify(existing.author_id) {
            return Err(Error::Forbidden(
                "only the author or a privileged role may delete this node".into(),
            ));
        }

        // The parent_id foreign key cascades, so the whole subtree goes
        // in one statement.
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE id = $1",
            table = self.scope.table(),
        ))
        .bind(node_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "threads",
            op = "delete_node",
            db_table = self.scope.table(),
            node_id = %node_id,
            user_id = %requester.user_id,
            "Thread node deleted with its subtree"
        );
        Ok(())
    }
}
