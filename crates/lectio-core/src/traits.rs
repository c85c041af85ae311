//! Core traits for lectio abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthPrincipal;
use crate::error::Result;
use crate::models::*;

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Request for listing documents.
#[derive(Debug, Clone, Default)]
pub struct ListDocumentsRequest {
    /// Filter by interface language.
    pub language: Option<Language>,
    /// Filter by school grade.
    pub grade: Option<Grade>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

/// Repository for reading-library documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document, returning its id.
    async fn insert(&self, author_id: Uuid, req: CreateDocumentRequest) -> Result<Uuid>;

    /// Fetch a document with its rating aggregate.
    async fn fetch(&self, id: Uuid) -> Result<Document>;

    /// List documents newest-first with optional filters.
    async fn list(&self, req: ListDocumentsRequest) -> Result<Vec<DocumentSummary>>;

    /// Apply field updates. Author or privileged role only.
    async fn update(
        &self,
        id: Uuid,
        requester: AuthPrincipal,
        updates: Vec<DocumentFieldUpdate>,
    ) -> Result<Document>;

    /// Delete a document and everything hanging off it.
    /// Author or privileged role only.
    async fn delete(&self, id: Uuid, requester: AuthPrincipal) -> Result<()>;
}

// =============================================================================
// DISCUSSION TREE REPOSITORY
// =============================================================================

/// Request for listing root-level nodes of a root item.
#[derive(Debug, Clone, Default)]
pub struct ListRootsRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for one threaded discussion tree (document comments or
/// topic replies; the two are structurally identical).
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Create a node under `root_item_id`, optionally parented.
    ///
    /// The parent, when given, must exist and belong to the same root
    /// item. `created_at` is stamped server-side. Returns the node plus
    /// the new direct-sibling count for nested creates.
    async fn create(
        &self,
        root_item_id: Uuid,
        author_id: Uuid,
        req: CreateNodeRequest,
    ) -> Result<CreatedNode>;

    /// Fetch one node.
    async fn fetch(&self, node_id: Uuid) -> Result<ThreadNode>;

    /// Root-level nodes of a root item, most recent first.
    async fn roots(&self, root_item_id: Uuid, req: ListRootsRequest) -> Result<Vec<ThreadNode>>;

    /// Direct children of a node, oldest first.
    async fn children(&self, node_id: Uuid) -> Result<Vec<ThreadNode>>;

    /// Replace body/attachment fields. Author or privileged role only;
    /// a node's position in the tree is immutable after creation.
    async fn edit(
        &self,
        node_id: Uuid,
        requester: AuthPrincipal,
        body: String,
        attachment_url: Option<String>,
        image_url: Option<String>,
    ) -> Result<ThreadNode>;

    /// Delete a node and all its descendants. Author or privileged role only.
    async fn delete(&self, node_id: Uuid, requester: AuthPrincipal) -> Result<()>;
}

// =============================================================================
// FORUM REPOSITORY
// =============================================================================

/// Repository for forum categories and topics.
#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Create a category; the slug is derived from the name.
    async fn create_category(&self, name: &str, description: &str) -> Result<Category>;

    /// List all categories.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Fetch a category by its slug.
    async fn category_by_slug(&self, slug: &str) -> Result<Category>;

    /// Categories ordered by topic count, busiest first.
    async fn most_active_categories(&self, limit: i64) -> Result<Vec<CategoryActivity>>;

    /// Create a topic in a category.
    async fn create_topic(
        &self,
        category_id: Uuid,
        author_id: Uuid,
        req: CreateTopicRequest,
    ) -> Result<Topic>;

    /// Fetch one topic.
    async fn fetch_topic(&self, id: Uuid) -> Result<Topic>;

    /// Topics of a category, newest first, paginated.
    async fn list_topics(
        &self,
        category_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Topic>>;

    /// Delete a topic (and its reply tree). Author or privileged role only.
    async fn delete_topic(&self, id: Uuid, requester: AuthPrincipal) -> Result<()>;
}

// =============================================================================
// PUBLICATION REPOSITORY
// =============================================================================

/// Request for listing publications.
#[derive(Debug, Clone, Default)]
pub struct ListPublicationsRequest {
    /// Filter by tag.
    pub tag: Option<String>,
    /// Include drafts and future-dated rows (privileged readers only).
    pub include_unpublished: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for CMS publications and their ordered content blocks.
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Create a draft publication.
    async fn insert(&self, author_id: Uuid, req: CreatePublicationRequest) -> Result<Uuid>;

    /// Fetch a publication.
    async fn fetch(&self, id: Uuid) -> Result<Publication>;

    /// Pinned first, then newest publish date. Non-privileged callers
    /// only see published rows whose publish date has passed.
    async fn list(&self, req: ListPublicationsRequest) -> Result<Vec<Publication>>;

    /// Apply field updates.
    async fn update(&self, id: Uuid, updates: Vec<PublicationFieldUpdate>) -> Result<Publication>;

    /// Flip the pinned flag, returning the new value.
    async fn toggle_pin(&self, id: Uuid) -> Result<bool>;

    /// Delete a publication and its blocks.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Append a new empty block of the given kind (position = count).
    async fn insert_block(&self, publication_id: Uuid, kind: BlockKind) -> Result<ContentBlock>;

    /// Blocks of a publication in position order.
    async fn list_blocks(&self, publication_id: Uuid) -> Result<Vec<ContentBlock>>;

    /// Apply field updates to a block; each field must match the
    /// block's kind.
    async fn update_block(&self, block_id: Uuid, updates: Vec<BlockFieldUpdate>)
        -> Result<ContentBlock>;

    /// Delete a block and resequence the survivors so positions stay
    /// contiguous and zero-based.
    async fn delete_block(&self, block_id: Uuid) -> Result<()>;

    /// Atomically rewrite all block positions to match `ordered_ids`.
    ///
    /// The id set must exactly cover the publication's blocks. Applied
    /// as one transaction; a reader never observes a partial interleave.
    async fn reorder_blocks(&self, publication_id: Uuid, ordered_ids: Vec<Uuid>) -> Result<()>;
}

// =============================================================================
// HOME PAGE REPOSITORY
// =============================================================================

/// Repository for the editable landing page: the hero singleton and the
/// ordered block list.
#[async_trait]
pub trait HomeRepository: Send + Sync {
    /// The hero configuration, if one has been saved.
    async fn hero(&self) -> Result<Option<HeroConfig>>;

    /// Replace the hero configuration wholesale.
    async fn set_hero(&self, hero: HeroConfig) -> Result<HeroConfig>;

    /// Append a new block of the given kind (position = count).
    async fn insert_block(&self, kind: HomeBlockKind) -> Result<HomeBlock>;

    /// Blocks in position order. Readers get active blocks only;
    /// editors pass `include_inactive`.
    async fn list_blocks(&self, include_inactive: bool) -> Result<Vec<HomeBlock>>;

    /// Apply field updates to a block.
    async fn update_block(&self, block_id: Uuid, updates: Vec<HomeBlockFieldUpdate>)
        -> Result<HomeBlock>;

    /// Delete a block and resequence the survivors so positions stay
    /// contiguous and zero-based.
    async fn delete_block(&self, block_id: Uuid) -> Result<()>;

    /// Atomically rewrite all block positions to match `ordered_ids`.
    ///
    /// The id set must exactly cover the block list. Applied as one
    /// transaction; a reader never observes a partial interleave.
    async fn reorder_blocks(&self, ordered_ids: Vec<Uuid>) -> Result<()>;
}

// =============================================================================
// RATING REPOSITORY
// =============================================================================

/// Repository for per-user document ratings.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// True upsert keyed on (document, user): concurrent submissions by
    /// the same user converge to the last-committed score.
    async fn upsert(&self, document_id: Uuid, user_id: Uuid, score: i16) -> Result<Rating>;

    /// Average score and count for a document.
    async fn aggregate(&self, document_id: Uuid) -> Result<(Option<f64>, i64)>;

    /// The requesting user's own score, if any.
    async fn user_score(&self, document_id: Uuid, user_id: Uuid) -> Result<Option<i16>>;
}
