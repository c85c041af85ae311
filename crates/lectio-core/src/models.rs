//! Core data models for lectio.
//!
//! These types are shared across all lectio crates and represent the
//! platform's domain entities: reading documents, threaded discussion
//! nodes, forum categories/topics, publications built from ordered
//! content blocks, and per-user document ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// Interface language of a reading document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Es => write!(f, "es"),
            Language::En => write!(f, "en"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// School grade a document is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Sixth,
    Seventh,
    Eighth,
    Ninth,
    Tenth,
    Eleventh,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::Sixth => "sixth",
            Grade::Seventh => "seventh",
            Grade::Eighth => "eighth",
            Grade::Ninth => "ninth",
            Grade::Tenth => "tenth",
            Grade::Eleventh => "eleventh",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sixth" => Ok(Grade::Sixth),
            "seventh" => Ok(Grade::Seventh),
            "eighth" => Ok(Grade::Eighth),
            "ninth" => Ok(Grade::Ninth),
            "tenth" => Ok(Grade::Tenth),
            "eleventh" => Ok(Grade::Eleventh),
            other => Err(format!("unknown grade: {}", other)),
        }
    }
}

/// A reading document in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub language: Language,
    pub grade: Grade,
    pub title: String,
    /// Rich-text body (trusted HTML produced by the editor).
    pub description: String,
    /// Publicly resolvable URL of the attachment, if any (external storage).
    pub attachment_url: Option<String>,
    /// Publicly resolvable URL of the cover image, if any.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    /// Average rating across users, when at least one rating exists.
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

/// Summary view of a document for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub language: Language,
    pub grade: Grade,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

/// Request for creating a new document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub language: Language,
    pub grade: Grade,
    pub title: String,
    pub description: String,
    pub attachment_url: Option<String>,
    pub image_url: Option<String>,
}

/// One editable document field.
///
/// Updates arrive as a list of these variants; unknown field names are
/// rejected by serde at the boundary instead of being filtered at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DocumentFieldUpdate {
    Language(Language),
    Grade(Grade),
    Title(String),
    Description(String),
    AttachmentUrl(Option<String>),
    ImageUrl(Option<String>),
}

// =============================================================================
// DISCUSSION TREE TYPES
// =============================================================================

/// One comment or reply: addressable, optionally parented to another node
/// under the same root item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadNode {
    pub id: Uuid,
    /// The document or forum topic this node belongs to.
    pub root_item_id: Uuid,
    /// None for root-level nodes.
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    /// Rich-text body.
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub attachment_url: Option<String>,
    pub image_url: Option<String>,
}

/// Request for creating a comment or reply node.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNodeRequest {
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub attachment_url: Option<String>,
    pub image_url: Option<String>,
}

/// A created node plus the data the UI needs to update in place.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedNode {
    pub node: ThreadNode,
    /// New count of direct siblings under the same parent.
    /// Only computed for nested creates.
    pub sibling_count: Option<i64>,
}

// =============================================================================
// FORUM TYPES
// =============================================================================

/// A forum category (subforum).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
}

/// Category with its topic count, for the home summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryActivity {
    pub category: Category,
    pub topic_count: i64,
}

/// A discussion topic within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    /// The opening post.
    pub body: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
}

/// Request for creating a topic in a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopicRequest {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
}

// =============================================================================
// PUBLICATION TYPES
// =============================================================================

/// Publication workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Draft,
    Published,
}

impl fmt::Display for PublicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationState::Draft => write!(f, "draft"),
            PublicationState::Published => write!(f, "published"),
        }
    }
}

impl FromStr for PublicationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PublicationState::Draft),
            "published" => Ok(PublicationState::Published),
            other => Err(format!("unknown publication state: {}", other)),
        }
    }
}

/// A CMS publication assembled from ordered content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub id: Uuid,
    pub title: String,
    pub state: PublicationState,
    /// Visible to readers once state is Published and this instant passes.
    pub publish_at: DateTime<Utc>,
    pub author_id: Option<Uuid>,
    /// Pinned publications sort before everything else.
    pub pinned: bool,
    pub tags: Vec<String>,
}

/// Request for creating a publication (starts as a draft).
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePublicationRequest {
    pub title: String,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One editable publication field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PublicationFieldUpdate {
    Title(String),
    State(PublicationState),
    PublishAt(DateTime<Utc>),
    Tags(Vec<String>),
}

/// Kind of a content block within a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Embed,
    Quote,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Embed => "embed",
            BlockKind::Quote => "quote",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            "embed" => Ok(BlockKind::Embed),
            "quote" => Ok(BlockKind::Quote),
            other => Err(format!("unknown block kind: {}", other)),
        }
    }
}

/// Display size for image blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Full,
}

/// Horizontal alignment for image blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlignment {
    Left,
    Center,
    Right,
}

/// A content block belonging to one publication.
///
/// Only the payload fields matching `kind` are meaningful; the rest stay
/// None. `position` values are contiguous and zero-based within a
/// publication at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: Uuid,
    pub publication_id: Uuid,
    pub kind: BlockKind,
    pub position: i32,
    pub text_content: Option<String>,
    pub image_url: Option<String>,
    pub image_size: Option<ImageSize>,
    pub image_alignment: Option<ImageAlignment>,
    pub image_caption: Option<String>,
    pub embed_content: Option<String>,
    pub quote_content: Option<String>,
    pub quote_author: Option<String>,
}

/// One editable content-block field.
///
/// Variants are validated against the block's kind: e.g. `EmbedContent`
/// on a text block is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum BlockFieldUpdate {
    TextContent(String),
    ImageUrl(String),
    ImageSize(ImageSize),
    ImageAlignment(ImageAlignment),
    ImageCaption(String),
    EmbedContent(String),
    QuoteContent(String),
    QuoteAuthor(String),
}

impl BlockFieldUpdate {
    /// Whether this field applies to a block of the given kind.
    pub fn applies_to(&self, kind: BlockKind) -> bool {
        match self {
            BlockFieldUpdate::TextContent(_) => kind == BlockKind::Text,
            BlockFieldUpdate::ImageUrl(_)
            | BlockFieldUpdate::ImageSize(_)
            | BlockFieldUpdate::ImageAlignment(_)
            | BlockFieldUpdate::ImageCaption(_) => kind == BlockKind::Image,
            BlockFieldUpdate::EmbedContent(_) => kind == BlockKind::Embed,
            BlockFieldUpdate::QuoteContent(_) | BlockFieldUpdate::QuoteAuthor(_) => {
                kind == BlockKind::Quote
            }
        }
    }
}

// =============================================================================
// RATING TYPES
// =============================================================================

/// One user's rating of one document. Unique on (document_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub document_id: Uuid,
    pub user_id: Uuid,
    /// 1 through 5.
    pub score: i16,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// HOME PAGE TYPES
// =============================================================================

/// Landing-page aggregate: best rated, most recent, busiest forums.
#[derive(Debug, Clone, Serialize)]
pub struct HomeSummary {
    pub top_rated: Vec<DocumentSummary>,
    pub recent: Vec<DocumentSummary>,
    pub active_categories: Vec<CategoryActivity>,
}

/// The hero section at the top of the landing page. A singleton: there is
/// at most one configuration, replaced wholesale on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroConfig {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_url: Option<String>,
    /// Publicly resolvable URL of the background image.
    pub background_url: String,
}

/// Visual layout of a landing-page block.
///
/// The section kinds render a data-driven strip (best rated documents,
/// newest documents, busiest forums) instead of authored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeBlockKind {
    Reflection,
    TextWithBackground,
    Parallax,
    TopRatedSection,
    RecentSection,
    ActiveForumsSection,
}

impl fmt::Display for HomeBlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HomeBlockKind::Reflection => "reflection",
            HomeBlockKind::TextWithBackground => "text_with_background",
            HomeBlockKind::Parallax => "parallax",
            HomeBlockKind::TopRatedSection => "top_rated_section",
            HomeBlockKind::RecentSection => "recent_section",
            HomeBlockKind::ActiveForumsSection => "active_forums_section",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HomeBlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reflection" => Ok(HomeBlockKind::Reflection),
            "text_with_background" => Ok(HomeBlockKind::TextWithBackground),
            "parallax" => Ok(HomeBlockKind::Parallax),
            "top_rated_section" => Ok(HomeBlockKind::TopRatedSection),
            "recent_section" => Ok(HomeBlockKind::RecentSection),
            "active_forums_section" => Ok(HomeBlockKind::ActiveForumsSection),
            other => Err(format!("unknown home block kind: {}", other)),
        }
    }
}

/// Where authored text sits inside a landing-page block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentPosition {
    Left,
    Center,
    Right,
}

/// Visual weight of a call-to-action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Secondary,
}

/// A call-to-action button inside a landing-page block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeButton {
    pub text: String,
    pub url: String,
    pub style: ButtonStyle,
    #[serde(default)]
    pub new_tab: bool,
}

/// One block of the landing page.
///
/// Blocks of any kind may carry any of the authored fields (the section
/// kinds simply ignore them when rendered). `position` values are
/// contiguous and zero-based at rest, and inactive blocks keep their slot
/// so they can be re-enabled without losing their place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeBlock {
    pub id: Uuid,
    pub kind: HomeBlockKind,
    pub position: i32,
    pub title: String,
    /// Rich-text body; empty for the section kinds.
    pub content: String,
    pub background_url: Option<String>,
    pub content_position: ContentPosition,
    pub primary_button: Option<HomeButton>,
    pub secondary_button: Option<HomeButton>,
    /// Inactive blocks are hidden from readers without being deleted.
    pub active: bool,
}

/// One editable landing-page block field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum HomeBlockFieldUpdate {
    Kind(HomeBlockKind),
    Title(String),
    Content(String),
    BackgroundUrl(Option<String>),
    ContentPosition(ContentPosition),
    PrimaryButton(Option<HomeButton>),
    SecondaryButton(Option<HomeButton>),
    Active(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_roundtrip() {
        for grade in [
            Grade::Sixth,
            Grade::Seventh,
            Grade::Eighth,
            Grade::Ninth,
            Grade::Tenth,
            Grade::Eleventh,
        ] {
            let parsed: Grade = grade.to_string().parse().unwrap();
            assert_eq!(parsed, grade);
        }
    }

    #[test]
    fn test_unknown_grade_rejected() {
        assert!("kindergarten".parse::<Grade>().is_err());
    }

    #[test]
    fn test_block_kind_roundtrip() {
        for kind in [
            BlockKind::Text,
            BlockKind::Image,
            BlockKind::Embed,
            BlockKind::Quote,
        ] {
            let parsed: BlockKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_block_field_update_kind_check() {
        let update = BlockFieldUpdate::EmbedContent("<iframe></iframe>".to_string());
        assert!(update.applies_to(BlockKind::Embed));
        assert!(!update.applies_to(BlockKind::Text));

        let caption = BlockFieldUpdate::ImageCaption("A caption".to_string());
        assert!(caption.applies_to(BlockKind::Image));
        assert!(!caption.applies_to(BlockKind::Quote));
    }

    #[test]
    fn test_block_field_update_rejects_unknown_field() {
        let raw = r#"{"field": "parent_id", "value": "abc"}"#;
        let parsed: Result<BlockFieldUpdate, _> = serde_json::from_str(raw);
        assert!(parsed.is_err(), "unknown fields must fail deserialization");
    }

    #[test]
    fn test_document_field_update_serde_shape() {
        let raw = r#"{"field": "title", "value": "New title"}"#;
        let parsed: DocumentFieldUpdate = serde_json::from_str(raw).unwrap();
        match parsed {
            DocumentFieldUpdate::Title(t) => assert_eq!(t, "New title"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_publication_state_roundtrip() {
        let parsed: PublicationState = "published".parse().unwrap();
        assert_eq!(parsed, PublicationState::Published);
        assert!("archived".parse::<PublicationState>().is_err());
    }

    #[test]
    fn test_home_block_kind_roundtrip() {
        for kind in [
            HomeBlockKind::Reflection,
            HomeBlockKind::TextWithBackground,
            HomeBlockKind::Parallax,
            HomeBlockKind::TopRatedSection,
            HomeBlockKind::RecentSection,
            HomeBlockKind::ActiveForumsSection,
        ] {
            let parsed: HomeBlockKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("carousel".parse::<HomeBlockKind>().is_err());
    }

    #[test]
    fn test_home_block_field_update_serde_shape() {
        let raw = r#"{"field": "primary_button",
                      "value": {"text": "Ver más", "url": "/docs", "style": "primary"}}"#;
        let parsed: HomeBlockFieldUpdate = serde_json::from_str(raw).unwrap();
        match parsed {
            HomeBlockFieldUpdate::PrimaryButton(Some(button)) => {
                assert_eq!(button.text, "Ver más");
                assert!(!button.new_tab);
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        let cleared: HomeBlockFieldUpdate =
            serde_json::from_str(r#"{"field": "primary_button", "value": null}"#).unwrap();
        assert!(matches!(cleared, HomeBlockFieldUpdate::PrimaryButton(None)));
    }
}
