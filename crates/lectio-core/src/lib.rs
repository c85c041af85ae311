//! # lectio-core
//!
//! Core types and traits for the lectio content platform.
//!
//! This crate defines the domain model shared by the database and API
//! layers: documents and their rating aggregates, threaded discussion
//! nodes, forum categories and topics, CMS publications with ordered
//! content blocks, the embed normalization pipeline, and the repository
//! traits the storage layer implements.

pub mod auth;
pub mod embed;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod traits;

pub use auth::{AuthPrincipal, Role};
pub use embed::{EmbedClass, EmbedInfo, EmbedKind, EmbedNormalizer, EmbedValidation, Platform};
pub use error::{Error, Result};
pub use ids::new_v7;
pub use models::{
    BlockFieldUpdate, BlockKind, ButtonStyle, Category, CategoryActivity, ContentBlock,
    ContentPosition, CreateDocumentRequest, CreateNodeRequest, CreatePublicationRequest,
    CreateTopicRequest, CreatedNode, Document, DocumentFieldUpdate, DocumentSummary, Grade,
    HeroConfig, HomeBlock, HomeBlockFieldUpdate, HomeBlockKind, HomeButton, HomeSummary,
    ImageAlignment, ImageSize, Language, Publication, PublicationFieldUpdate, PublicationState,
    Rating, ThreadNode, Topic,
};
pub use traits::{
    DocumentRepository, ForumRepository, HomeRepository, ListDocumentsRequest,
    ListPublicationsRequest, ListRootsRequest, PublicationRepository, RatingRepository,
    ThreadRepository,
};
