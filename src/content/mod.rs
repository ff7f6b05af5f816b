//! Content client
//!
//! Read-only access to the content service: articles ("items") and their
//! categories. Every command re-fetches; nothing is cached between calls.
//!
//! - [`ContentService`] is the seam the shell talks to
//! - [`WpClient`] implements it over HTTP (WordPress REST v2)
//! - [`MemoryContent`] implements it over an in-memory store

mod client;
mod memory;
mod paging;
mod wire;

pub use client::{WpClient, encode_component};
pub use memory::{MemoryContent, SiteFixture};
pub use paging::{PageWindow, PagingError};

use serde::{Deserialize, Serialize};
use std::future::Future;

/// An article as the terminal sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: u64,
    /// Rendered title; may contain entities and inline markup
    pub title_html: String,
    /// ISO-8601 publication timestamp
    pub date_iso: String,
    pub slug: String,
    /// Rendered body; empty in listing responses
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<u64>,
}

/// A category as the terminal sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Content service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Transport failure, non-success status or unparsable payload
    Fetch {
        operation: &'static str,
        reason: String,
    },
    /// The identifier, slug or category matched nothing
    NotFound { what: &'static str, key: String },
}

impl ContentError {
    pub fn fetch(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Fetch {
            operation,
            reason: reason.into(),
        }
    }

    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { operation, reason } => {
                write!(f, "error fetching {}: {}", operation, reason)
            }
            Self::NotFound { what, key } if key.is_empty() => write!(f, "{} not found", what),
            Self::NotFound { what, key } => write!(f, "{} not found: {}", what, key),
        }
    }
}

impl std::error::Error for ContentError {}

/// One method per query shape the terminal needs.
///
/// Listing methods return items in service order. Count methods are
/// total-count probes: they fail rather than report zero when the service
/// does not declare a total.
pub trait ContentService {
    fn list_items(&self, page: u32, per_page: u32)
    -> impl Future<Output = ContentResult<Vec<RemoteItem>>>;

    fn count_items(&self) -> impl Future<Output = ContentResult<u64>>;

    /// Full item including body and featured image
    fn get_item(&self, id: u64) -> impl Future<Output = ContentResult<RemoteItem>>;

    fn item_by_slug(&self, slug: &str) -> impl Future<Output = ContentResult<RemoteItem>>;

    fn search_items(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = ContentResult<Vec<RemoteItem>>>;

    fn count_search(&self, query: &str) -> impl Future<Output = ContentResult<u64>>;

    fn list_categories(&self) -> impl Future<Output = ContentResult<Vec<RemoteCategory>>>;

    fn count_categories(&self) -> impl Future<Output = ContentResult<u64>>;

    fn category_by_slug(&self, slug: &str) -> impl Future<Output = ContentResult<RemoteCategory>>;

    /// Unpaginated: everything the service returns for the category
    fn items_in_category(
        &self,
        category_id: u64,
    ) -> impl Future<Output = ContentResult<Vec<RemoteItem>>>;
}
