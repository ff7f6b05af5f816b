//! In-memory content store
//!
//! Serves the same query shapes as the HTTP client from a fixed set of items
//! and categories. Used by the native CLI (loaded from a JSON fixture) and by
//! tests, which can also inspect the call log and inject failures.

use super::{ContentError, ContentResult, ContentService, RemoteCategory, RemoteItem};
use crate::config::SiteConfig;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashSet;

/// A whole site on disk: configuration plus content
#[derive(Debug, Clone, Deserialize)]
pub struct SiteFixture {
    pub config: SiteConfig,
    #[serde(default)]
    pub items: Vec<RemoteItem>,
    #[serde(default)]
    pub categories: Vec<RemoteCategory>,
}

impl SiteFixture {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn into_parts(self) -> (SiteConfig, MemoryContent) {
        let content = MemoryContent::new(self.items, self.categories);
        (self.config, content)
    }
}

/// In-memory [`ContentService`]; items are served in insertion order
#[derive(Debug, Default)]
pub struct MemoryContent {
    items: Vec<RemoteItem>,
    categories: Vec<RemoteCategory>,
    failing: HashSet<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl MemoryContent {
    pub fn new(items: Vec<RemoteItem>, categories: Vec<RemoteCategory>) -> Self {
        Self {
            items,
            categories,
            ..Self::default()
        }
    }

    /// Make every call of the named method fail with a fetch error
    pub fn fail_on(mut self, method: &'static str) -> Self {
        self.failing.insert(method);
        self
    }

    /// Calls made so far, e.g. `list_items(2, 5)`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any call to `method` was made
    pub fn called(&self, method: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.split('(').next() == Some(method))
    }

    fn record(&self, method: &'static str, args: String) -> ContentResult<()> {
        self.calls.borrow_mut().push(format!("{}({})", method, args));
        if self.failing.contains(method) {
            return Err(ContentError::fetch(method, "injected failure"));
        }
        Ok(())
    }

    fn page_of(items: Vec<&RemoteItem>, page: u32, per_page: u32) -> Vec<RemoteItem> {
        let per_page = per_page.max(1) as usize;
        let start = (page.max(1) as usize - 1).saturating_mul(per_page);
        items
            .into_iter()
            .skip(start)
            .take(per_page)
            .map(summary)
            .collect()
    }

    fn matching(&self, query: &str) -> Vec<&RemoteItem> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.title_html.to_lowercase().contains(&needle)
                    || item.body_html.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Listings carry no body, like the service's listing responses
fn summary(item: &RemoteItem) -> RemoteItem {
    RemoteItem {
        body_html: String::new(),
        ..item.clone()
    }
}

impl ContentService for MemoryContent {
    async fn list_items(&self, page: u32, per_page: u32) -> ContentResult<Vec<RemoteItem>> {
        self.record("list_items", format!("{}, {}", page, per_page))?;
        Ok(Self::page_of(self.items.iter().collect(), page, per_page))
    }

    async fn count_items(&self) -> ContentResult<u64> {
        self.record("count_items", String::new())?;
        Ok(self.items.len() as u64)
    }

    async fn get_item(&self, id: u64) -> ContentResult<RemoteItem> {
        self.record("get_item", id.to_string())?;
        self.items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| ContentError::not_found("article", id.to_string()))
    }

    async fn item_by_slug(&self, slug: &str) -> ContentResult<RemoteItem> {
        self.record("item_by_slug", slug.to_string())?;
        self.items
            .iter()
            .find(|item| !slug.is_empty() && item.slug == slug)
            .map(summary)
            .ok_or_else(|| ContentError::not_found("article", slug))
    }

    async fn search_items(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> ContentResult<Vec<RemoteItem>> {
        self.record("search_items", format!("{}, {}, {}", query, page, per_page))?;
        Ok(Self::page_of(self.matching(query), page, per_page))
    }

    async fn count_search(&self, query: &str) -> ContentResult<u64> {
        self.record("count_search", query.to_string())?;
        Ok(self.matching(query).len() as u64)
    }

    async fn list_categories(&self) -> ContentResult<Vec<RemoteCategory>> {
        self.record("list_categories", String::new())?;
        Ok(self.categories.clone())
    }

    async fn count_categories(&self) -> ContentResult<u64> {
        self.record("count_categories", String::new())?;
        Ok(self.categories.len() as u64)
    }

    async fn category_by_slug(&self, slug: &str) -> ContentResult<RemoteCategory> {
        self.record("category_by_slug", slug.to_string())?;
        self.categories
            .iter()
            .find(|cat| !slug.is_empty() && cat.slug == slug)
            .cloned()
            .ok_or_else(|| ContentError::not_found("category", slug))
    }

    async fn items_in_category(&self, category_id: u64) -> ContentResult<Vec<RemoteItem>> {
        self.record("items_in_category", category_id.to_string())?;
        Ok(self
            .items
            .iter()
            .filter(|item| item.category_ids.contains(&category_id))
            .map(summary)
            .collect())
    }
}
