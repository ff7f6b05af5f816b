//! Wire format of the WordPress REST v2 API
//!
//! Only the fields the terminal reads are modelled; everything else in the
//! payload is ignored. Conversion into [`RemoteItem`]/[`RemoteCategory`]
//! happens here so the rest of the crate never sees wire structs.

use super::{RemoteCategory, RemoteItem};
use serde::Deserialize;

/// `{"rendered": "..."}` wrapper used for titles and bodies
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<WpEmbedded>,
}

/// Present when the request carried `_embed`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WpEmbedded {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Vec<WpMedia>,
}

/// Embedded media; restricted media comes back as an error object without `source_url`
#[derive(Debug, Deserialize)]
pub(crate) struct WpMedia {
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpCategory {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl From<WpPost> for RemoteItem {
    fn from(post: WpPost) -> Self {
        let featured_image_url = post
            .embedded
            .and_then(|e| e.featured_media.into_iter().next())
            .and_then(|m| m.source_url)
            .filter(|url| !url.is_empty());

        RemoteItem {
            id: post.id,
            title_html: post.title.rendered,
            date_iso: post.date,
            slug: post.slug,
            body_html: post.content.rendered,
            featured_image_url,
            category_ids: post.categories,
        }
    }
}

impl From<WpCategory> for RemoteCategory {
    fn from(cat: WpCategory) -> Self {
        RemoteCategory {
            id: cat.id,
            name: cat.name,
            slug: cat.slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_with_featured_media() {
        let json = r#"{
            "id": 42,
            "date": "2024-03-01T09:30:00",
            "slug": "hello-terminal",
            "title": {"rendered": "Hello &#8211; Terminal"},
            "content": {"rendered": "<p>Body</p>", "protected": false},
            "categories": [3, 7],
            "_embedded": {
                "wp:featuredmedia": [{"id": 9, "source_url": "https://cdn.example.com/a.png"}]
            }
        }"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        let item = RemoteItem::from(post);
        assert_eq!(item.id, 42);
        assert_eq!(item.title_html, "Hello &#8211; Terminal");
        assert_eq!(item.body_html, "<p>Body</p>");
        assert_eq!(item.category_ids, vec![3, 7]);
        assert_eq!(
            item.featured_image_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn test_restricted_media_is_ignored() {
        let json = r#"{
            "id": 1,
            "title": {"rendered": "x"},
            "_embedded": {"wp:featuredmedia": [{"code": "rest_forbidden", "message": "nope"}]}
        }"#;
        let item = RemoteItem::from(serde_json::from_str::<WpPost>(json).unwrap());
        assert!(item.featured_image_url.is_none());
    }

    #[test]
    fn test_listing_post_without_body() {
        let json = r#"[{"id": 5, "date": "2024-01-01T00:00:00", "slug": "s", "title": {"rendered": "T"}}]"#;
        let posts: Vec<WpPost> = serde_json::from_str(json).unwrap();
        let item = RemoteItem::from(posts.into_iter().next().unwrap());
        assert!(item.body_html.is_empty());
        assert!(item.featured_image_url.is_none());
    }

    #[test]
    fn test_category() {
        let json = r#"{"id": 3, "name": "Rust", "slug": "rust", "count": 12, "taxonomy": "category"}"#;
        let cat = RemoteCategory::from(serde_json::from_str::<WpCategory>(json).unwrap());
        assert_eq!(
            cat,
            RemoteCategory {
                id: 3,
                name: "Rust".into(),
                slug: "rust".into()
            }
        );
    }
}
