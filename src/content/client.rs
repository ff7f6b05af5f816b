//! HTTP content client (WordPress REST v2)
//!
//! Each method issues exactly one request. Paginated commands pair a
//! total-count probe (`per_page=1`, read `X-WP-Total`) with a page fetch;
//! the probe and the fetch are separate methods so the caller can stop
//! after the probe when the page is out of range.

use super::wire::{WpCategory, WpPost};
use super::{ContentError, ContentResult, ContentService, RemoteCategory, RemoteItem};
use crate::platform::{HttpResponse, Transport};
use serde::de::DeserializeOwned;

/// Header carrying the total number of matching records
const TOTAL_HEADER: &str = "x-wp-total";

/// Categories are listed in one request; the service caps pages at 100
const CATEGORY_PAGE_SIZE: u32 = 100;

/// Content client over any [`Transport`]
pub struct WpClient<T> {
    transport: T,
    api_root: String,
}

impl<T: Transport> WpClient<T> {
    /// `api_root` is the REST root, e.g. `https://example.com/wp-json/wp/v2`
    pub fn new(transport: T, api_root: impl Into<String>) -> Self {
        Self {
            transport,
            api_root: api_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.api_root, path);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            if !value.is_empty() {
                url.push('=');
                url.push_str(&encode_component(value));
            }
        }
        url
    }

    async fn send(&self, operation: &'static str, url: &str) -> ContentResult<HttpResponse> {
        #[cfg(all(target_arch = "wasm32", not(test)))]
        crate::console_log!("[content] GET {}", url);

        let resp = self
            .transport
            .get(url)
            .await
            .map_err(|e| ContentError::fetch(operation, e.to_string()))?;
        Ok(resp)
    }

    /// GET and decode a JSON body; any non-2xx status is a fetch error
    async fn get_json<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
    ) -> ContentResult<R> {
        let resp = self.send(operation, url).await?;
        if !resp.is_success() {
            return Err(ContentError::fetch(operation, format!("HTTP {}", resp.status)));
        }
        decode(operation, &resp)
    }

    /// Total-count probe: a one-record page whose only interesting part is the header
    async fn probe_total(&self, operation: &'static str, url: &str) -> ContentResult<u64> {
        let resp = self.send(operation, url).await?;
        if !resp.is_success() {
            return Err(ContentError::fetch(operation, format!("HTTP {}", resp.status)));
        }
        parse_total(operation, resp.header(TOTAL_HEADER))
    }

    async fn first_by_slug<W, R>(
        &self,
        operation: &'static str,
        what: &'static str,
        path: &str,
        slug: &str,
    ) -> ContentResult<R>
    where
        W: DeserializeOwned,
        R: From<W>,
    {
        if slug.is_empty() {
            return Err(ContentError::not_found(what, slug));
        }
        let url = self.url(path, &[("slug", slug.to_string())]);
        let found: Vec<W> = self.get_json(operation, &url).await?;
        found
            .into_iter()
            .next()
            .map(R::from)
            .ok_or_else(|| ContentError::not_found(what, slug))
    }
}

impl<T: Transport> ContentService for WpClient<T> {
    async fn list_items(&self, page: u32, per_page: u32) -> ContentResult<Vec<RemoteItem>> {
        let url = self.url(
            "posts",
            &[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("_embed", String::new()),
            ],
        );
        let posts: Vec<WpPost> = self.get_json("posts", &url).await?;
        Ok(posts.into_iter().map(RemoteItem::from).collect())
    }

    async fn count_items(&self) -> ContentResult<u64> {
        let url = self.url("posts", &[("per_page", "1".to_string())]);
        self.probe_total("post count", &url).await
    }

    async fn get_item(&self, id: u64) -> ContentResult<RemoteItem> {
        let url = self.url(&format!("posts/{}", id), &[("_embed", String::new())]);
        let resp = self.send("post", &url).await?;
        // The service answers unknown ids with 404 + an error document
        if resp.status == 404 {
            return Err(ContentError::not_found("article", id.to_string()));
        }
        if !resp.is_success() {
            return Err(ContentError::fetch("post", format!("HTTP {}", resp.status)));
        }
        let post: WpPost = decode("post", &resp)?;
        Ok(post.into())
    }

    async fn item_by_slug(&self, slug: &str) -> ContentResult<RemoteItem> {
        self.first_by_slug::<WpPost, RemoteItem>("post", "article", "posts", slug)
            .await
    }

    async fn search_items(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> ContentResult<Vec<RemoteItem>> {
        let url = self.url(
            "posts",
            &[
                ("search", query.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        );
        let posts: Vec<WpPost> = self.get_json("search results", &url).await?;
        Ok(posts.into_iter().map(RemoteItem::from).collect())
    }

    async fn count_search(&self, query: &str) -> ContentResult<u64> {
        let url = self.url(
            "posts",
            &[("search", query.to_string()), ("per_page", "1".to_string())],
        );
        self.probe_total("search count", &url).await
    }

    async fn list_categories(&self) -> ContentResult<Vec<RemoteCategory>> {
        let url = self.url("categories", &[("per_page", CATEGORY_PAGE_SIZE.to_string())]);
        let cats: Vec<WpCategory> = self.get_json("categories", &url).await?;
        Ok(cats.into_iter().map(RemoteCategory::from).collect())
    }

    async fn count_categories(&self) -> ContentResult<u64> {
        let url = self.url("categories", &[("per_page", "1".to_string())]);
        self.probe_total("category count", &url).await
    }

    async fn category_by_slug(&self, slug: &str) -> ContentResult<RemoteCategory> {
        self.first_by_slug::<WpCategory, RemoteCategory>("category", "category", "categories", slug)
            .await
    }

    async fn items_in_category(&self, category_id: u64) -> ContentResult<Vec<RemoteItem>> {
        let url = self.url("posts", &[("categories", category_id.to_string())]);
        let posts: Vec<WpPost> = self.get_json("category posts", &url).await?;
        Ok(posts.into_iter().map(RemoteItem::from).collect())
    }
}

fn decode<R: DeserializeOwned>(operation: &'static str, resp: &HttpResponse) -> ContentResult<R> {
    serde_json::from_slice(&resp.body)
        .map_err(|e| ContentError::fetch(operation, format!("malformed payload: {}", e)))
}

/// A missing or non-numeric total is an error, never zero
fn parse_total(operation: &'static str, header: Option<&str>) -> ContentResult<u64> {
    let value = header
        .ok_or_else(|| ContentError::fetch(operation, "missing total-count header"))?;
    value
        .trim()
        .parse()
        .map_err(|_| ContentError::fetch(operation, format!("invalid total-count header '{}'", value)))
}

/// Percent-encode a query component (RFC 3986 unreserved characters pass through)
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformError, PlatformResult};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned responses by exact URL and records every request
    #[derive(Default)]
    struct ScriptedTransport {
        routes: HashMap<String, HttpResponse>,
        requests: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        fn route(mut self, url: &str, resp: HttpResponse) -> Self {
            self.routes.insert(url.to_string(), resp);
            self
        }
    }

    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> PlatformResult<HttpResponse> {
            self.requests.borrow_mut().push(url.to_string());
            self.routes
                .get(url)
                .cloned()
                .ok_or_else(|| PlatformError::Network(format!("no route for {}", url)))
        }
    }

    const ROOT: &str = "https://example.com/wp-json/wp/v2";

    fn client(transport: ScriptedTransport) -> WpClient<ScriptedTransport> {
        WpClient::new(transport, format!("{}/", ROOT))
    }

    #[test]
    fn test_list_items_url_and_decode() {
        let body = r#"[
            {"id": 2, "date": "2024-02-01T00:00:00", "slug": "b", "title": {"rendered": "B"}},
            {"id": 1, "date": "2024-01-01T00:00:00", "slug": "a", "title": {"rendered": "A"}}
        ]"#;
        let t = ScriptedTransport::default().route(
            &format!("{}/posts?page=2&per_page=5&_embed", ROOT),
            HttpResponse::new(200, body),
        );
        let c = client(t);
        let items = block_on(c.list_items(2, 5)).unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(c.transport().requests.borrow().len(), 1);
    }

    #[test]
    fn test_count_reads_total_header() {
        let t = ScriptedTransport::default().route(
            &format!("{}/posts?per_page=1", ROOT),
            HttpResponse::new(200, "[]").with_header("X-WP-Total", "12"),
        );
        assert_eq!(block_on(client(t).count_items()), Ok(12));
    }

    #[test]
    fn test_count_without_header_fails() {
        let t = ScriptedTransport::default().route(
            &format!("{}/posts?per_page=1", ROOT),
            HttpResponse::new(200, "[]"),
        );
        let err = block_on(client(t).count_items()).unwrap_err();
        assert!(matches!(err, ContentError::Fetch { operation: "post count", .. }));
    }

    #[test]
    fn test_count_with_garbage_header_fails() {
        let t = ScriptedTransport::default().route(
            &format!("{}/categories?per_page=1", ROOT),
            HttpResponse::new(200, "[]").with_header("X-WP-Total", "lots"),
        );
        assert!(block_on(client(t).count_categories()).is_err());
    }

    #[test]
    fn test_get_item_404_is_not_found() {
        let t = ScriptedTransport::default().route(
            &format!("{}/posts/9999?_embed", ROOT),
            HttpResponse::new(404, r#"{"code":"rest_post_invalid_id"}"#),
        );
        let err = block_on(client(t).get_item(9999)).unwrap_err();
        assert_eq!(err, ContentError::not_found("article", "9999"));
    }

    #[test]
    fn test_server_error_is_fetch_error() {
        let t = ScriptedTransport::default().route(
            &format!("{}/posts/7?_embed", ROOT),
            HttpResponse::new(500, "oops"),
        );
        let err = block_on(client(t).get_item(7)).unwrap_err();
        assert_eq!(err, ContentError::fetch("post", "HTTP 500"));
    }

    #[test]
    fn test_malformed_payload_is_fetch_error() {
        let t = ScriptedTransport::default().route(
            &format!("{}/categories?per_page=100", ROOT),
            HttpResponse::new(200, "<html>maintenance</html>"),
        );
        let err = block_on(client(t).list_categories()).unwrap_err();
        assert!(matches!(err, ContentError::Fetch { operation: "categories", .. }));
    }

    #[test]
    fn test_network_failure_names_operation() {
        let err = block_on(client(ScriptedTransport::default()).items_in_category(3)).unwrap_err();
        match err {
            ContentError::Fetch { operation, reason } => {
                assert_eq!(operation, "category posts");
                assert!(reason.contains("no route"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_slug_lookup() {
        let t = ScriptedTransport::default()
            .route(
                &format!("{}/categories?slug=rust-lang", ROOT),
                HttpResponse::new(200, r#"[{"id": 4, "name": "Rust", "slug": "rust-lang"}]"#),
            )
            .route(&format!("{}/posts?slug=missing", ROOT), HttpResponse::new(200, "[]"));
        let c = client(t);
        assert_eq!(block_on(c.category_by_slug("rust-lang")).unwrap().id, 4);
        assert_eq!(
            block_on(c.item_by_slug("missing")),
            Err(ContentError::not_found("article", "missing"))
        );
    }

    #[test]
    fn test_empty_slug_skips_request() {
        let c = client(ScriptedTransport::default());
        assert!(block_on(c.item_by_slug("")).unwrap_err().is_not_found());
        assert!(c.transport().requests.borrow().is_empty());
    }

    #[test]
    fn test_search_query_is_encoded() {
        let t = ScriptedTransport::default().route(
            &format!("{}/posts?search=rust%20%26%20wasm&per_page=1", ROOT),
            HttpResponse::new(200, "[]").with_header("X-WP-Total", "0"),
        );
        assert_eq!(block_on(client(t).count_search("rust & wasm")), Ok(0));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("abc-_.~09"), "abc-_.~09");
        assert_eq!(encode_component("a b/c?"), "a%20b%2Fc%3F");
        assert_eq!(encode_component("ü"), "%C3%BC");
    }
}
