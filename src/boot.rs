//! Boot sequence
//!
//! Deep links behave like pre-run commands: the page path is resolved to a
//! command, then the session prints the banner, runs `help`, and runs the
//! resolved command, strictly in that order.

use crate::content::ContentService;
use crate::shell::Session;
use chrono::DateTime;

const UNAVAILABLE: &str = "[Data Unavailable]";

/// What the page path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    /// `/category/<slug>`
    Category(String),
    /// Any other path; the last segment is the item slug
    Item(String),
}

impl Route {
    /// Route for `path`, taken relative to the site's `base_path`
    pub fn from_path(path: &str, base_path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let base = base_path.trim_end_matches('/');
        let relative = match path.strip_prefix(base) {
            Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
            _ => path,
        };

        let segments: Vec<String> = relative
            .split('/')
            .filter(|s| !s.is_empty())
            .map(percent_decode)
            .collect();

        match segments.split_first() {
            None => Route::Root,
            Some((first, rest)) if first == "category" => {
                Route::Category(rest.last().cloned().unwrap_or_default())
            }
            Some(_) => Route::Item(segments.last().cloned().unwrap_or_default()),
        }
    }
}

/// Decode `%XX` escapes; invalid escapes are kept literally
fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let (hi, lo) = (bytes[i + 1], bytes[i + 2]);
            if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() {
                out.push((hex_value(hi) << 4) | hex_value(lo));
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// The command a route stands for. Lookup failures still yield a command;
/// its handler reports the missing record.
pub async fn bootstrap_command<C: ContentService>(content: &C, route: &Route) -> String {
    match route {
        Route::Root => "ls".to_string(),
        Route::Category(slug) => match content.category_by_slug(slug).await {
            Ok(category) => format!("posts {}", category.id),
            Err(_e) => {
                #[cfg(all(target_arch = "wasm32", not(test)))]
                crate::console_log!("[boot] category lookup failed: {}", _e);
                "posts".to_string()
            }
        },
        Route::Item(slug) => match content.item_by_slug(slug).await {
            Ok(item) => format!("cat {}", item.id),
            Err(_e) => {
                #[cfg(all(target_arch = "wasm32", not(test)))]
                crate::console_log!("[boot] item lookup failed: {}", _e);
                "cat".to_string()
            }
        },
    }
}

/// Welcome banner. Never fails: missing statistics and failed count probes
/// print a placeholder.
pub async fn print_banner<C: ContentService>(session: &Session<C>) {
    let config = session.config();
    let items = session.content().count_items().await;
    let categories = session.content().count_categories().await;

    let title = if config.site_title.is_empty() {
        config.host().to_string()
    } else {
        config.site_title.clone()
    };
    let welcome = if config.site_description.is_empty() {
        format!("Welcome to {}", title)
    } else {
        format!("Welcome to {} - {}", title, config.site_description)
    };
    let stat = |value: &Option<String>| match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNAVAILABLE.to_string(),
    };
    let as_of = config
        .request_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%a %b %e %H:%M:%S UTC %Y").to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let count = |result: Result<u64, _>| match result {
        Ok(n) => n.to_string(),
        Err(_) => UNAVAILABLE.to_string(),
    };

    let mut out = session.history_mut();
    out.print_line(welcome);
    out.print_line(format!("* For more information, email: {}", config.contact_email()));
    out.print_line("");
    out.print_line(format!("System information as of {}", as_of));
    out.print_line("");
    out.print_line(format!(
        "Memory usage: {:<20}  IP address: {}",
        stat(&config.memory_usage),
        stat(&config.ip_address)
    ));
    out.print_line(format!(
        "Server:       {:<20}  Theme:      {}",
        stat(&config.server_software),
        stat(&config.current_theme)
    ));
    out.print_line("");
    out.print_line(format!("{} articles can be explored.", count(items)));
    out.print_line(format!("{} categories to discover.", count(categories)));
    out.print_line("");
}

/// Banner, `help`, then the command for `path`.
///
/// The route is resolved before anything is printed, so no live input
/// exists between `help` and the bootstrapped command.
pub async fn start<C: ContentService>(session: &Session<C>, path: &str) {
    let route = Route::from_path(path, session.config().base_path());
    let command = bootstrap_command(session.content(), &route).await;

    #[cfg(all(target_arch = "wasm32", not(test)))]
    crate::console_log!("[boot] {:?} -> {}", route, command);

    print_banner(session).await;
    session.run("help").await;
    session.run(&command).await;
}

/// Wire the session to the page and start it
#[cfg(target_arch = "wasm32")]
pub fn boot() {
    use crate::content::WpClient;
    use crate::platform::web::{self, FetchTransport};
    use std::rc::Rc;

    let config = web::load_site_config();
    let path = web::location_path().unwrap_or_else(|| "/".to_string());
    let content = WpClient::new(FetchTransport::new(), config.api_root());

    let view = match crate::terminal::DomView::attach() {
        Ok(view) => view,
        Err(e) => {
            web_sys::console::error_1(&format!("[boot] terminal init failed: {:?}", e).into());
            return;
        }
    };
    let session = Rc::new(Session::with_view(config, content, Box::new(view)));

    if let Err(e) = crate::terminal::install(session.clone()) {
        web_sys::console::error_1(&format!("[boot] event wiring failed: {:?}", e).into());
        return;
    }

    wasm_bindgen_futures::spawn_local(async move {
        start(&session, &path).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{MemoryContent, RemoteCategory, RemoteItem};
    use futures::executor::block_on;

    fn content() -> MemoryContent {
        MemoryContent::new(
            vec![RemoteItem {
                id: 42,
                title_html: "My Article".into(),
                date_iso: "2024-05-01T12:00:00".into(),
                slug: "my-article".into(),
                body_html: "<p>Body</p>".into(),
                featured_image_url: None,
                category_ids: vec![3],
            }],
            vec![RemoteCategory {
                id: 3,
                name: "News".into(),
                slug: "news".into(),
            }],
        )
    }

    #[test]
    fn test_routes() {
        assert_eq!(Route::from_path("/", ""), Route::Root);
        assert_eq!(Route::from_path("", ""), Route::Root);
        assert_eq!(Route::from_path("/my-article/", ""), Route::Item("my-article".into()));
        assert_eq!(
            Route::from_path("/2024/05/my-article", ""),
            Route::Item("my-article".into())
        );
        assert_eq!(Route::from_path("/category/news/", ""), Route::Category("news".into()));
        assert_eq!(
            Route::from_path("/category/parent/child", ""),
            Route::Category("child".into())
        );
        assert_eq!(Route::from_path("/category", ""), Route::Category(String::new()));
    }

    #[test]
    fn test_routes_under_base_path() {
        assert_eq!(Route::from_path("/blog/", "/blog"), Route::Root);
        assert_eq!(Route::from_path("/blog/hello?x=1", "/blog"), Route::Item("hello".into()));
        assert_eq!(
            Route::from_path("/blog/category/news", "/blog"),
            Route::Category("news".into())
        );
        // Not under the base: whole path counts
        assert_eq!(Route::from_path("/blogger", "/blog"), Route::Item("blogger".into()));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(
            Route::from_path("/category/dev%20notes", ""),
            Route::Category("dev notes".into())
        );
    }

    #[test]
    fn test_bootstrap_commands() {
        let c = content();
        assert_eq!(block_on(bootstrap_command(&c, &Route::Root)), "ls");
        assert_eq!(
            block_on(bootstrap_command(&c, &Route::Item("my-article".into()))),
            "cat 42"
        );
        assert_eq!(
            block_on(bootstrap_command(&c, &Route::Category("news".into()))),
            "posts 3"
        );
        assert_eq!(block_on(bootstrap_command(&c, &Route::Item("gone".into()))), "cat");
        assert_eq!(
            block_on(bootstrap_command(&c, &Route::Category("gone".into()))),
            "posts"
        );
    }

    #[test]
    fn test_banner_with_failed_probe() {
        let mut config = SiteConfig::new("https://d8devs.com").with_title("d8devs", "Dev notes");
        config.request_time = Some(0);
        config.memory_usage = Some("2 MB".into());
        let session = Session::new(config, content().fail_on("count_categories"));
        block_on(print_banner(&session));
        let text = session.history().to_text();
        assert!(text.starts_with("$ Welcome to d8devs - Dev notes\n"));
        assert!(text.contains("$ * For more information, email: hello@d8devs.com"));
        assert!(text.contains("$ System information as of Thu Jan  1 00:00:00 UTC 1970"));
        assert!(text.contains("Memory usage: 2 MB"));
        assert!(text.contains("IP address: [Data Unavailable]"));
        assert!(text.contains("$ 1 articles can be explored."));
        assert!(text.contains("$ [Data Unavailable] categories to discover."));
        assert!(!session.history().input_active());
    }
}
