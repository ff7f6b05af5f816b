//! Browser tests for the DOM history view
//!
//! Run with: wasm-pack test --headless --firefox

#![cfg(target_arch = "wasm32")]

use termpress::config::SiteConfig;
use termpress::content::{MemoryContent, RemoteItem};
use termpress::platform::web::build_request;
use termpress::render::INPUT_ID;
use termpress::shell::Session;
use termpress::terminal::{DomView, HISTORY_ID};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_history() -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    if let Some(old) = document.get_element_by_id(HISTORY_ID) {
        old.remove();
    }
    let history = document.create_element("div").unwrap();
    history.set_id(HISTORY_ID);
    document.body().unwrap().append_child(&history).unwrap();
    history
}

fn session() -> Session<MemoryContent> {
    let items = vec![RemoteItem {
        id: 1,
        title_html: "<script>alert(1)</script>Hello".into(),
        date_iso: "2024-01-01T00:00:00".into(),
        slug: "hello".into(),
        body_html: "<p onclick=\"x()\">Body</p>".into(),
        featured_image_url: None,
        category_ids: Vec::new(),
    }];
    let view = DomView::attach().unwrap();
    Session::with_view(
        SiteConfig::new("https://example.com"),
        MemoryContent::new(items, Vec::new()),
        Box::new(view),
    )
}

#[wasm_bindgen_test]
async fn test_dom_mirrors_history() {
    let history = fresh_history();
    let s = session();
    s.run("ls").await;
    s.run("cat 1").await;

    let inputs = history.query_selector_all(".live-input").unwrap();
    assert_eq!(inputs.length(), 1);
    let last = history.last_element_child().unwrap();
    assert!(last.get_attribute("class").unwrap_or_default().contains("live-input"));

    let document = web_sys::window().unwrap().document().unwrap();
    assert!(document.get_element_by_id(INPUT_ID).is_some());
    assert_eq!(
        history.query_selector_all(".command-line").unwrap().length(),
        3
    );
}

#[wasm_bindgen_test]
async fn test_dom_never_receives_scripts() {
    let history = fresh_history();
    let s = session();
    s.run("cat 1").await;
    s.run("<img src=x onerror=alert(1)>").await;

    assert!(history.query_selector("script").unwrap().is_none());
    assert!(history.query_selector("[onclick]").unwrap().is_none());
    assert!(history.query_selector("[onerror]").unwrap().is_none());
}

#[wasm_bindgen_test]
async fn test_rows_carry_commands() {
    let history = fresh_history();
    let s = session();
    s.run("ls").await;
    let row = history.query_selector(".clickable-post").unwrap().unwrap();
    assert_eq!(row.get_attribute("data-command").as_deref(), Some("cat 1"));
}

#[wasm_bindgen_test]
fn test_requests_allow_other_origins() {
    let request = build_request("https://www.example.com/wp-json/wp/v2/posts").unwrap();
    assert_eq!(request.mode(), web_sys::RequestMode::Cors);
    assert_eq!(request.method(), "GET");
    assert_eq!(
        request.headers().get("Accept").unwrap().as_deref(),
        Some("application/json")
    );
}
