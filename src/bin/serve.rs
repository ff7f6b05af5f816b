//! Development server for termpress
//!
//! A minimal static file server. No dependencies beyond tiny_http.
//! Paths without a file extension fall back to `index.html`, so deep links
//! such as `/category/news` or `/my-article` reach the bootstrapper.
//!
//! Usage: serve [port] [root-dir]

use std::fs;
use std::path::{Component, Path, PathBuf};
use tiny_http::{Header, Response, Server};

const DEFAULT_PORT: u16 = 8080;

fn main() {
    let mut args = std::env::args().skip(1);
    let port = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let root = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let addr = format!("0.0.0.0:{}", port);
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to start server on {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("┌─────────────────────────────────────┐");
    println!("│  termpress dev server               │");
    println!("├─────────────────────────────────────┤");
    println!("│  http://localhost:{:<5}             │", port);
    println!("└─────────────────────────────────────┘");

    for request in server.incoming_requests() {
        let response = match resolve(&root, request.url()) {
            Some(path) => serve_file(&path),
            None => not_found(),
        };
        let _ = request.respond(response);
    }
}

/// Map a request URL to a file under `root`
fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("/");
    let relative = Path::new(path.trim_start_matches('/'));

    // No climbing out of the root
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let file = root.join(relative);
    if file.is_file() {
        return Some(file);
    }
    // Deep links have no extension; assets that are missing stay missing
    if relative.extension().is_none() {
        return Some(root.join("index.html"));
    }
    None
}

fn serve_file(path: &Path) -> Response<std::io::Cursor<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => Response::from_data(contents).with_header(content_type(mime_type(path))),
        Err(_) => not_found(),
    }
}

fn not_found() -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string("404 Not Found")
        .with_status_code(404)
        .with_header(content_type("text/plain"))
}

fn content_type(mime: &str) -> Header {
    Header::from_bytes("Content-Type", mime).expect("static ASCII header")
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_traversal() {
        assert_eq!(resolve(Path::new("."), "/../etc/passwd"), None);
    }

    #[test]
    fn test_resolve_deep_links_to_index() {
        let root = Path::new("/nonexistent-root");
        assert_eq!(
            resolve(root, "/category/news?x=1"),
            Some(root.join("index.html"))
        );
        assert_eq!(resolve(root, "/my-article/"), Some(root.join("index.html")));
        assert_eq!(resolve(root, "/pkg/missing.wasm"), None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("pkg/termpress_bg.wasm")), "application/wasm");
        assert_eq!(mime_type(Path::new("index.html")), "text/html; charset=utf-8");
    }
}
