//! termpress - A terminal-style reader for content sites, compiled to WASM
//!
//! Visitors browse articles and categories by typing shell-like commands
//! (`ls`, `cat`, `search`, `categories`, `posts`, `help`) into a single
//! scrolling history pane.
//!
//! Platform support:
//! - Browser (wasm32-unknown-unknown): DOM history pane, Fetch API content client
//! - Native: in-memory content, plain-text history (CLI and tests)

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod boot;
pub mod config;
pub mod content;
pub mod platform;
pub mod render;
pub mod shell;

#[cfg(target_arch = "wasm32")]
pub mod terminal;

/// Initialize panic hook for better error messages in browser console
#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Start the terminal. This is the WASM entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    init_panic_hook();
    boot::boot();
}

/// Console logging helper
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Log to browser console (WASM)
#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::log(&format!($($t)*))
    };
}

/// Log to stderr (native)
#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        eprintln!($($t)*)
    };
}
