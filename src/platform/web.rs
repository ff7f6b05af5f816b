//! Web platform implementation
//!
//! Uses web-sys to reach the Fetch API, the page location and the
//! configuration bundle the host page injects as `window.wpData`.

use super::{HttpResponse, PlatformError, PlatformResult, Transport};
use crate::config::SiteConfig;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Response headers the content client reads
const READ_HEADERS: &[&str] = &["content-type", "x-wp-total", "x-wp-totalpages"];

/// GET requests through `window.fetch`
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Build a JSON GET request. CORS mode: the API root may live on another
/// origin than the page (www vs apex, an explicit `apiRoot`).
pub fn build_request(url: &str) -> PlatformResult<web_sys::Request> {
    let opts = web_sys::RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(web_sys::RequestMode::Cors);

    let request = web_sys::Request::new_with_str_and_init(url, &opts)
        .map_err(|e| PlatformError::Network(format!("bad request {}: {:?}", url, e)))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| PlatformError::Network(format!("failed to set header: {:?}", e)))?;
    Ok(request)
}

impl Transport for FetchTransport {
    async fn get(&self, url: &str) -> PlatformResult<HttpResponse> {
        let window =
            web_sys::window().ok_or_else(|| PlatformError::NotSupported("no window".into()))?;

        let request = build_request(url)?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| PlatformError::Network(format!("fetch failed: {:?}", e)))?;
        let resp: web_sys::Response = resp_value
            .dyn_into()
            .map_err(|_| PlatformError::Network("failed to cast response".into()))?;

        let mut response = HttpResponse::new(resp.status(), Vec::new());
        // Headers iteration is limited in web-sys; read the ones we use
        let headers = resp.headers();
        for name in READ_HEADERS {
            if let Ok(Some(value)) = headers.get(name) {
                response = response.with_header(name, value);
            }
        }

        let array_buffer = JsFuture::from(
            resp.array_buffer()
                .map_err(|e| PlatformError::Network(format!("failed to get body: {:?}", e)))?,
        )
        .await
        .map_err(|e| PlatformError::Network(format!("failed to read body: {:?}", e)))?;
        response.body = js_sys::Uint8Array::new(&array_buffer).to_vec();

        Ok(response)
    }
}

/// Current `location.pathname`
pub fn location_path() -> Option<String> {
    web_sys::window()?.location().pathname().ok()
}

/// Current `location.origin`
pub fn location_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Read `window.wpData`. A missing or invalid bundle falls back to a
/// configuration for the current origin.
pub fn load_site_config() -> SiteConfig {
    let mut config = match read_bundle() {
        Ok(config) => config,
        Err(reason) => {
            web_sys::console::error_1(&format!("[config] {}; using defaults", reason).into());
            SiteConfig::new(location_origin().unwrap_or_default())
        }
    };
    if config.request_time.is_none() {
        config.request_time = Some((js_sys::Date::now() / 1000.0) as i64);
    }
    config
}

fn read_bundle() -> Result<SiteConfig, String> {
    let window = web_sys::window().ok_or("no window")?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str("wpData"))
        .map_err(|e| format!("wpData unreadable: {:?}", e))?;
    if value.is_undefined() || value.is_null() {
        return Err("wpData not set".into());
    }
    let json: String = js_sys::JSON::stringify(&value)
        .map_err(|e| format!("wpData not serializable: {:?}", e))?
        .into();
    SiteConfig::from_json(&json).map_err(|e| e.to_string())
}
