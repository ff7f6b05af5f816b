//! Site configuration
//!
//! The host page injects a read-only bundle (`wpData`) before the script runs:
//! site title and description, the base URL, and display-only server
//! statistics. It is parsed once at boot and handed to the session.

use serde::{Deserialize, Deserializer};

/// Default page size for `ls` and `search`
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size the content service accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The bundle is not valid JSON or has the wrong shape
    Malformed(String),
    /// A required field is missing or empty
    MissingField(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed site configuration: {}", reason),
            Self::MissingField(name) => write!(f, "site configuration is missing '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The injected configuration bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub base_url: String,
    pub site_title: String,
    pub site_description: String,

    // Display-only statistics
    pub memory_usage: Option<String>,
    pub current_theme: Option<String>,
    pub server_software: Option<String>,
    pub ip_address: Option<String>,
    /// Unix timestamp of the page request
    #[serde(deserialize_with = "lenient_timestamp")]
    pub request_time: Option<i64>,

    /// REST root of the content service; derived from `base_url` when absent
    pub api_root: Option<String>,
    /// Address shown in the banner; derived from the base URL host when absent
    pub contact_email: Option<String>,
    /// Default page size for paginated commands
    pub per_page: Option<u32>,
}

impl SiteConfig {
    /// Minimal configuration for a site at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse and validate the JSON form of the bundle
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("baseUrl"));
        }
        Ok(())
    }

    pub fn with_title(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.site_title = title.into();
        self.site_description = description.into();
        self
    }

    /// REST root, e.g. `https://example.com/wp-json/wp/v2`
    pub fn api_root(&self) -> String {
        match &self.api_root {
            Some(root) if !root.trim().is_empty() => root.trim_end_matches('/').to_string(),
            _ => format!("{}/wp-json/wp/v2", self.base_url.trim_end_matches('/')),
        }
    }

    /// Host part of the base URL (no scheme, port or path)
    pub fn host(&self) -> &str {
        let rest = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        let end = rest.find(['/', ':', '?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Path prefix of the base URL without a trailing slash (`""` at the root)
    pub fn base_path(&self) -> &str {
        let rest = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        match rest.find('/') {
            Some(idx) => rest[idx..].trim_end_matches('/'),
            None => "",
        }
    }

    pub fn contact_email(&self) -> String {
        match &self.contact_email {
            Some(email) if !email.is_empty() => email.clone(),
            _ => format!("hello@{}", self.host()),
        }
    }

    /// Default page size, clamped to what the content service accepts
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// The host stringifies scalars, so accept `1700000000` and `"1700000000"`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
