//! # Client configuration — `blogclient.toml`
//!
//! Defines the TOML configuration file read by native front ends (filename:
//! [`ClientConfig::filename`] = `"blogclient.toml"`). It tells the client where
//! the REST API lives and how large a list page is.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080/api"   # prefix for every endpoint
//! timeout_secs = 30                        # transport timeout, 0 disables
//!
//! [list]
//! page_size = 10
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`ClientConfig`] | Top-level config. Builder helpers (`new`, `with_page_size`, `with_timeout`), TOML (de)serialisation, the canonical filename. |
//! | [`ApiConfig`] | `base_url` and `timeout_secs` (default **30 seconds**). |
//! | [`ListConfig`] | `page_size` (default **10**, the size every list view of the original app requested). |
//!
//! Every section has serde defaults, so a missing or empty file is the
//! default configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Top-level configuration stored in `blogclient.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

/// Remote API configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout in seconds. 0 disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// List view configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            list: ListConfig::default(),
        }
    }

    /// Builder method to set the list page size. Zero is clamped to one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.list.page_size = page_size.max(1);
        self
    }

    /// Builder method to set the transport timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.api.timeout_secs = secs;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "blogclient.toml"
    }

    /// Page size with a zero from a hand-edited file treated as one.
    pub fn page_size(&self) -> u32 {
        self.list.page_size.max(1)
    }

    /// Transport timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.api.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.api.timeout_secs))
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.timeout(), Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "https://blog.example.com/api"
            timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://blog.example.com/api");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.list.page_size, 10);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ClientConfig::new("http://127.0.0.1:9000/api")
            .with_page_size(25)
            .with_timeout(5);
        let text = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(ClientConfig::default().with_page_size(0).page_size(), 1);

        let config = ClientConfig::from_toml("[list]\npage_size = 0").unwrap();
        assert_eq!(config.page_size(), 1);
    }
}
