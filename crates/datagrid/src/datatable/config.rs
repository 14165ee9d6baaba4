use serde::Deserialize;
use std::time::Duration;

/// Which browser storage area keeps the per-table blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    #[default]
    Session,
    Local,
}

/// Options of one list data source
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Instance identity; scopes the storage key
    pub id: String,
    /// List endpoint URL
    pub endpoint: String,
    pub default_page_size: u32,
    pub storage_scope: StorageScope,
    /// `None` waits for the server forever
    pub request_timeout_ms: Option<u64>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            endpoint: String::new(),
            default_page_size: 100,
            storage_scope: StorageScope::Session,
            request_timeout_ms: Some(30_000),
        }
    }
}

impl ListOptions {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Parses options from JSON; missing fields take their defaults
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_storage_scope(mut self, scope: StorageScope) -> Self {
        self.storage_scope = scope;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms =
            timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Page size to use when neither the URL nor storage provide one
    pub fn fallback_page_size(&self) -> u32 {
        self.default_page_size.max(1)
    }
}
