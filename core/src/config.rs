//! Client configuration.

use std::time::Duration;

use crate::error::ApiError;

pub const BASE_URL_ENV: &str = "RENTAL_API_BASE_URL";
pub const STALE_SECS_ENV: &str = "RENTAL_QUERY_STALE_SECS";

/// Cached query results stay fresh this long (5 minutes).
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(300);

/// Unused entries are dropped this long after going stale.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);

/// Configuration for `RentalClient` and `QueryClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without the `/api/v1` prefix. Empty means paths are
    /// origin-relative and the transport resolves them.
    pub base_url: String,
    /// Freshness window for cached query results.
    pub stale_time: Duration,
    /// How long a stale, unused entry is kept before eviction.
    pub gc_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Read `RENTAL_API_BASE_URL` and `RENTAL_QUERY_STALE_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(BASE_URL_ENV).unwrap_or_default();
        let base_url = base_url.trim();
        if !base_url.is_empty() && !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "{BASE_URL_ENV} must be an http(s) URL, got '{base_url}'"
            )));
        }

        let stale_time = match lookup(STALE_SECS_ENV) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| ApiError::Config(format!("{STALE_SECS_ENV}='{raw}': {e}")))?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_STALE_TIME,
        };

        Ok(Self::new(base_url).with_stale_time(stale_time))
    }

    /// Base URL joined with the versioned API prefix.
    pub fn api_root(&self) -> String {
        format!("{}/api/v1", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_relative_paths() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, "");
        assert_eq!(config.api_root(), "/api/v1");
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.gc_time, DEFAULT_GC_TIME);
    }

    #[test]
    fn reads_base_url_and_stale_time() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://rent.example.com/"),
            (STALE_SECS_ENV, "60"),
        ]))
        .unwrap();
        assert_eq!(config.api_root(), "https://rent.example.com/api/v1");
        assert_eq!(config.stale_time, Duration::from_secs(60));
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "ftp://nope")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        let err = ClientConfig::from_lookup(lookup(&[(STALE_SECS_ENV, "five")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
