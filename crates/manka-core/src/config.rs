//! Client and per-request configuration.
//!
//! `ClientConfig` is layered: compiled defaults first, then environment
//! overrides. It is read once when the shared transport is installed.

use std::{collections::HashMap, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default path prefix for every backend route.
pub const DEFAULT_BASE_PATH: &str = "/api/v1";

/// Default backend origin.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Env var holding the base path (or an absolute base URL).
pub const ENV_BASE_URL: &str = "PUBLIC_BASE_URL";

/// Env var holding the backend origin.
pub const ENV_SERVER_URL: &str = "MANKA_SERVER_URL";

/// Env var flag selecting the embedded-runtime transport.
pub const ENV_EMBEDDED: &str = "IS_TAURI";

/// Env var holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "MANKA_TIMEOUT_SECS";

/// Runtime the client is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeTarget {
    /// Cookie-carrying browser-style client.
    #[default]
    Browser,
    /// Host-provided fetch without a cookie jar.
    Embedded,
}

impl RuntimeTarget {
    /// Interpret a boolean-like flag; truthy values select `Embedded`.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Self::Embedded,
            _ => Self::Browser,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "web",
            Self::Embedded => "embedded",
        }
    }
}

impl fmt::Display for RuntimeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://127.0.0.1:8080`.
    pub server_url: String,
    /// Path prefix, or an absolute URL that replaces `server_url` entirely.
    pub base_path: String,
    /// Which transport to build.
    pub target: RuntimeTarget,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            target: RuntimeTarget::Browser,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = non_empty(ENV_BASE_URL) {
            config.base_path = base;
        }
        if let Some(server) = non_empty(ENV_SERVER_URL) {
            config.server_url = server;
        }
        if let Some(flag) = non_empty(ENV_EMBEDDED) {
            config.target = RuntimeTarget::from_flag(&flag);
        }
        if let Some(secs) = non_empty(ENV_TIMEOUT_SECS) {
            match u64::from_str(secs.trim()) {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => tracing::warn!(value = %secs, error = %e, "ignoring invalid timeout"),
            }
        }
        config
    }

    /// Set the runtime target.
    #[must_use]
    pub fn with_target(mut self, target: RuntimeTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the backend origin.
    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Absolute base URL every request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        let base = self.base_path.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            return base.to_string();
        }
        let origin = self.server_url.trim_end_matches('/');
        if base.is_empty() {
            origin.to_string()
        } else if base.starts_with('/') {
            format!("{origin}{base}")
        } else {
            format!("{origin}/{base}")
        }
    }

    /// Full URL for a backend path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url(), path)
    }
}

/// Append `path` to `base`, inserting exactly one separator.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Per-request options forwarded to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Query string parameters.
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// Extra request headers.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Timeout override for this call.
    #[serde(default)]
    pub timeout: Option<Duration>,
    /// Arbitrary metadata for app-specific needs.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl RequestConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get a metadata value by key.
    #[must_use]
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Set a metadata value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/api/v1");
        assert_eq!(config.target, RuntimeTarget::Browser);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "/api/v2/"),
            (ENV_SERVER_URL, "http://manka.local:10011/"),
            (ENV_EMBEDDED, "true"),
            (ENV_TIMEOUT_SECS, "5"),
        ]));
        assert_eq!(config.base_url(), "http://manka.local:10011/api/v2");
        assert_eq!(config.target, RuntimeTarget::Embedded);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_absolute_base_url_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://archive.example.com/api/v1"),
            (ENV_SERVER_URL, "http://ignored:1"),
        ]));
        assert_eq!(config.base_url(), "https://archive.example.com/api/v1");
        assert_eq!(
            config.url_for("/manka/123/detail"),
            "https://archive.example.com/api/v1/manka/123/detail"
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_EMBEDDED, ""),
            (ENV_TIMEOUT_SECS, "soon"),
        ]));
        assert_eq!(config.target, RuntimeTarget::Browser);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_runtime_flag() {
        for truthy in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(RuntimeTarget::from_flag(truthy), RuntimeTarget::Embedded);
        }
        for falsy in ["0", "false", "no", "off", "maybe"] {
            assert_eq!(RuntimeTarget::from_flag(falsy), RuntimeTarget::Browser);
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/api/v1/", "/a"), "http://h/api/v1/a");
        assert_eq!(join_url("http://h/api/v1", "a"), "http://h/api/v1/a");
        assert_eq!(join_url("http://h/api/v1", ""), "http://h/api/v1");
    }

    #[test]
    fn test_request_config_builder() {
        let mut config = RequestConfig::new()
            .query("page", 2)
            .header("X-Trace", "abc")
            .timeout(Duration::from_secs(1));
        config.set_metadata("view", Value::from("favorites"));

        assert_eq!(config.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(config.headers, vec![("X-Trace".to_string(), "abc".to_string())]);
        assert_eq!(config.timeout, Some(Duration::from_secs(1)));
        assert_eq!(config.get_metadata("view"), Some(&Value::from("favorites")));
    }
}
