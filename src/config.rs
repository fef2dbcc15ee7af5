use std::path::PathBuf;
use std::time::Duration;

use crate::{Result, StorefrontError};

/// Client configuration loaded from environment variables (after `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the backend, e.g. "https://api.velore.com". Env var: `VELORE_BACKEND_URL`.
    pub backend_url: String,
    /// Per-request timeout (default 10s). Env var: `VELORE_REQUEST_TIMEOUT_SECS`.
    pub request_timeout: Duration,
    /// JSON file holding values left by earlier steps (default "velore-store.json").
    /// Env var: `VELORE_STORE_PATH`.
    pub store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend_url = lookup("VELORE_BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StorefrontError::Config("VELORE_BACKEND_URL is not set".into()))?;
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(StorefrontError::Config(format!("VELORE_BACKEND_URL is not an http(s) URL: {backend_url}")));
        }
        let request_timeout = match lookup("VELORE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| StorefrontError::Config(format!("invalid VELORE_REQUEST_TIMEOUT_SECS: {raw}")))?,
            None => Duration::from_secs(10),
        };
        let store_path = lookup("VELORE_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("velore-store.json"));
        Ok(Self { backend_url, request_timeout, store_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[("VELORE_BACKEND_URL", "http://localhost:5000")]).unwrap();
        assert_eq!(c.request_timeout, Duration::from_secs(10));
        assert_eq!(c.store_path, PathBuf::from("velore-store.json"));
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("VELORE_BACKEND_URL", "https://api.velore.com"),
            ("VELORE_REQUEST_TIMEOUT_SECS", "3"),
            ("VELORE_STORE_PATH", "/tmp/store.json"),
        ])
        .unwrap();
        assert_eq!(c.request_timeout, Duration::from_secs(3));
        assert_eq!(c.store_path, PathBuf::from("/tmp/store.json"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config(&[]), Err(StorefrontError::Config(_))));
        assert!(config(&[("VELORE_BACKEND_URL", "ftp://x")]).is_err());
        assert!(config(&[("VELORE_BACKEND_URL", "http://x"), ("VELORE_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}
