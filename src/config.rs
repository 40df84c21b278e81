use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the discovery API (recommendations, favorites, catalog)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the logged-in user is persisted between restarts
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Upper bound on seed titles per For-You rebuild
    #[serde(default = "default_sample_size")]
    pub recommendation_sample_size: usize,

    #[serde(default = "default_debounce_ms")]
    pub suggestion_debounce_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".discovery/session.json")
}

fn default_sample_size() -> usize {
    10
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.recommendation_sample_size, 10);
        assert_eq!(config.suggestion_debounce(), Duration::from_millis(250));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("API_BASE_URL".to_string(), "http://api.internal:8080".to_string()),
            ("PORT".to_string(), "8000".to_string()),
            ("RECOMMENDATION_SAMPLE_SIZE".to_string(), "4".to_string()),
            ("SESSION_FILE".to_string(), "/tmp/user.json".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.api_base_url, "http://api.internal:8080");
        assert_eq!(config.port, 8000);
        assert_eq!(config.recommendation_sample_size, 4);
        assert_eq!(config.session_file, PathBuf::from("/tmp/user.json"));
    }
}
