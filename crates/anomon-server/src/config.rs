use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Default tracing directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Any sea-orm URL: `sqlite://...`, `postgres://...` or `mysql://...`
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_detector_host")]
    pub host: String,
    #[serde(default = "default_detector_port")]
    pub port: u16,
    /// Deadline for every outbound detector call
    #[serde(default = "default_detector_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_url() -> String {
    "sqlite://data/anomon.db?mode=rwc".to_string()
}

fn default_detector_host() -> String {
    "127.0.0.1".to_string()
}

fn default_detector_port() -> u16 {
    19091
}

fn default_detector_timeout_secs() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            host: default_detector_host(),
            port: default_detector_port(),
            timeout_secs: default_detector_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            log_level: default_log_level(),
            database: DatabaseConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// URL with the password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.url.clone(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{path}': {e}"))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{path}': {e}"))?;
        Ok(config)
    }
}
