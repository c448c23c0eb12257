use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct TutorlinkConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub gateways: GatewayConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub socket_path: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Base URLs of the external collaborators. The engine only ever talks to
/// them through these endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub profiles_url: String,
    pub subjects_url: String,
    pub meetings_url: String,
    pub notifications_url: String,
    #[serde(default = "default_gateway_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_gateway_retries")]
    pub max_retries: usize,
    #[serde(default = "default_gateway_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_gateway_retries() -> usize {
    3
}

fn default_gateway_retry_delay() -> u64 {
    250
}

/// Cadence of the expiry sweeper. The 5-minute claim window and 15-minute
/// session length are invariants in code, not configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct SweeperConfig {
    pub interval_seconds: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8780,
        }
    }
}

impl TutorlinkConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweeper_defaults() {
        let sweeper = SweeperConfig::default();
        assert_eq!(sweeper.interval_seconds, 15);
    }

    #[test]
    fn test_http_defaults() {
        let http = HttpConfig::default();
        assert!(http.enabled);
        assert_eq!(http.port, 8780);
    }

    #[test]
    fn test_gateway_defaults_fill_in() {
        let gw: GatewayConfig = serde_json::from_value(serde_json::json!({
            "profiles_url": "http://localhost:9001/profiles",
            "subjects_url": "http://localhost:9001/subjects",
            "meetings_url": "http://localhost:9002/meetings",
            "notifications_url": "http://localhost:9003/notify",
        }))
        .unwrap();
        assert_eq!(gw.request_timeout_seconds, 10);
        assert_eq!(gw.max_retries, 3);
        assert_eq!(gw.retry_delay_ms, 250);
    }
}
