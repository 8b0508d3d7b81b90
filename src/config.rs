use std::env;
use std::time::Duration;

use anyhow::{Context, anyhow};

#[derive(Clone, Debug)]
pub struct Config {
    pub configured_prefix: String,
    pub lavalink_host: String,
    pub lavalink_port: u16,
    pub lavalink_password: String,
    pub uplink: UplinkConfig,
}

/// Everything needed to reach the control plane. The bot token itself is negotiated there.
#[derive(Clone, Debug)]
pub struct UplinkConfig {
    pub api_url: Option<String>,
    pub register_token: String,
    pub communication_token: String,
    pub server_id: String,
    pub server_port: u16,
    pub server_location: String,
    pub heartbeat_interval: Duration,
    pub reconnect_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let millis = |key: &str, default: u64| -> anyhow::Result<Duration> {
            let raw = optional(key, &default.to_string());
            let value: u64 = raw
                .parse()
                .with_context(|| format!("{key} must be a number of milliseconds, got {raw:?}"))?;
            Ok(Duration::from_millis(value))
        };

        let lavalink_port = required("LAVALINK_PORT")?
            .parse()
            .context("LAVALINK_PORT must be a port number")?;
        let server_port = optional("SERVER_PORT", "0")
            .parse()
            .context("SERVER_PORT must be a port number")?;

        let uplink = UplinkConfig {
            api_url: lookup("UPLINK_API_URL").filter(|url| !url.trim().is_empty()),
            register_token: optional("UPLINK_REGISTER_TOKEN", ""),
            communication_token: optional("COMMUNICATION_TOKEN", ""),
            server_id: optional("SERVER_ID", "default"),
            server_port,
            server_location: optional("SERVER_LOCATION", "unknown"),
            heartbeat_interval: millis("HEARTBEAT_INTERVAL_MS", 5_000)?,
            reconnect_interval: millis("RECONNECT_INTERVAL_MS", 10_000)?,
            request_timeout: millis("UPLINK_TIMEOUT_MS", 5_000)?,
        };

        Ok(Self {
            // Set but blank disables prefix commands.
            configured_prefix: lookup("PREFIX").map_or_else(
                || ";".to_string(),
                |prefix| prefix.trim().to_string(),
            ),
            lavalink_host: required("LAVALINK_HOST")?,
            lavalink_port,
            lavalink_password: required("LAVALINK_PASSWORD")?,
            uplink,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const LAVALINK: [(&str, &str); 3] = [
        ("LAVALINK_HOST", "localhost"),
        ("LAVALINK_PORT", "2333"),
        ("LAVALINK_PASSWORD", "youshallnotpass"),
    ];

    #[test]
    fn test_defaults() {
        let config = config_from(&LAVALINK).unwrap();
        assert_eq!(config.configured_prefix, ";");
        assert_eq!(config.lavalink_port, 2333);
        assert!(config.uplink.api_url.is_none());
        assert_eq!(config.uplink.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.uplink.reconnect_interval, Duration::from_secs(10));
        assert_eq!(config.uplink.server_location, "unknown");
    }

    #[test]
    fn test_uplink_values() {
        let mut pairs = LAVALINK.to_vec();
        pairs.extend([
            ("UPLINK_API_URL", "https://uplink.example/"),
            ("SERVER_ID", "eu-1"),
            ("SERVER_PORT", "8080"),
            ("HEARTBEAT_INTERVAL_MS", "2500"),
            ("PREFIX", "!"),
        ]);
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.uplink.api_url.as_deref(), Some("https://uplink.example/"));
        assert_eq!(config.uplink.server_id, "eu-1");
        assert_eq!(config.uplink.server_port, 8080);
        assert_eq!(config.uplink.heartbeat_interval, Duration::from_millis(2500));
        assert_eq!(config.configured_prefix, "!");
    }

    #[test]
    fn test_blank_prefix_disables_prefix_commands() {
        let mut pairs = LAVALINK.to_vec();
        pairs.push(("PREFIX", "  "));
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.configured_prefix, "");
        assert!(crate::prefix_parser::parse(";play song", &config.configured_prefix).is_none());
    }

    #[test]
    fn test_blank_uplink_url_counts_as_missing() {
        let mut pairs = LAVALINK.to_vec();
        pairs.push(("UPLINK_API_URL", "   "));
        assert!(config_from(&pairs).unwrap().uplink.api_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut pairs = LAVALINK.to_vec();
        pairs.push(("RECONNECT_INTERVAL_MS", "soon"));
        assert!(config_from(&pairs).is_err());

        assert!(config_from(&LAVALINK[..2]).is_err());
    }
}
