use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub forwarders: HashMap<String, ForwarderConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// One address, bound for both UDP and TCP.
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Recursive resolvers tried in order when no forwarder pattern matches.
    pub recursors: Vec<String>,
    #[serde(default = "default_exchange_timeout_ms")]
    pub exchange_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    /// Domain suffix the query name must end with, trailing dot included.
    pub pattern: String,
    pub address: String,
    /// Hard cap on answer records returned to the client. 0 = unlimited.
    #[serde(default)]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:53".to_string()
}

fn default_exchange_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let path = path.unwrap_or("splitdns.toml");
        let mut config = Self::from_file(path)?;
        config.apply_cli_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen {
            self.server.listen = listen;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Startup-time checks. The process must not begin serving on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .listen
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Validation(format!("bad listen address {}", self.server.listen)))?;

        if self.upstream.recursors.is_empty() {
            return Err(ConfigError::Validation(
                "at least one recursor is required".to_string(),
            ));
        }
        for addr in &self.upstream.recursors {
            addr.parse::<SocketAddr>()
                .map_err(|_| ConfigError::Validation(format!("bad recursor address {addr}")))?;
        }
        for (name, forwarder) in &self.forwarders {
            forwarder.address.parse::<SocketAddr>().map_err(|_| {
                ConfigError::Validation(format!(
                    "bad address {} for forwarder {name}",
                    forwarder.address
                ))
            })?;
            if forwarder.pattern.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "empty pattern for forwarder {name}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    FileRead(String, String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).expect("config should parse")
    }

    const MINIMAL: &str = r#"
        [server]
        listen = "127.0.0.1:5300"

        [upstream]
        recursors = ["8.8.8.8:53", "1.1.1.1:53"]
    "#;

    #[test]
    fn minimal_config_parses_and_validates() {
        let config = parse(MINIMAL);
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.recursors.len(), 2);
        assert_eq!(config.upstream.exchange_timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
        assert!(config.forwarders.is_empty());
    }

    #[test]
    fn forwarder_tables_parse_with_default_limit() {
        let config = parse(
            r#"
            [server]
            listen = "127.0.0.1:5300"

            [upstream]
            recursors = ["8.8.8.8:53"]

            [forwarders.corp]
            pattern = "corp.example.com."
            address = "10.0.0.1:53"

            [forwarders.lab]
            pattern = "lab.example.com."
            address = "10.0.0.2:53"
            limit = 2
        "#,
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.forwarders["corp"].limit, 0);
        assert_eq!(config.forwarders["lab"].limit, 2);
    }

    #[test]
    fn empty_recursor_list_fails_validation() {
        let config = parse(
            r#"
            [server]
            listen = "127.0.0.1:5300"

            [upstream]
            recursors = []
        "#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("recursor"));
    }

    #[test]
    fn unparseable_addresses_fail_validation() {
        let mut config = parse(MINIMAL);
        config.upstream.recursors.push("not-an-address".to_string());
        assert!(config.validate().is_err());

        let mut config = parse(MINIMAL);
        config.forwarders.insert(
            "bad".to_string(),
            ForwarderConfig {
                pattern: "example.com.".to_string(),
                address: "10.0.0.1".to_string(),
                limit: 0,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_overrides_replace_listen_and_level() {
        let mut config = parse(MINIMAL);
        config.apply_cli_overrides(CliOverrides {
            listen: Some("0.0.0.0:53".to_string()),
            log_level: Some("debug".to_string()),
        });
        assert_eq!(config.server.listen, "0.0.0.0:53");
        assert_eq!(config.logging.level, "debug");
    }
}
