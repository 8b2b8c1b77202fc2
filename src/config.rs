use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub environment: String,
}

/// Startup configuration failures. Besides a failed bind, a `PORT` that is not a
/// valid port number is the only other reason the service refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values count as unset.
    /// The environment name is echoed back verbatim, so only `PORT` is trimmed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let port = lookup("PORT")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(value))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let environment = non_empty("APP_ENV")
            .or_else(|| non_empty("NODE_ENV"))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        Ok(Self { port, environment })
    }

    pub fn bind_socket(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parse_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("config should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "  "), ("NODE_ENV", "")]))
            .expect("config should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn environment_is_kept_verbatim() {
        let config = Config::from_lookup(lookup_from(&[("NODE_ENV", " staging ")]))
            .expect("config should parse");
        assert_eq!(config.environment, " staging ");

        let config = Config::from_lookup(lookup_from(&[("NODE_ENV", "  ")]))
            .expect("config should parse");
        assert_eq!(config.environment, "  ");
    }

    #[test]
    fn empty_app_env_falls_back_to_node_env() {
        let config = Config::from_lookup(lookup_from(&[("APP_ENV", ""), ("NODE_ENV", "test")]))
            .expect("config should parse");
        assert_eq!(config.environment, "test");
    }

    #[test]
    fn port_and_environment_are_read() {
        let config =
            Config::from_lookup(lookup_from(&[("PORT", "8081"), ("NODE_ENV", "staging")]))
                .expect("config should parse");
        assert_eq!(config.port, 8081);
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn app_env_takes_precedence_over_node_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("NODE_ENV", "test"),
        ]))
        .expect("config should parse");
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn invalid_port_fails() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]))
            .expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort(ref value) if value == "not-a-port"));

        let err = Config::from_lookup(lookup_from(&[("PORT", "70000")]))
            .expect_err("expected out of range port error");
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn bind_socket_listens_on_all_interfaces() {
        let config = Config {
            port: 4000,
            ..Config::default()
        };
        assert_eq!(
            config.bind_socket(),
            "0.0.0.0:4000".parse::<SocketAddr>().expect("valid socket")
        );
    }
}
