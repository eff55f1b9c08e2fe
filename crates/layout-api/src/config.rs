use std::env;
use std::net::{IpAddr, SocketAddr};

/// Server settings, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    pub rust_log: String,
}

impl ApiConfig {
    const DEFAULT_PORT: u16 = 3000;
    const DEFAULT_LOG: &'static str = "info";

    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so callers other than
    /// `from_env` never touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: parse_or_default(&lookup, "LABEL_LAYOUT_API_HOST", default_host()),
            port: parse_or_default(&lookup, "LABEL_LAYOUT_API_PORT", Self::DEFAULT_PORT),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| Self::DEFAULT_LOG.to_string()),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::DEFAULT_PORT,
            rust_log: Self::DEFAULT_LOG.to_string(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

/// Falls back to `default` when the key is unset or unparsable.
fn parse_or_default<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(value) => value,
        Err(err) => {
            // Logging is not installed yet when config loads
            eprintln!("⚠️ Could not parse {key} ('{raw}'): {err}. Using {default}.");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_socket_addr() {
        let config = ApiConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.rust_log, "info");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let config = ApiConfig::from_lookup(vars(&[
            ("LABEL_LAYOUT_API_PORT", "not-a-port"),
            ("LABEL_LAYOUT_API_HOST", "localhost"),
        ]));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_values_read_from_lookup() {
        let config = ApiConfig::from_lookup(vars(&[
            ("LABEL_LAYOUT_API_HOST", "127.0.0.1"),
            ("LABEL_LAYOUT_API_PORT", "8081"),
            ("RUST_LOG", "debug"),
        ]));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(config.rust_log, "debug");
    }
}
