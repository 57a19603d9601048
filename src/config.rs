use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use tracing::{info, warn};

/// Application configuration, loaded from environment variables or default values.
///
/// Only the server address is configurable. The carton limits are fixed in
/// `SearchConstraints::default()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "CARTON_FIT_API_HOST";
    const PORT_VAR: &'static str = "CARTON_FIT_API_PORT";

    fn from_env() -> Self {
        Self::from_values(env_string(Self::HOST_VAR), env_string(Self::PORT_VAR))
    }

    fn from_values(host: Option<String>, port: Option<String>) -> Self {
        let host_value = host.unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (Self::DEFAULT_IP, Self::DEFAULT_HOST.to_string())
            }
        };

        let port = parse_with_fallback(
            Self::PORT_VAR,
            port,
            Self::DEFAULT_PORT,
            |value| *value != 0,
            "must not be 0",
        );

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_with_fallback<T>(
    var_name: &str,
    raw: Option<String>,
    default: T,
    validator: impl Fn(&T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Display + PartialEq + Copy,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if validator(&value) => {
            if value != default {
                info!("{} overrides the default {} with {}.", var_name, default, value);
            }
            value
        }
        Ok(_) => {
            warn!(
                "{} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_fallback_accepts_valid_values() {
        assert_eq!(
            parse_with_fallback("TEST_VAR", Some("30".into()), 25u32, |v| *v > 0, "hint"),
            30
        );
        assert_eq!(
            parse_with_fallback("TEST_VAR", Some(" 12.5 ".into()), 50.0, |v| *v > 0.0, "hint"),
            12.5
        );
    }

    #[test]
    fn test_parse_with_fallback_uses_default_when_absent() {
        assert_eq!(
            parse_with_fallback("TEST_VAR", None, 150u64, |v| *v >= 2, "hint"),
            150
        );
    }

    #[test]
    fn test_parse_with_fallback_rejects_invalid_values() {
        assert_eq!(
            parse_with_fallback("TEST_VAR", Some("abc".into()), 25u32, |v| *v > 0, "hint"),
            25
        );
        assert_eq!(
            parse_with_fallback("TEST_VAR", Some("0".into()), 25u32, |v| *v > 0, "hint"),
            25
        );
        assert_eq!(
            parse_with_fallback("TEST_VAR", Some("-3".into()), 25u32, |v| *v > 0, "hint"),
            25
        );
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::from_values(None, None);
        assert_eq!(config.port(), 8080);
        assert!(config.binds_to_all_interfaces());
        assert!(config.uses_default_host());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_api_config_custom_host_and_invalid_port() {
        let config = ApiConfig::from_values(Some("127.0.0.1".into()), Some("0".into()));
        assert_eq!(config.display_host(), "127.0.0.1");
        assert_eq!(config.port(), 8080);
        assert!(!config.binds_to_all_interfaces());
        assert!(!config.uses_default_host());
    }

    #[test]
    fn test_api_config_invalid_host_falls_back() {
        let config = ApiConfig::from_values(Some("not-an-ip".into()), Some("9000".into()));
        assert_eq!(config.display_host(), "0.0.0.0");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
    }
}
