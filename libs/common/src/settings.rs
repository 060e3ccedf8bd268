//! HTTP service settings loaded through the `config` crate
//!
//! Each service reads `<PREFIX>_<KEY>` environment variables (nested keys use
//! `__`) layered over built-in defaults, e.g. `API_PORT=8080`.

use config::{Config, Environment};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::SettingsError;

/// Bind settings shared by every HTTP service
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Interface to listen on
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
}

impl ServiceSettings {
    /// Load bind settings for the service identified by `prefix`
    pub fn load(prefix: &str, default_port: u16) -> Result<Self, SettingsError> {
        let port = default_port.to_string();
        let settings: Self = load(prefix, &[("host", "0.0.0.0"), ("port", port.as_str())])?;
        info!("{} service settings: {}", prefix, settings.bind_address());
        Ok(settings)
    }

    /// `host:port` string accepted by `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Deserialize `T` from `<PREFIX>_*` environment variables over `defaults`
pub fn load<T: DeserializeOwned>(
    prefix: &str,
    defaults: &[(&str, &str)],
) -> Result<T, SettingsError> {
    let mut builder = Config::builder();
    for (key, value) in defaults {
        builder = builder.set_default(*key, *value)?;
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_apply() {
        let settings = ServiceSettings::load("SETTINGSTEST", 3001).unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        unsafe {
            std::env::set_var("SETTINGSTEST_PORT", "8080");
            std::env::set_var("SETTINGSTEST_HOST", "127.0.0.1");
        }

        let settings = ServiceSettings::load("SETTINGSTEST", 3001).unwrap();
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");

        unsafe {
            std::env::remove_var("SETTINGSTEST_PORT");
            std::env::remove_var("SETTINGSTEST_HOST");
        }
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_reported() {
        unsafe {
            std::env::set_var("SETTINGSTEST_PORT", "not-a-port");
        }

        assert!(matches!(
            ServiceSettings::load("SETTINGSTEST", 3001),
            Err(SettingsError::Load(_))
        ));

        unsafe {
            std::env::remove_var("SETTINGSTEST_PORT");
        }
    }
}
