//! Connection settings and the default/override merge.
//!
//! # Design
//! `ClientConfig` is always complete. Callers describe only what they want
//! to change with `ConfigOverrides`, whose fields are all optional, and
//! `ClientConfig::merged` fills the gaps from `ClientConfig::default()`.
//! The override types derive `Deserialize` so applications can load them
//! from whatever format they already use.

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "www.gocanvas.com";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_BASE_PATH: &str = "/apiv2";
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Where requests are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Headers sent with every request unless a call overrides them.
    pub headers: Vec<(String, String)>,
}

/// Client-side behaviour that is not part of the connection target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Declared encoding of generated XML documents.
    pub encoding: String,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub service: ServiceSettings,
    pub options: ClientOptions,
    pub username: String,
    pub password: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                path: DEFAULT_BASE_PATH.to_string(),
                headers: Vec::new(),
            },
            options: ClientOptions {
                encoding: DEFAULT_ENCODING.to_string(),
            },
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub headers: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsOverrides {
    pub encoding: Option<String>,
}

/// Partial configuration supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub service: ServiceOverrides,
    pub options: OptionsOverrides,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConfigOverrides {
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.service.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.service.port = Some(port);
        self
    }

    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.service.path = Some(path.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.options.encoding = Some(encoding.into());
        self
    }
}

impl ClientConfig {
    /// Returns `self` with every field set in `overrides` replaced.
    pub fn merge(&self, overrides: &ConfigOverrides) -> Self {
        let service = &overrides.service;
        Self {
            service: ServiceSettings {
                host: pick(&service.host, &self.service.host),
                port: service.port.unwrap_or(self.service.port),
                path: pick(&service.path, &self.service.path),
                headers: pick(&service.headers, &self.service.headers),
            },
            options: ClientOptions {
                encoding: pick(&overrides.options.encoding, &self.options.encoding),
            },
            username: pick(&overrides.username, &self.username),
            password: pick(&overrides.password, &self.password),
        }
    }

    /// The defaults with `overrides` applied on top.
    pub fn merged(overrides: &ConfigOverrides) -> Self {
        Self::default().merge(overrides)
    }
}

fn pick<T: Clone>(value: &Option<T>, fallback: &T) -> T {
    value.as_ref().unwrap_or(fallback).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_yield_defaults() {
        let config = ClientConfig::merged(&ConfigOverrides::default());
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.service.host, "www.gocanvas.com");
        assert_eq!(config.service.port, 443);
        assert_eq!(config.service.path, "/apiv2");
        assert_eq!(config.options.encoding, "utf-8");
        assert!(config.username.is_empty());
        assert!(config.password.is_empty());
    }

    #[test]
    fn set_fields_win_and_unset_fields_keep_defaults() {
        let overrides = ConfigOverrides::credentials("user", "secret").port(8080);
        let config = ClientConfig::merged(&overrides);
        assert_eq!(config.username, "user");
        assert_eq!(config.password, "secret");
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.host, DEFAULT_HOST);
        assert_eq!(config.service.path, DEFAULT_BASE_PATH);
        assert_eq!(config.options.encoding, DEFAULT_ENCODING);
    }

    #[test]
    fn nested_groups_merge_field_by_field() {
        let overrides = ConfigOverrides::default().encoding("iso-8859-1");
        let config = ClientConfig::merged(&overrides);
        assert_eq!(config.options.encoding, "iso-8859-1");
        assert_eq!(config.service, ClientConfig::default().service);
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let base = ClientConfig::default();
        let overrides = ConfigOverrides::default().host("example.test");
        let merged = base.merge(&overrides);
        assert_eq!(merged.service.host, "example.test");
        assert_eq!(base, ClientConfig::default());
        assert_eq!(overrides.service.host.as_deref(), Some("example.test"));
    }

    #[test]
    fn overrides_deserialize_from_partial_json() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{"service":{"port":80},"username":"u"}"#).unwrap();
        let config = ClientConfig::merged(&overrides);
        assert_eq!(config.service.port, 80);
        assert_eq!(config.username, "u");
        assert_eq!(config.service.host, DEFAULT_HOST);
    }
}
