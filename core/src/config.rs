//! Serializable client settings.
//!
//! `ClientConfig` holds everything about a client that is plain data, so it
//! can live in a config file next to the rest of an application's settings.
//! The logger and a pre-built transport are attached on
//! [`crate::ClientBuilder`] instead.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("rest-facade/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute base URL, e.g. `https://api.example.com`.
    pub host: String,
    /// Prepended verbatim to every request path.
    pub path_prefix: String,
    pub username: String,
    pub password: String,
    /// Disable certificate verification entirely.
    pub insecure: bool,
    /// PEM bundle appended to the platform roots.
    pub cert_file: Option<PathBuf>,
    /// Overrides [`DEFAULT_USER_AGENT`] when non-empty.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("path_prefix", &self.path_prefix)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("cert_file", &self.cert_file)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host":"https://api.example.com"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("https://api.example.com"));
        assert!(!config.insecure);
        assert!(config.cert_file.is_none());
    }

    #[test]
    fn deserializes_all_fields() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "host": "https://localhost:8443",
                "path_prefix": "/api/v1",
                "username": "admin",
                "password": "hunter2",
                "insecure": true,
                "cert_file": "/etc/ssl/local-ca.pem",
                "user_agent": "inventory-sync/2.1"
            }"#,
        )
        .unwrap();
        assert_eq!(config.path_prefix, "/api/v1");
        assert_eq!(config.username, "admin");
        assert!(config.insecure);
        assert_eq!(config.cert_file, Some(PathBuf::from("/etc/ssl/local-ca.pem")));
        assert_eq!(config.user_agent.as_deref(), Some("inventory-sync/2.1"));
    }

    #[test]
    fn debug_redacts_password() {
        let config = ClientConfig {
            password: "hunter2".to_string(),
            ..ClientConfig::new("https://api.example.com")
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn default_user_agent_names_the_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("rest-facade/"));
    }
}
