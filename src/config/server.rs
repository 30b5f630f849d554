//! `[server]` section configuration.
//!
//! Contains HTTP server and admin API settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[server]` section in regionpress.toml.
///
/// # Example
/// ```toml
/// [server]
/// interface = "0.0.0.0"   # Listen on all interfaces
/// port = 8080
/// data = "content.json"   # Content store location
/// admin_token = "s3cret"  # Bearer token for /admin/api
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::server::interface")]
    #[educe(Default = defaults::server::interface())]
    pub interface: String,

    /// Port to bind. Auto-increments on conflict.
    #[serde(default = "defaults::server::port")]
    #[educe(Default = defaults::server::port())]
    pub port: u16,

    /// Content store file, relative to the project root.
    #[serde(default = "defaults::server::data")]
    #[educe(Default = defaults::server::data())]
    pub data: PathBuf,

    /// Bearer token required by the admin API.
    /// An empty token disables the admin API entirely.
    #[serde(default = "defaults::server::admin_token")]
    #[educe(Default = defaults::server::admin_token())]
    pub admin_token: String,

    /// Minify rendered html/xml output.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_server_config_defaults() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.server.interface, "127.0.0.1");
        assert_eq!(config.server.port, 5311);
        assert_eq!(config.server.data, PathBuf::from("content.json"));
        assert_eq!(config.server.admin_token, "");
        assert!(config.server.minify);
    }

    #[test]
    fn test_server_config_full() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"

            [server]
            interface = "0.0.0.0"
            port = 8080
            data = "store/content.json"
            admin_token = "s3cret"
            minify = false
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.server.interface, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.data, PathBuf::from("store/content.json"));
        assert_eq!(config.server.admin_token, "s3cret");
        assert!(!config.server.minify);
    }
}
