//! Site configuration management for `regionpress.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                          |
//! |------------|--------------------------------------------------|
//! | `[base]`   | Site metadata (title, description, url)          |
//! | `[server]` | HTTP server, content store path, admin token     |
//! | `[cache]`  | Rendered page cache (enable, ttl)                |
//! | `[seo]`    | Sitemap, feeds, Open Graph defaults              |
//! | `[extra]`  | User-defined custom fields                       |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Acme Filings"
//! description = "Company registration and compliance services"
//! url = "https://acmefilings.example"
//!
//! [server]
//! port = 5311
//! admin_token = "s3cret"
//!
//! [cache]
//! ttl_secs = 300
//!
//! [extra]
//! analytics_id = "UA-12345"
//! ```

mod base;
mod cache;
pub mod defaults;
mod error;
mod handle;
mod seo;
mod server;

pub use handle::{cfg, init_config};

// Internal imports used in this module
use base::BaseConfig;
use cache::CacheConfig;
use error::ConfigError;
use seo::SeoConfig;
use server::ServerConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing regionpress.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (set after loading)
    #[serde(skip)]
    root: Option<PathBuf>,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Rendered page cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Sitemap/feed/Open Graph settings
    #[serde(default)]
    pub seo: SeoConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Absolute path of the content store file.
    pub fn data_path(&self) -> PathBuf {
        if self.server.data.is_absolute() {
            self.server.data.clone()
        } else {
            self.get_root().join(&self.server.data)
        }
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        // Determine the final root path based on command
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => {
                let base = cli
                    .root
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| self.get_root().to_owned());
                base.join(name)
            }
            _ => cli
                .root
                .as_ref()
                .cloned()
                .unwrap_or_else(|| self.get_root().to_owned()),
        };

        let root = Self::normalize_path(&root);
        self.set_root(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        if let Commands::Serve {
            interface,
            port,
            minify,
        } = &cli.command
        {
            Self::update_option(&mut self.server.interface, interface.as_ref());
            Self::update_option(&mut self.server.port, port.as_ref());
            Self::update_option(&mut self.server.minify, minify.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if self.seo.rss && self.base.url.is_none() {
            bail!("[base.url] is required for feed generation");
        }

        if let Some(base_url) = &self.base.url
            && !base_url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if let Some(og_image) = &self.seo.og_image
            && !og_image.starts_with('/')
            && !og_image.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[seo.og_image] must be an absolute path or URL".into()
            ));
        }

        match &cli.command {
            Commands::Init { .. } if self.get_root().exists() => {
                bail!("Path already exists");
            }
            Commands::Serve { .. } if !self.data_path().exists() => {
                bail!(ConfigError::Validation(format!(
                    "[server.data] not found: {} (run `regionpress init` first)",
                    self.data_path().display()
                )));
            }
            _ => {}
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config_str = r#"
            [base]
            title = "Acme Filings"
            description = "A test site"
            author = "Test Author"
        "#;
        let result = SiteConfig::from_str(config_str);

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.base.title, "Acme Filings");
        assert_eq!(config.base.author, "Test Author");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [base
            title = "Acme"
        "#;
        let result = SiteConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_data_path_relative_to_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/srv/site"));
        assert_eq!(config.data_path(), PathBuf::from("/srv/site/content.json"));
    }

    #[test]
    fn test_data_path_absolute() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/srv/site"));
        config.server.data = PathBuf::from("/var/lib/content.json");
        assert_eq!(config.data_path(), PathBuf::from("/var/lib/content.json"));
    }

    #[test]
    fn test_extra_fields() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"

            [extra]
            custom_field = "custom_value"
            number_field = 42
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(
            config.extra.get("custom_field").and_then(|v| v.as_str()),
            Some("custom_value")
        );
        assert_eq!(
            config.extra.get("number_field").and_then(|v| v.as_integer()),
            Some(42)
        );
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.base.title, "");
        assert!(config.server.minify);
        assert_eq!(config.server.port, 5311);
        assert!(config.cache.enable);
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test"

            [unknown_section]
            field = "value"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_full_config_all_sections() {
        let config = r#"
            [base]
            title = "Acme Filings"
            description = "Compliance services"
            author = "Acme"
            email = "hello@acmefilings.example"
            url = "https://acmefilings.example"
            language = "en-IN"
            copyright = "2026 Acme"

            [server]
            interface = "127.0.0.1"
            port = 3000
            admin_token = "s3cret"

            [cache]
            enable = true
            ttl_secs = 120

            [seo]
            sitemap = true
            rss = true
            og_image = "/assets/og.png"

            [extra]
            analytics_id = "UA-12345"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.base.title, "Acme Filings");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.ttl_secs, 120);
        assert!(config.seo.sitemap);
        assert!(config.extra.contains_key("analytics_id"));
    }
}
