//! `[seo]` section configuration.
//!
//! Controls the sitemap, the per-region blog feeds, and the defaults used
//! by the Open Graph / Twitter card tags.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[seo]` section in regionpress.toml.
///
/// # Example
/// ```toml
/// [seo]
/// sitemap = true
/// rss = true
/// og_image = "/assets/og-card.png"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[educe(Default)]
pub struct SeoConfig {
    /// Serve `/sitemap.xml` with all published paths.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub sitemap: bool,

    /// Serve per-region blog feeds at `/feed.xml` and `/us/feed.xml`.
    /// Requires `[base].url`.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub rss: bool,

    /// Default Open Graph image path, used when a page has no custom one.
    #[serde(default)]
    pub og_image: Option<String>,

    /// `og:type` emitted for content pages.
    #[serde(default = "defaults::seo::og_type")]
    #[educe(Default = defaults::seo::og_type())]
    pub og_type: String,

    /// `twitter:card` variant.
    #[serde(default = "defaults::seo::twitter_card")]
    #[educe(Default = defaults::seo::twitter_card())]
    pub twitter_card: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_seo_config_defaults() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(config.seo.sitemap);
        assert!(config.seo.rss);
        assert_eq!(config.seo.og_image, None);
        assert_eq!(config.seo.og_type, "website");
        assert_eq!(config.seo.twitter_card, "summary_large_image");
    }

    #[test]
    fn test_seo_config_override() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"

            [seo]
            sitemap = false
            rss = false
            og_image = "/assets/og.png"
            og_type = "article"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(!config.seo.sitemap);
        assert!(!config.seo.rss);
        assert_eq!(config.seo.og_image.as_deref(), Some("/assets/og.png"));
        assert_eq!(config.seo.og_type, "article");
    }
}
