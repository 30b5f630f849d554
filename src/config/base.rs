//! `[base]` section configuration.
//!
//! Contains basic site information like title, description, urls, etc.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in regionpress.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Acme Filings"
/// description = "Company registration and compliance services"
/// url = "https://acmefilings.example"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title displayed in browser tab and used as the og:site_name.
    pub title: String,

    /// Author/organisation name for rss feeds and meta tags.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Contact email for rss feeds.
    #[serde(default = "defaults::base::email")]
    #[educe(Default = defaults::base::email())]
    pub email: String,

    /// Site description for SEO meta tags, used when a page has no
    /// custom metadata block.
    pub description: String,

    /// Base URL for absolute links in rss/sitemap and canonical tags.
    /// Required when `[seo].rss = true`.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// BCP 47 language code (e.g., "en-IN", "en-US").
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Copyright notice for the site footer.
    #[serde(default)]
    pub copyright: String,
}
