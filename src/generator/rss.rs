//! rss feed generation.
//!
//! Builds a per-region blog feed from the content store.

use anyhow::{Result, anyhow};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};

use crate::{
    config::SiteConfig,
    content::{BlogPost, ContentStore, Region},
    routes,
};

// ============================================================================
// Public API
// ============================================================================

/// Build the region's blog feed as rss xml.
pub fn build_feed(config: &SiteConfig, store: &ContentStore, region: Region) -> Result<String> {
    RssFeed {
        config,
        region,
        posts: store.published_blogs(region),
    }
    .into_xml()
}

// ============================================================================
// RssFeed Implementation
// ============================================================================

/// rss feed builder
struct RssFeed<'a> {
    config: &'a SiteConfig,
    region: Region,
    posts: Vec<BlogPost>,
}

impl RssFeed<'_> {
    /// Generate rss xml string
    fn into_xml(self) -> Result<String> {
        let base = self
            .config
            .base
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("[base.url] is required for feed generation"))?
            .trim_end_matches('/')
            .to_string();

        let items: Vec<_> = self
            .posts
            .iter()
            .map(|post| post_to_rss_item(post, &base, self.config))
            .collect();

        let channel = ChannelBuilder::default()
            .title(&self.config.base.title)
            .link(format!("{base}{}", routes::blog_listing_path(self.region)))
            .description(&self.config.base.description)
            .language(self.config.base.language.clone())
            .generator("regionpress".to_string())
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("rss validation failed: {e}"))?;
        Ok(channel.to_string())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a blog post to an rss item.
fn post_to_rss_item(post: &BlogPost, base: &str, config: &SiteConfig) -> rss::Item {
    let link = format!("{base}{}", routes::blog_path(post.region, &post.slug));

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description((!post.excerpt.is_empty()).then(|| post.excerpt.clone()))
        .pub_date(Some(post.published_at.to_rfc2822()))
        .author(normalize_rss_author(post.author.as_deref(), config))
        .build()
}

/// Normalize author field to rss format: "email@example.com (Name)"
///
/// Priority:
/// 1. Post author if already in valid format
/// 2. Site config author if in valid format
/// 3. Combine site config email and post/site author name
fn normalize_rss_author(author: Option<&str>, config: &SiteConfig) -> Option<String> {
    if let Some(author) = author
        && is_valid_rss_author(author)
    {
        return Some(author.to_string());
    }

    if is_valid_rss_author(&config.base.author) {
        return Some(config.base.author.clone());
    }

    let name = author.unwrap_or(&config.base.author);
    Some(format!("{} ({name})", config.base.email))
}

/// Check "email (Name)" shape: an `@` in the address part and a trailing
/// parenthesized name.
fn is_valid_rss_author(s: &str) -> bool {
    let Some((address, name)) = s.split_once(" (") else {
        return false;
    };
    let address = address.trim();
    address.contains('@')
        && !address.starts_with('@')
        && !address.ends_with('@')
        && !address.contains(' ')
        && name.trim_end().ends_with(')')
        && name.len() > 1
}
