//! Sitemap generation.
//!
//! Generates sitemap.xml listing every published path across both
//! regions for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/gst-registration</loc>
//!     <lastmod>2026-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::{config::SiteConfig, content::{ContentStore, Region}, routes};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// ============================================================================
// Public API
// ============================================================================

/// Build the sitemap from the current store state.
pub fn build_sitemap(config: &SiteConfig, store: &ContentStore) -> String {
    Sitemap::from_store(config, store).into_xml()
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
struct Sitemap {
    /// List of URL entries
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// Full URL location
    loc: String,
    /// Last modification date (optional, YYYY-MM-DD format)
    lastmod: Option<String>,
}

impl Sitemap {
    /// Collect every published path, region by region.
    fn from_store(config: &SiteConfig, store: &ContentStore) -> Self {
        let base = config
            .base
            .url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_default();

        let mut urls = Vec::new();
        for region in Region::ALL {
            urls.push(UrlEntry {
                loc: format!("{base}{}", routes::home_path(region)),
                lastmod: None,
            });

            for page in store.published_pages(region) {
                urls.push(UrlEntry {
                    loc: format!("{base}{}", routes::content_path(region, &page.href)),
                    lastmod: Some(page.updated_at.format("%Y-%m-%d").to_string()),
                });
            }

            urls.push(UrlEntry {
                loc: format!("{base}{}", routes::blog_listing_path(region)),
                lastmod: None,
            });

            for blog in store.published_blogs(region) {
                urls.push(UrlEntry {
                    loc: format!("{base}{}", routes::blog_path(region, &blog.slug)),
                    lastmod: Some(blog.updated_at.format("%Y-%m-%d").to_string()),
                });
            }
        }

        Self { urls }
    }

    /// Generate sitemap XML string.
    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{BlogPost, ContentPage, PageKind, Status};
    use chrono::{TimeZone, Utc};

    fn config() -> SiteConfig {
        let mut c = SiteConfig::default();
        c.base.url = Some("https://acmefilings.example".into());
        c
    }

    fn page(region: Region, href: &str, status: Status) -> ContentPage {
        ContentPage {
            id: href.to_string(),
            region,
            href: href.to_string(),
            label: href.to_string(),
            body_html: String::new(),
            kind: PageKind::Service,
            status,
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn blog(region: Region, slug: &str) -> BlogPost {
        BlogPost {
            id: format!("{region}-{slug}"),
            region,
            slug: slug.to_string(),
            title: slug.to_string(),
            excerpt: String::new(),
            body_html: String::new(),
            category: None,
            author: None,
            status: Status::Published,
            published_at: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_sitemap_empty_store() {
        let xml = build_sitemap(&config(), &ContentStore::in_memory());

        assert!(xml.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        // Region roots and blog listings are always present.
        assert!(xml.contains("<loc>https://acmefilings.example/</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/us</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/blogs</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/us/blog</loc>"));
    }

    #[test]
    fn test_sitemap_region_paths() {
        let store = ContentStore::in_memory();
        store.upsert_page(page(Region::India, "gst-registration", Status::Published));
        store.upsert_page(page(Region::Us, "llc-formation", Status::Published));
        store.upsert_blog(blog(Region::India, "deadlines"));
        store.upsert_blog(blog(Region::Us, "deadlines"));

        let xml = build_sitemap(&config(), &store);

        assert!(xml.contains("<loc>https://acmefilings.example/gst-registration</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/us/llc-formation</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/blogs/deadlines</loc>"));
        assert!(xml.contains("<loc>https://acmefilings.example/us/blog/deadlines</loc>"));
        assert!(xml.contains("<lastmod>2026-01-01</lastmod>"));
        assert!(xml.contains("<lastmod>2026-01-02</lastmod>"));
    }

    #[test]
    fn test_sitemap_excludes_unpublished() {
        let store = ContentStore::in_memory();
        store.upsert_page(page(Region::India, "draft-page", Status::Draft));
        store.upsert_page(page(Region::India, "archived-page", Status::Archived));

        let xml = build_sitemap(&config(), &store);

        assert!(!xml.contains("draft-page"));
        assert!(!xml.contains("archived-page"));
    }
}
