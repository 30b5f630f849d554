//! Revalidation dispatcher.
//!
//! Translates a content mutation into exactly the set of cache
//! invalidations needed to make the next public read reflect the new
//! state, without touching unrelated entries. All operations are pure
//! side effects with no return value: a failed derivation surfaces as
//! stale content until natural TTL expiry, never as an error. The parity
//! tests here and in `routes` are the guard against that drift.

use crate::cache::PageCache;
use crate::content::Region;
use crate::routes;

// ============================================================================
// Cache Tag Naming
// ============================================================================

/// Tag attached to a cached content page: `page:<region>:<slug>`.
pub fn content_tag(region: Region, slug: &str) -> String {
    format!("page:{region}:{slug}")
}

/// Tag attached to a cached blog detail page: `blog:<region>:<slug>`.
pub fn blog_tag(region: Region, slug: &str) -> String {
    format!("blog:{region}:{slug}")
}

/// Tag attached to every entry that embeds the region's navbar.
pub fn navbar_tag(region: Region) -> String {
    format!("navbar:{region}")
}

/// Tag attached to the region's blog feed.
pub fn feed_tag(region: Region) -> String {
    format!("feed:{region}")
}

/// Tag attached to the sitemap.
pub const SITEMAP_TAG: &str = "sitemap";

/// Strip leading slashes from an admin-supplied href.
///
/// Admin forms store hrefs both as "slug" and "/slug"; the dispatcher
/// accepts either. `None` or an effectively-empty value yields `None`,
/// which callers treat as a no-op so the site root is never invalidated
/// by a blank form field.
fn normalize_slug(href_or_slug: Option<&str>) -> Option<&str> {
    let slug = href_or_slug?.trim_start_matches('/');
    (!slug.is_empty()).then_some(slug)
}

// ============================================================================
// Dispatch Operations
// ============================================================================

/// Invalidate a content page after a mutation.
///
/// Targets the `page:<region>:<slug>` tag and the public path derived
/// from the route table. No-op on a missing or empty href.
pub fn revalidate_content_page(cache: &dyn PageCache, href_or_slug: Option<&str>, region: Region) {
    let Some(slug) = normalize_slug(href_or_slug) else {
        return;
    };

    cache.invalidate_tag(&content_tag(region, slug));
    cache.invalidate_path(&routes::content_path(region, slug));
}

/// Invalidate a blog detail page after a mutation.
///
/// The India detail prefix is `/blogs` while the US one is `/us/blog`;
/// the derivation goes through the route table so the two stay exact.
pub fn revalidate_blog_page(cache: &dyn PageCache, slug_or_id: Option<&str>, region: Region) {
    let Some(slug) = normalize_slug(slug_or_id) else {
        return;
    };

    cache.invalidate_tag(&blog_tag(region, slug));
    cache.invalidate_path(&routes::blog_path(region, slug));
}

/// Invalidate the region's blog index only.
///
/// Used when a category/author change affects listing display but the
/// detail page path is unaffected.
pub fn revalidate_blog_listing(cache: &dyn PageCache, region: Region) {
    cache.invalidate_path(routes::blog_listing_path(region));
}

/// Invalidate the region's navigation.
///
/// Navigation is cached separately from content because it changes far
/// less often and is read on every page render; every rendered page also
/// carries the navbar tag, so this refreshes those pages too.
pub fn revalidate_navbar_items(cache: &dyn PageCache, region: Region) {
    cache.invalidate_tag(&navbar_tag(region));
}

/// Invalidate the sitemap after any path-affecting mutation.
pub fn revalidate_sitemap(cache: &dyn PageCache) {
    cache.invalidate_tag(SITEMAP_TAG);
}

/// Invalidate the region's blog feed after a blog mutation.
pub fn revalidate_blog_feed(cache: &dyn PageCache, region: Region) {
    cache.invalidate_tag(&feed_tag(region));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedPage;
    use parking_lot::Mutex;

    /// Records every invalidation call for assertion.
    #[derive(Default)]
    struct RecordingCache {
        tags: Mutex<Vec<String>>,
        paths: Mutex<Vec<String>>,
    }

    impl RecordingCache {
        fn tags(&self) -> Vec<String> {
            self.tags.lock().clone()
        }
        fn paths(&self) -> Vec<String> {
            self.paths.lock().clone()
        }
        fn total_calls(&self) -> usize {
            self.tags.lock().len() + self.paths.lock().len()
        }
    }

    impl PageCache for RecordingCache {
        fn get(&self, _key: &str) -> Option<CachedPage> {
            None
        }
        fn set(&self, _key: &str, _page: CachedPage, _tags: &[String]) {}
        fn invalidate_tag(&self, tag: &str) {
            self.tags.lock().push(tag.to_string());
        }
        fn invalidate_path(&self, path: &str) {
            self.paths.lock().push(path.to_string());
        }
    }

    #[test]
    fn test_content_page_india_path() {
        let cache = RecordingCache::default();
        revalidate_content_page(&cache, Some("gst-registration"), Region::India);

        assert_eq!(cache.tags(), vec!["page:india:gst-registration"]);
        assert_eq!(cache.paths(), vec!["/gst-registration"]);
    }

    #[test]
    fn test_content_page_us_path() {
        let cache = RecordingCache::default();
        revalidate_content_page(&cache, Some("gst-registration"), Region::Us);

        assert_eq!(cache.tags(), vec!["page:us:gst-registration"]);
        assert_eq!(cache.paths(), vec!["/us/gst-registration"]);
    }

    #[test]
    fn test_leading_slashes_stripped() {
        let cache = RecordingCache::default();
        revalidate_content_page(&cache, Some("/gst-registration"), Region::India);
        revalidate_content_page(&cache, Some("//gst-registration"), Region::India);

        // Idempotent under repeated leading-slash stripping.
        assert_eq!(
            cache.paths(),
            vec!["/gst-registration", "/gst-registration"]
        );
    }

    #[test]
    fn test_empty_input_is_noop() {
        let cache = RecordingCache::default();
        revalidate_content_page(&cache, None, Region::India);
        revalidate_content_page(&cache, Some(""), Region::India);
        revalidate_content_page(&cache, Some("/"), Region::Us);
        revalidate_blog_page(&cache, None, Region::India);
        revalidate_blog_page(&cache, Some("///"), Region::Us);

        assert_eq!(cache.total_calls(), 0, "empty input must not invalidate anything");
    }

    #[test]
    fn test_blog_page_exact_prefixes() {
        let cache = RecordingCache::default();
        revalidate_blog_page(&cache, Some("my-post"), Region::India);
        assert_eq!(cache.paths(), vec!["/blogs/my-post"]);

        let cache = RecordingCache::default();
        revalidate_blog_page(&cache, Some("my-post"), Region::Us);
        assert_eq!(cache.paths(), vec!["/us/blog/my-post"]);
        assert_eq!(cache.tags(), vec!["blog:us:my-post"]);
    }

    #[test]
    fn test_blog_listing_targets_index_only() {
        let cache = RecordingCache::default();
        revalidate_blog_listing(&cache, Region::India);
        revalidate_blog_listing(&cache, Region::Us);

        assert_eq!(cache.paths(), vec!["/blogs", "/us/blog"]);
        assert!(cache.tags().is_empty());
    }

    #[test]
    fn test_navbar_tag_scoped_to_region() {
        let cache = RecordingCache::default();
        revalidate_navbar_items(&cache, Region::India);
        revalidate_navbar_items(&cache, Region::Us);

        assert_eq!(cache.tags(), vec!["navbar:india", "navbar:us"]);
        assert!(cache.paths().is_empty());
    }

    #[test]
    fn test_sitemap_and_feed() {
        let cache = RecordingCache::default();
        revalidate_sitemap(&cache);
        revalidate_blog_feed(&cache, Region::Us);

        assert_eq!(cache.tags(), vec!["sitemap", "feed:us"]);
    }
}
