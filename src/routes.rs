//! Public route table.
//!
//! The single source of truth for public paths. Both the request router
//! and the revalidation dispatcher derive paths from the functions here;
//! if the two ever disagree, invalidation silently misses, so there is
//! deliberately no second place where paths are spelled out.
//!
//! | Content kind | India path      | US path          |
//! |--------------|-----------------|------------------|
//! | Content page | `/<slug>`       | `/us/<slug>`     |
//! | Blog detail  | `/blogs/<slug>` | `/us/blog/<slug>`|
//! | Blog listing | `/blogs`        | `/us/blog`       |
//!
//! The India blog prefix (`/blogs`) and the US one (`/us/blog`) differ by
//! more than the region prefix; the two route trees grew independently
//! and stored links rely on both shapes.

use crate::content::Region;

// ============================================================================
// Path Derivation
// ============================================================================

/// Public path of a content page.
pub fn content_path(region: Region, slug: &str) -> String {
    match region {
        Region::India => format!("/{slug}"),
        Region::Us => format!("/us/{slug}"),
    }
}

/// Public path of a blog detail page.
pub fn blog_path(region: Region, slug: &str) -> String {
    match region {
        Region::India => format!("/blogs/{slug}"),
        Region::Us => format!("/us/blog/{slug}"),
    }
}

/// Public path of the blog index page.
pub const fn blog_listing_path(region: Region) -> &'static str {
    match region {
        Region::India => "/blogs",
        Region::Us => "/us/blog",
    }
}

/// Public path of the region landing page.
pub const fn home_path(region: Region) -> &'static str {
    match region {
        Region::India => "/",
        Region::Us => "/us",
    }
}

/// Public path of the region blog feed.
pub const fn feed_path(region: Region) -> &'static str {
    match region {
        Region::India => "/feed.xml",
        Region::Us => "/us/feed.xml",
    }
}

// ============================================================================
// Route Resolution
// ============================================================================

/// A resolved public route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home(Region),
    Content { region: Region, slug: String },
    BlogListing(Region),
    BlogDetail { region: Region, slug: String },
    Sitemap,
    Feed(Region),
}

/// Resolve a decoded request path (query already stripped) to a route.
///
/// Returns `None` for paths outside the route table; the server turns
/// that into a 404.
pub fn resolve(path: &str) -> Option<Route> {
    let path = normalize(path);

    match path.as_str() {
        "/" => return Some(Route::Home(Region::India)),
        "/us" => return Some(Route::Home(Region::Us)),
        "/sitemap.xml" => return Some(Route::Sitemap),
        "/feed.xml" => return Some(Route::Feed(Region::India)),
        "/us/feed.xml" => return Some(Route::Feed(Region::Us)),
        "/blogs" => return Some(Route::BlogListing(Region::India)),
        "/us/blog" => return Some(Route::BlogListing(Region::Us)),
        _ => {}
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        ["blogs", slug] => Some(Route::BlogDetail {
            region: Region::India,
            slug: (*slug).to_string(),
        }),
        ["us", "blog", slug] => Some(Route::BlogDetail {
            region: Region::Us,
            slug: (*slug).to_string(),
        }),
        ["us", slug] => Some(Route::Content {
            region: Region::Us,
            slug: (*slug).to_string(),
        }),
        [slug] => Some(Route::Content {
            region: Region::India,
            slug: (*slug).to_string(),
        }),
        _ => None,
    }
}

/// Collapse trailing slashes and guarantee a leading one.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_path_per_region() {
        assert_eq!(content_path(Region::India, "gst-registration"), "/gst-registration");
        assert_eq!(content_path(Region::Us, "gst-registration"), "/us/gst-registration");
    }

    #[test]
    fn test_blog_path_prefix_asymmetry() {
        // India uses /blogs, US uses /us/blog. Both exact.
        assert_eq!(blog_path(Region::India, "my-post"), "/blogs/my-post");
        assert_eq!(blog_path(Region::Us, "my-post"), "/us/blog/my-post");
        assert_eq!(blog_listing_path(Region::India), "/blogs");
        assert_eq!(blog_listing_path(Region::Us), "/us/blog");
    }

    #[test]
    fn test_resolve_round_trips_content_paths() {
        for region in Region::ALL {
            let path = content_path(region, "trademark-filing");
            assert_eq!(
                resolve(&path),
                Some(Route::Content {
                    region,
                    slug: "trademark-filing".to_string()
                }),
                "router/dispatcher parity broken for {region}"
            );
        }
    }

    #[test]
    fn test_resolve_round_trips_blog_paths() {
        for region in Region::ALL {
            let path = blog_path(region, "my-post");
            assert_eq!(
                resolve(&path),
                Some(Route::BlogDetail {
                    region,
                    slug: "my-post".to_string()
                }),
                "router/dispatcher parity broken for {region}"
            );
            assert_eq!(
                resolve(blog_listing_path(region)),
                Some(Route::BlogListing(region))
            );
        }
    }

    #[test]
    fn test_resolve_home_and_wellknown() {
        assert_eq!(resolve("/"), Some(Route::Home(Region::India)));
        assert_eq!(resolve("/us"), Some(Route::Home(Region::Us)));
        assert_eq!(resolve("/sitemap.xml"), Some(Route::Sitemap));
        assert_eq!(resolve("/feed.xml"), Some(Route::Feed(Region::India)));
        assert_eq!(resolve("/us/feed.xml"), Some(Route::Feed(Region::Us)));
    }

    #[test]
    fn test_resolve_trailing_slash() {
        assert_eq!(
            resolve("/blogs/my-post/"),
            Some(Route::BlogDetail {
                region: Region::India,
                slug: "my-post".to_string()
            })
        );
        assert_eq!(resolve("/us/"), Some(Route::Home(Region::Us)));
    }

    #[test]
    fn test_resolve_unknown_depth() {
        assert_eq!(resolve("/a/b/c"), None);
        assert_eq!(resolve("/us/blog/a/b"), None);
    }
}
