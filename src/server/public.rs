//! Public request handling.
//!
//! Cache-first: a fresh cache entry is served directly (with 304 on a
//! matching `If-None-Match`); a miss renders from the content store,
//! fills the cache with the route's tags, and serves the result.

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::cache::{CachedPage, PageCache};
use crate::config::SiteConfig;
use crate::generator::{build_feed, build_sitemap};
use crate::render::{
    MinifyType, minify, render_blog_listing, render_blog_page, render_content_page, render_home,
    render_navbar, render_not_found,
};
use crate::revalidate::{SITEMAP_TAG, blog_tag, content_tag, feed_tag, navbar_tag};
use crate::routes::{self, Route};
use crate::server::AppState;

const HTML_TYPE: &str = "text/html; charset=utf-8";
const XML_TYPE: &str = "application/xml; charset=utf-8";

/// Handle a public GET request.
pub fn handle(request: Request, config: &SiteConfig, state: &AppState) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string (e.g., ?t=123456) before resolving the route
    let path = url_path.split('?').next().unwrap_or(&url_path);

    let page = match routes::resolve(path) {
        Some(route) => respond_route(config, state, &route)?,
        None => None,
    };

    match page {
        Some(page) => serve_page(request, &page),
        None => serve_not_found(request, config),
    }
}

/// Resolve a route to a response body, cache-first.
///
/// Returns `None` when the route exists but the entity does not (draft,
/// archived, or never created): the caller serves a 404.
pub fn respond_route(
    config: &SiteConfig,
    state: &AppState,
    route: &Route,
) -> Result<Option<CachedPage>> {
    let cache_enabled = config.cache.enable;
    let path = route_cache_key(route);

    if cache_enabled
        && let Some(page) = state.cache.get(&path)
    {
        return Ok(Some(page));
    }

    let Some((page, tags)) = render_route(config, state, route)? else {
        return Ok(None);
    };

    if cache_enabled {
        state.cache.set(&path, page.clone(), &tags);
    }
    Ok(Some(page))
}

/// The cache key of a route is its public path.
fn route_cache_key(route: &Route) -> String {
    match route {
        Route::Home(region) => routes::home_path(*region).to_string(),
        Route::Content { region, slug } => routes::content_path(*region, slug),
        Route::BlogListing(region) => routes::blog_listing_path(*region).to_string(),
        Route::BlogDetail { region, slug } => routes::blog_path(*region, slug),
        Route::Sitemap => "/sitemap.xml".to_string(),
        Route::Feed(region) => routes::feed_path(*region).to_string(),
    }
}

/// Render a route and compute the tags its cache entry carries.
fn render_route(
    config: &SiteConfig,
    state: &AppState,
    route: &Route,
) -> Result<Option<(CachedPage, Vec<String>)>> {
    let store = &state.store;

    let rendered = match route {
        Route::Home(region) => {
            let nav = nav_fragment(config, state, *region)?;
            let body = render_home(config, store, *region, &nav)?;
            Some((
                CachedPage::new(body, HTML_TYPE),
                vec![navbar_tag(*region)],
            ))
        }
        Route::Content { region, slug } => store
            .find_page(*region, slug)
            .map(|page| -> Result<_> {
                let nav = nav_fragment(config, state, *region)?;
                let body = render_content_page(config, store, &page, &nav)?;
                Ok((
                    CachedPage::new(body, HTML_TYPE),
                    vec![content_tag(*region, slug), navbar_tag(*region)],
                ))
            })
            .transpose()?,
        Route::BlogListing(region) => {
            let nav = nav_fragment(config, state, *region)?;
            let body = render_blog_listing(config, store, *region, &nav)?;
            Some((
                CachedPage::new(body, HTML_TYPE),
                vec![navbar_tag(*region)],
            ))
        }
        Route::BlogDetail { region, slug } => store
            .find_blog(*region, slug)
            .map(|blog| -> Result<_> {
                let nav = nav_fragment(config, state, *region)?;
                let body = render_blog_page(config, store, &blog, &nav)?;
                Ok((
                    CachedPage::new(body, HTML_TYPE),
                    vec![blog_tag(*region, slug), navbar_tag(*region)],
                ))
            })
            .transpose()?,
        Route::Sitemap => {
            if !config.seo.sitemap {
                return Ok(None);
            }
            let xml = build_sitemap(config, store);
            let xml = minify(MinifyType::Xml(xml.as_bytes()), config).into_owned();
            Some((
                CachedPage::new(xml, XML_TYPE),
                vec![SITEMAP_TAG.to_string()],
            ))
        }
        Route::Feed(region) => {
            if !config.seo.rss {
                return Ok(None);
            }
            let xml = build_feed(config, store, *region)?;
            let xml = minify(MinifyType::Xml(xml.as_bytes()), config).into_owned();
            Some((CachedPage::new(xml, XML_TYPE), vec![feed_tag(*region)]))
        }
    };

    Ok(rendered)
}

/// Fetch the region's navbar fragment, cache-first under its navbar tag.
fn nav_fragment(config: &SiteConfig, state: &AppState, region: crate::content::Region) -> Result<String> {
    let key = navbar_tag(region);

    if config.cache.enable
        && let Some(cached) = state.cache.get(&key)
    {
        return Ok(String::from_utf8_lossy(&cached.body).into_owned());
    }

    let nav = render_navbar(&state.store, region)?;
    if config.cache.enable {
        state.cache.set(
            &key,
            CachedPage::new(nav.clone().into_bytes(), HTML_TYPE),
            std::slice::from_ref(&key),
        );
    }
    Ok(nav)
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a rendered page, honoring `If-None-Match`.
fn serve_page(request: Request, page: &CachedPage) -> Result<()> {
    let if_none_match = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("If-None-Match"))
        .map(|h| h.value.as_str().to_string());

    if if_none_match.as_deref() == Some(page.etag.as_str()) {
        let response = Response::empty(StatusCode(304))
            .with_header(Header::from_bytes("ETag", page.etag.as_str()).unwrap());
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::from_data(page.body.clone())
        .with_header(Header::from_bytes("Content-Type", page.content_type.as_str()).unwrap())
        .with_header(Header::from_bytes("ETag", page.etag.as_str()).unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve the rendered 404 page.
fn serve_not_found(request: Request, config: &SiteConfig) -> Result<()> {
    let body = render_not_found(config)?;
    let response = Response::from_data(body)
        .with_status_code(StatusCode(404))
        .with_header(Header::from_bytes("Content-Type", HTML_TYPE).unwrap());
    request.respond(response)?;
    Ok(())
}
