//! Admin API: bearer-authenticated JSON CRUD over the content store.
//!
//! Every mutation follows the same shape: parse payload, write the
//! store, persist, then hand the change to the revalidation dispatcher
//! so exactly the affected cache entries go stale. Delete handlers look
//! up the entity's href *before* removal so the vanished path is still
//! invalidated.
//!
//! Endpoints (under `/admin/api`):
//!
//! | Method | Path                | Action                    |
//! |--------|---------------------|---------------------------|
//! | POST   | `/pages`            | create content page       |
//! | PUT    | `/pages/<id>`       | patch content page        |
//! | DELETE | `/pages/<id>`       | delete content page       |
//! | POST   | `/blogs`            | create blog post          |
//! | PUT    | `/blogs/<id>`       | patch blog post           |
//! | DELETE | `/blogs/<id>`       | delete blog post          |
//! | POST   | `/nav`              | create nav item           |
//! | PUT    | `/nav/<id>`         | patch nav item            |
//! | DELETE | `/nav/<id>`         | delete nav item           |
//! | POST   | `/heroes`           | create/replace hero       |
//! | DELETE | `/heroes/<id>`      | delete hero               |
//! | POST   | `/faqs`             | create faq                |
//! | DELETE | `/faqs/<id>`        | delete faq                |
//! | PUT    | `/meta/<kind>/<id>` | set metadata block        |
//! | DELETE | `/meta/<kind>/<id>` | remove metadata block     |

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::Read;
use thiserror::Error;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::config::SiteConfig;
use crate::content::{
    BlogPost, ContentPage, Faq, Hero, MetaKind, MetaRecord, NavItem, PageKind, Region, Status,
    StoreError, slug::slugify,
};
use crate::log;
use crate::revalidate::{
    revalidate_blog_feed, revalidate_blog_listing, revalidate_blog_page, revalidate_content_page,
    revalidate_navbar_items, revalidate_sitemap,
};
use crate::server::AppState;

// ============================================================================
// Errors
// ============================================================================

/// Admin API errors, mapped to HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("unknown admin endpoint")]
    UnknownEndpoint,

    #[error("no such entity: {0}")]
    UnknownId(String),

    #[error("invalid payload: {0}")]
    BadRequest(String),

    #[error("content store failure")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized => 401,
            ApiError::UnknownEndpoint | ApiError::UnknownId(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Store(_) => 500,
        }
    }
}

// ============================================================================
// Request Entry
// ============================================================================

/// Handle an admin API request end to end.
pub fn handle(mut request: Request, config: &SiteConfig, state: &AppState) -> Result<()> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body).ok();

    let method = request.method().as_str().to_string();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(&url).to_string();

    let outcome = if authorized(&request, config) {
        dispatch(state, &method, &path, &body)
    } else {
        Err(ApiError::Unauthorized)
    };

    let (status, payload) = match outcome {
        Ok(value) => (200, value),
        Err(err) => {
            log!("admin"; "{method} {path}: {err}");
            (err.status_code(), json!({ "ok": false, "error": err.to_string() }))
        }
    };

    let response = Response::from_string(payload.to_string())
        .with_status_code(StatusCode(status))
        .with_header(Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Bearer-token check. An empty configured token disables the API.
fn authorized(request: &Request, config: &SiteConfig) -> bool {
    let token = &config.server.admin_token;
    if token.is_empty() {
        return false;
    }

    let expected = format!("Bearer {token}");
    request
        .headers()
        .iter()
        .any(|h| h.field.equiv("Authorization") && h.value.as_str() == expected)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Route an authenticated admin call to its handler.
pub fn dispatch(state: &AppState, method: &str, path: &str, body: &str) -> Result<Value, ApiError> {
    let rest = path
        .strip_prefix("/admin/api/")
        .ok_or(ApiError::UnknownEndpoint)?;
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("POST", ["pages"]) => create_page(state, body),
        ("PUT", ["pages", id]) => update_page(state, id, body),
        ("DELETE", ["pages", id]) => delete_page(state, id),

        ("POST", ["blogs"]) => create_blog(state, body),
        ("PUT", ["blogs", id]) => update_blog(state, id, body),
        ("DELETE", ["blogs", id]) => delete_blog(state, id),

        ("POST", ["nav"]) => create_nav_item(state, body),
        ("PUT", ["nav", id]) => update_nav_item(state, id, body),
        ("DELETE", ["nav", id]) => delete_nav_item(state, id),

        ("POST", ["heroes"]) => create_hero(state, body),
        ("DELETE", ["heroes", id]) => delete_hero(state, id),

        ("POST", ["faqs"]) => create_faq(state, body),
        ("DELETE", ["faqs", id]) => delete_faq(state, id),

        ("PUT", ["meta", kind, id]) => set_meta(state, kind, id, body),
        ("DELETE", ["meta", kind, id]) => delete_meta(state, kind, id),

        _ => Err(ApiError::UnknownEndpoint),
    }
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Normalize an admin-entered href to a bare slug.
fn clean_href(href: &str) -> String {
    href.trim().trim_start_matches('/').to_string()
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Deserialize)]
struct PagePayload {
    region: Region,
    label: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    body_html: String,
    #[serde(default)]
    kind: Option<PageKind>,
    #[serde(default)]
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct PagePatch {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    kind: Option<PageKind>,
    #[serde(default)]
    status: Option<Status>,
}

fn create_page(state: &AppState, body: &str) -> Result<Value, ApiError> {
    let payload: PagePayload = parse(body)?;

    let href = payload
        .href
        .as_deref()
        .map(clean_href)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| slugify(&payload.label));
    if href.is_empty() {
        return Err(ApiError::BadRequest("href or label required".into()));
    }

    let page = ContentPage {
        id: state.store.allocate_id(),
        region: payload.region,
        href: href.clone(),
        label: payload.label,
        body_html: payload.body_html,
        kind: payload.kind.unwrap_or(PageKind::Generic),
        status: payload.status.unwrap_or(Status::Draft),
        updated_at: Utc::now(),
    };
    let id = page.id.clone();
    let region = page.region;

    state.store.upsert_page(page);
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&href), region);
    revalidate_sitemap(&state.cache);

    Ok(json!({ "ok": true, "id": id, "href": href }))
}

fn update_page(state: &AppState, id: &str, body: &str) -> Result<Value, ApiError> {
    let patch: PagePatch = parse(body)?;
    let mut page = state
        .store
        .page(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    let old_href = page.href.clone();

    if let Some(label) = patch.label {
        page.label = label;
    }
    if let Some(href) = patch.href {
        let href = clean_href(&href);
        if !href.is_empty() {
            page.href = href;
        }
    }
    if let Some(body_html) = patch.body_html {
        page.body_html = body_html;
    }
    if let Some(kind) = patch.kind {
        page.kind = kind;
    }
    if let Some(status) = patch.status {
        page.status = status;
    }
    page.updated_at = Utc::now();

    let region = page.region;
    let new_href = page.href.clone();

    state.store.upsert_page(page);
    state.store.persist()?;

    // The old path goes stale too when the slug moved.
    revalidate_content_page(&state.cache, Some(&old_href), region);
    if new_href != old_href {
        revalidate_content_page(&state.cache, Some(&new_href), region);
    }
    revalidate_sitemap(&state.cache);

    Ok(json!({ "ok": true, "id": id, "href": new_href }))
}

fn delete_page(state: &AppState, id: &str) -> Result<Value, ApiError> {
    // Capture the href before removal; afterwards nothing knows the path.
    let page = state
        .store
        .page(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;

    state.store.remove_page(id);
    state.store.remove_meta(MetaKind::Page, id);
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&page.href), page.region);
    revalidate_sitemap(&state.cache);

    Ok(json!({ "ok": true, "id": id }))
}

// ============================================================================
// Blogs
// ============================================================================

#[derive(Debug, Deserialize)]
struct BlogPayload {
    region: Region,
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    body_html: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct BlogPatch {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    status: Option<Status>,
}

impl BlogPatch {
    /// Category/author edits change listing display only; the detail
    /// page path and body are untouched.
    fn listing_only(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.excerpt.is_none()
            && self.body_html.is_none()
            && self.status.is_none()
            && (self.category.is_some() || self.author.is_some())
    }
}

fn create_blog(state: &AppState, body: &str) -> Result<Value, ApiError> {
    let payload: BlogPayload = parse(body)?;

    let slug = payload
        .slug
        .as_deref()
        .map(clean_href)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(&payload.title));
    if slug.is_empty() {
        return Err(ApiError::BadRequest("slug or title required".into()));
    }

    let now = Utc::now();
    let blog = BlogPost {
        id: state.store.allocate_id(),
        region: payload.region,
        slug: slug.clone(),
        title: payload.title,
        excerpt: payload.excerpt,
        body_html: payload.body_html,
        category: payload.category,
        author: payload.author,
        status: payload.status.unwrap_or(Status::Draft),
        published_at: now,
        updated_at: now,
    };
    let id = blog.id.clone();
    let region = blog.region;

    state.store.upsert_blog(blog);
    state.store.persist()?;

    revalidate_blog_page(&state.cache, Some(&slug), region);
    revalidate_blog_listing(&state.cache, region);
    revalidate_blog_feed(&state.cache, region);
    revalidate_sitemap(&state.cache);

    Ok(json!({ "ok": true, "id": id, "slug": slug }))
}

fn update_blog(state: &AppState, id: &str, body: &str) -> Result<Value, ApiError> {
    let patch: BlogPatch = parse(body)?;
    let mut blog = state
        .store
        .blog(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    let old_slug = blog.slug.clone();
    let listing_only = patch.listing_only();

    if let Some(title) = patch.title {
        blog.title = title;
    }
    if let Some(slug) = patch.slug {
        let slug = clean_href(&slug);
        if !slug.is_empty() {
            blog.slug = slug;
        }
    }
    if let Some(excerpt) = patch.excerpt {
        blog.excerpt = excerpt;
    }
    if let Some(body_html) = patch.body_html {
        blog.body_html = body_html;
    }
    if let Some(category) = patch.category {
        blog.category = Some(category);
    }
    if let Some(author) = patch.author {
        blog.author = Some(author);
    }
    if let Some(status) = patch.status {
        blog.status = status;
    }
    blog.updated_at = Utc::now();

    let region = blog.region;
    let new_slug = blog.slug.clone();

    state.store.upsert_blog(blog);
    state.store.persist()?;

    if !listing_only {
        revalidate_blog_page(&state.cache, Some(&old_slug), region);
        if new_slug != old_slug {
            revalidate_blog_page(&state.cache, Some(&new_slug), region);
        }
        revalidate_sitemap(&state.cache);
    }
    revalidate_blog_listing(&state.cache, region);
    revalidate_blog_feed(&state.cache, region);

    Ok(json!({ "ok": true, "id": id, "slug": new_slug }))
}

fn delete_blog(state: &AppState, id: &str) -> Result<Value, ApiError> {
    let blog = state
        .store
        .blog(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;

    state.store.remove_blog(id);
    state.store.remove_meta(MetaKind::Blog, id);
    state.store.persist()?;

    revalidate_blog_page(&state.cache, Some(&blog.slug), blog.region);
    revalidate_blog_listing(&state.cache, blog.region);
    revalidate_blog_feed(&state.cache, blog.region);
    revalidate_sitemap(&state.cache);

    Ok(json!({ "ok": true, "id": id }))
}

// ============================================================================
// Navigation
// ============================================================================

#[derive(Debug, Deserialize)]
struct NavPayload {
    region: Region,
    label: String,
    href: String,
    #[serde(default)]
    order: i32,
}

fn create_nav_item(state: &AppState, body: &str) -> Result<Value, ApiError> {
    let payload: NavPayload = parse(body)?;

    let item = NavItem {
        id: state.store.allocate_id(),
        region: payload.region,
        label: payload.label,
        href: payload.href,
        order: payload.order,
    };
    let id = item.id.clone();
    let region = item.region;

    state.store.upsert_nav_item(item);
    state.store.persist()?;

    revalidate_navbar_items(&state.cache, region);

    Ok(json!({ "ok": true, "id": id }))
}

fn update_nav_item(state: &AppState, id: &str, body: &str) -> Result<Value, ApiError> {
    let payload: NavPayload = parse(body)?;
    let existing = state
        .store
        .nav_item(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;

    let item = NavItem {
        id: existing.id,
        region: payload.region,
        label: payload.label,
        href: payload.href,
        order: payload.order,
    };
    let region = item.region;

    state.store.upsert_nav_item(item);
    state.store.persist()?;

    revalidate_navbar_items(&state.cache, region);
    if existing.region != region {
        revalidate_navbar_items(&state.cache, existing.region);
    }

    Ok(json!({ "ok": true, "id": id }))
}

fn delete_nav_item(state: &AppState, id: &str) -> Result<Value, ApiError> {
    let item = state
        .store
        .remove_nav_item(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    state.store.persist()?;

    revalidate_navbar_items(&state.cache, item.region);

    Ok(json!({ "ok": true, "id": id }))
}

// ============================================================================
// Heroes
// ============================================================================

#[derive(Debug, Deserialize)]
struct HeroPayload {
    region: Region,
    #[serde(default)]
    page_href: String,
    heading: String,
    #[serde(default)]
    subheading: String,
    #[serde(default)]
    cta_label: Option<String>,
    #[serde(default)]
    cta_href: Option<String>,
}

fn create_hero(state: &AppState, body: &str) -> Result<Value, ApiError> {
    let payload: HeroPayload = parse(body)?;
    let page_href = clean_href(&payload.page_href);

    // One hero per page: replace an existing attachment in place.
    let id = state
        .store
        .hero_for(payload.region, &page_href)
        .map_or_else(|| state.store.allocate_id(), |existing| existing.id);

    let hero = Hero {
        id: id.clone(),
        region: payload.region,
        page_href: page_href.clone(),
        heading: payload.heading,
        subheading: payload.subheading,
        cta_label: payload.cta_label,
        cta_href: payload.cta_href,
    };
    let region = hero.region;

    state.store.upsert_hero(hero);
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&page_href), region);

    Ok(json!({ "ok": true, "id": id }))
}

fn delete_hero(state: &AppState, id: &str) -> Result<Value, ApiError> {
    let hero = state
        .store
        .remove_hero(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&hero.page_href), hero.region);

    Ok(json!({ "ok": true, "id": id }))
}

// ============================================================================
// FAQs
// ============================================================================

#[derive(Debug, Deserialize)]
struct FaqPayload {
    region: Region,
    page_href: String,
    question: String,
    answer_html: String,
    #[serde(default)]
    order: i32,
}

fn create_faq(state: &AppState, body: &str) -> Result<Value, ApiError> {
    let payload: FaqPayload = parse(body)?;
    let page_href = clean_href(&payload.page_href);

    let faq = Faq {
        id: state.store.allocate_id(),
        region: payload.region,
        page_href: page_href.clone(),
        question: payload.question,
        answer_html: payload.answer_html,
        order: payload.order,
    };
    let id = faq.id.clone();
    let region = faq.region;

    state.store.upsert_faq(faq);
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&page_href), region);

    Ok(json!({ "ok": true, "id": id }))
}

fn delete_faq(state: &AppState, id: &str) -> Result<Value, ApiError> {
    let faq = state
        .store
        .remove_faq(id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    state.store.persist()?;

    revalidate_content_page(&state.cache, Some(&faq.page_href), faq.region);

    Ok(json!({ "ok": true, "id": id }))
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Deserialize)]
struct MetaPayload {
    meta_block: String,
}

fn set_meta(state: &AppState, kind: &str, id: &str, body: &str) -> Result<Value, ApiError> {
    let kind = MetaKind::parse(kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown meta kind: {kind}")))?;
    let payload: MetaPayload = parse(body)?;

    state.store.set_meta(MetaRecord {
        kind,
        page_id: id.to_string(),
        meta_block: payload.meta_block,
    });
    state.store.persist()?;

    revalidate_meta_owner(state, kind, id)?;

    Ok(json!({ "ok": true, "id": id }))
}

fn delete_meta(state: &AppState, kind: &str, id: &str) -> Result<Value, ApiError> {
    let kind = MetaKind::parse(kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown meta kind: {kind}")))?;

    state
        .store
        .remove_meta(kind, id)
        .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
    state.store.persist()?;

    revalidate_meta_owner(state, kind, id)?;

    Ok(json!({ "ok": true, "id": id }))
}

/// Invalidate the page that owns a metadata record.
fn revalidate_meta_owner(state: &AppState, kind: MetaKind, id: &str) -> Result<(), ApiError> {
    match kind {
        MetaKind::Page => {
            let page = state
                .store
                .page(id)
                .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
            revalidate_content_page(&state.cache, Some(&page.href), page.region);
        }
        MetaKind::Blog => {
            let blog = state
                .store
                .blog(id)
                .ok_or_else(|| ApiError::UnknownId(id.to_string()))?;
            revalidate_blog_page(&state.cache, Some(&blog.slug), blog.region);
        }
    }
    Ok(())
}
