//! JSON-backed content store.
//!
//! Holds every content collection behind a single `RwLock`, with explicit
//! `persist` after admin mutations. The store is the write-side source of
//! truth; rendered output is owned by the page cache and regenerated on
//! demand after invalidation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{BlogPost, ContentPage, Faq, Hero, MetaKind, MetaRecord, NavItem, Region};

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on content store `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Content store parsing error")]
    Json(#[from] serde_json::Error),
}

/// Compare two publish dates for sorting (newest first).
///
/// Items with the same date are sorted by title.
fn compare_newest_first(
    a_date: &DateTime<Utc>,
    b_date: &DateTime<Utc>,
    a_title: &str,
    b_title: &str,
) -> std::cmp::Ordering {
    b_date.cmp(a_date).then_with(|| a_title.cmp(b_title))
}

// ============================================================================
// Store Data
// ============================================================================

/// Serialized shape of the content store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    /// Monotonic id source for every collection.
    #[serde(default)]
    next_id: u64,

    #[serde(default)]
    pages: BTreeMap<String, ContentPage>,

    #[serde(default)]
    blogs: BTreeMap<String, BlogPost>,

    #[serde(default)]
    nav_items: BTreeMap<String, NavItem>,

    #[serde(default)]
    heroes: BTreeMap<String, Hero>,

    #[serde(default)]
    faqs: BTreeMap<String, Faq>,

    /// Keyed by `MetaRecord::key`.
    #[serde(default)]
    meta: BTreeMap<String, MetaRecord>,
}

// ============================================================================
// Content Store
// ============================================================================

/// Thread-safe content storage with JSON file persistence.
///
/// # Thread Safety
///
/// Uses `RwLock` to allow concurrent reads from the request loop while
/// admin mutations take exclusive writes.
#[derive(Debug, Default)]
pub struct ContentStore {
    path: Option<PathBuf>,
    inner: RwLock<StoreData>,
}

impl ContentStore {
    /// Open a store from a JSON file, creating an empty one if the file
    /// does not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let content =
                fs::read_to_string(path).map_err(|e| StoreError::Io(path.to_path_buf(), e))?;
            serde_json::from_str(&content)?
        } else {
            StoreData::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            inner: RwLock::new(data),
        })
    }

    /// In-memory store without persistence.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Write the store back to disk. No-op for in-memory stores.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*self.inner.read())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(path.clone(), e))?;
        }
        fs::write(path, json).map_err(|e| StoreError::Io(path.clone(), e))
    }

    /// Allocate an opaque entity id.
    pub fn allocate_id(&self) -> String {
        let mut data = self.inner.write();
        data.next_id += 1;
        data.next_id.to_string()
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub fn upsert_page(&self, page: ContentPage) {
        self.inner.write().pages.insert(page.id.clone(), page);
    }

    pub fn page(&self, id: &str) -> Option<ContentPage> {
        self.inner.read().pages.get(id).cloned()
    }

    pub fn remove_page(&self, id: &str) -> Option<ContentPage> {
        self.inner.write().pages.remove(id)
    }

    /// Look up a published page by `(region, href)`.
    pub fn find_page(&self, region: Region, href: &str) -> Option<ContentPage> {
        self.inner
            .read()
            .pages
            .values()
            .find(|p| p.region == region && p.href == href && p.status.is_published())
            .cloned()
    }

    /// All published pages of a region, sorted by label.
    pub fn published_pages(&self, region: Region) -> Vec<ContentPage> {
        let data = self.inner.read();
        let mut pages: Vec<_> = data
            .pages
            .values()
            .filter(|p| p.region == region && p.status.is_published())
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.label.cmp(&b.label));
        pages
    }

    // ------------------------------------------------------------------
    // Blogs
    // ------------------------------------------------------------------

    pub fn upsert_blog(&self, blog: BlogPost) {
        self.inner.write().blogs.insert(blog.id.clone(), blog);
    }

    pub fn blog(&self, id: &str) -> Option<BlogPost> {
        self.inner.read().blogs.get(id).cloned()
    }

    pub fn remove_blog(&self, id: &str) -> Option<BlogPost> {
        self.inner.write().blogs.remove(id)
    }

    /// Look up a published blog post by `(region, slug)`.
    pub fn find_blog(&self, region: Region, slug: &str) -> Option<BlogPost> {
        self.inner
            .read()
            .blogs
            .values()
            .find(|b| b.region == region && b.slug == slug && b.status.is_published())
            .cloned()
    }

    /// All published blogs of a region, newest first.
    pub fn published_blogs(&self, region: Region) -> Vec<BlogPost> {
        let data = self.inner.read();
        let mut blogs: Vec<_> = data
            .blogs
            .values()
            .filter(|b| b.region == region && b.status.is_published())
            .cloned()
            .collect();
        blogs.sort_by(|a, b| compare_newest_first(&a.published_at, &b.published_at, &a.title, &b.title));
        blogs
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn upsert_nav_item(&self, item: NavItem) {
        self.inner.write().nav_items.insert(item.id.clone(), item);
    }

    pub fn nav_item(&self, id: &str) -> Option<NavItem> {
        self.inner.read().nav_items.get(id).cloned()
    }

    pub fn remove_nav_item(&self, id: &str) -> Option<NavItem> {
        self.inner.write().nav_items.remove(id)
    }

    /// Nav items of a region in display order.
    pub fn nav_items(&self, region: Region) -> Vec<NavItem> {
        let data = self.inner.read();
        let mut items: Vec<_> = data
            .nav_items
            .values()
            .filter(|n| n.region == region)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.label.cmp(&b.label)));
        items
    }

    // ------------------------------------------------------------------
    // Heroes
    // ------------------------------------------------------------------

    pub fn upsert_hero(&self, hero: Hero) {
        self.inner.write().heroes.insert(hero.id.clone(), hero);
    }

    pub fn remove_hero(&self, id: &str) -> Option<Hero> {
        self.inner.write().heroes.remove(id)
    }

    /// Hero section for `(region, page href)`, if any.
    pub fn hero_for(&self, region: Region, page_href: &str) -> Option<Hero> {
        self.inner
            .read()
            .heroes
            .values()
            .find(|h| h.region == region && h.page_href == page_href)
            .cloned()
    }

    // ------------------------------------------------------------------
    // FAQs
    // ------------------------------------------------------------------

    pub fn upsert_faq(&self, faq: Faq) {
        self.inner.write().faqs.insert(faq.id.clone(), faq);
    }

    pub fn remove_faq(&self, id: &str) -> Option<Faq> {
        self.inner.write().faqs.remove(id)
    }

    /// FAQ entries for `(region, page href)` in display order.
    pub fn faqs_for(&self, region: Region, page_href: &str) -> Vec<Faq> {
        let data = self.inner.read();
        let mut faqs: Vec<_> = data
            .faqs
            .values()
            .filter(|f| f.region == region && f.page_href == page_href)
            .cloned()
            .collect();
        faqs.sort_by(|a, b| a.order.cmp(&b.order));
        faqs
    }

    // ------------------------------------------------------------------
    // Metadata records
    // ------------------------------------------------------------------

    pub fn set_meta(&self, record: MetaRecord) {
        let key = MetaRecord::key(record.kind, &record.page_id);
        self.inner.write().meta.insert(key, record);
    }

    pub fn meta_for(&self, kind: MetaKind, page_id: &str) -> Option<MetaRecord> {
        self.inner
            .read()
            .meta
            .get(&MetaRecord::key(kind, page_id))
            .cloned()
    }

    pub fn remove_meta(&self, kind: MetaKind, page_id: &str) -> Option<MetaRecord> {
        self.inner
            .write()
            .meta
            .remove(&MetaRecord::key(kind, page_id))
    }

    /// Check if the store has any data.
    pub fn is_empty(&self) -> bool {
        let data = self.inner.read();
        data.pages.is_empty() && data.blogs.is_empty() && data.nav_items.is_empty()
    }
}
