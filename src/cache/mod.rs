//! Tag-aware rendered page cache.
//!
//! An explicit key-value store injected into handlers instead of an
//! implicit framework cache, so invalidation is testable without a
//! running server. Entries are keyed by public path (or a fragment key
//! such as `navbar:india`), carry a set of tags, and expire lazily after
//! the configured TTL.
//!
//! Invalidation is idempotent: marking an entry stale twice is the same
//! as once, so concurrent admin writers need no coordination. A read
//! racing an invalidation may still observe the old entry; staleness at
//! that granularity is accepted.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

// ============================================================================
// Cached Entries
// ============================================================================

/// A rendered response body with its content type and etag.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Vec<u8>,
    pub content_type: String,
    pub etag: String,
}

impl CachedPage {
    /// Build an entry from a rendered body, computing its etag.
    pub fn new(body: Vec<u8>, content_type: &str) -> Self {
        let etag = etag_for(&body);
        Self {
            body,
            content_type: content_type.to_string(),
            etag,
        }
    }
}

/// Content-derived etag: first half of the blake3 hash, quoted.
pub fn etag_for(body: &[u8]) -> String {
    let hash = blake3::hash(body);
    format!("\"{}\"", hex::encode(&hash.as_bytes()[..16]))
}

#[derive(Debug)]
struct Entry {
    page: CachedPage,
    tags: Vec<String>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

// ============================================================================
// Page Cache Interface
// ============================================================================

/// Cache store primitive consumed by the renderer and the revalidation
/// dispatcher.
///
/// `invalidate_*` calls have at-least-once semantics with eventual
/// visibility; no ordering guarantee is assumed or required.
pub trait PageCache: Send + Sync {
    /// Look up a fresh entry by key.
    fn get(&self, key: &str) -> Option<CachedPage>;

    /// Store an entry under `key`, labelled with `tags`.
    fn set(&self, key: &str, page: CachedPage, tags: &[String]);

    /// Drop every entry labelled with `tag`.
    fn invalidate_tag(&self, tag: &str);

    /// Drop the entry cached under `path`.
    fn invalidate_path(&self, path: &str);
}

// ============================================================================
// In-memory Implementation
// ============================================================================

/// In-process cache over a `RwLock`-guarded map.
#[derive(Debug, Default)]
pub struct MemoryPageCache {
    entries: RwLock<FxHashMap<String, Entry>>,
    ttl: Option<Duration>,
}

impl MemoryPageCache {
    /// Create a cache whose entries expire after `ttl`.
    /// `None` means entries live until invalidated.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl,
        }
    }

    /// Number of live entries, expired ones included until their lazy
    /// removal.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.read().len() == 0
    }
}

/// Path keys ignore trailing slashes so `/page/` and `/page` share an
/// entry. Fragment keys (no leading slash) pass through untouched.
fn normalize_key(key: &str) -> String {
    if !key.starts_with('/') {
        return key.to_string();
    }
    let trimmed = key.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, key: &str) -> Option<CachedPage> {
        let key = normalize_key(key);

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if !entry.is_expired() => return Some(entry.page.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict under a write lock, re-checking after upgrade.
        let mut entries = self.entries.write();
        if entries.get(&key).is_some_and(Entry::is_expired) {
            entries.remove(&key);
        }
        None
    }

    fn set(&self, key: &str, page: CachedPage, tags: &[String]) {
        let entry = Entry {
            page,
            tags: tags.to_vec(),
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().insert(normalize_key(key), entry);
    }

    fn invalidate_tag(&self, tag: &str) {
        self.entries
            .write()
            .retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
    }

    fn invalidate_path(&self, path: &str) {
        self.entries.write().remove(&normalize_key(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(body: &str) -> CachedPage {
        CachedPage::new(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_set_and_get() {
        let cache = MemoryPageCache::new(None);
        cache.set("/gst-registration", html("<p>a</p>"), &tags(&["page:india:gst-registration"]));

        let page = cache.get("/gst-registration").unwrap();
        assert_eq!(page.body, b"<p>a</p>");
        assert_eq!(page.content_type, "text/html; charset=utf-8");
    }

    #[test]
    fn test_etag_content_derived() {
        let a = etag_for(b"body-a");
        let b = etag_for(b"body-b");
        assert_ne!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a, etag_for(b"body-a"));
    }

    #[test]
    fn test_invalidate_tag_removes_all_and_only_tagged() {
        let cache = MemoryPageCache::new(None);
        cache.set("/a", html("a"), &tags(&["page:india:a", "navbar:india"]));
        cache.set("/b", html("b"), &tags(&["page:india:b", "navbar:india"]));
        cache.set("/us/c", html("c"), &tags(&["page:us:c", "navbar:us"]));

        cache.invalidate_tag("navbar:india");

        assert!(cache.get("/a").is_none());
        assert!(cache.get("/b").is_none());
        assert!(cache.get("/us/c").is_some());
    }

    #[test]
    fn test_invalidate_path_normalizes_trailing_slash() {
        let cache = MemoryPageCache::new(None);
        cache.set("/page/", html("x"), &[]);

        cache.invalidate_path("/page");
        assert!(cache.get("/page").is_none());
        assert!(cache.get("/page/").is_none());
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let cache = MemoryPageCache::new(None);
        cache.set("/a", html("a"), &tags(&["t"]));

        cache.invalidate_tag("t");
        cache.invalidate_tag("t");
        cache.invalidate_path("/a");
        assert!(cache.get("/a").is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MemoryPageCache::new(Some(Duration::ZERO));
        cache.set("/a", html("a"), &[]);

        // Deadline is Instant::now(), so the entry is already expired.
        assert!(cache.get("/a").is_none());
        assert!(cache.is_empty(), "expired entry should be evicted on read");
    }

    #[test]
    fn test_fragment_keys_untouched() {
        let cache = MemoryPageCache::new(None);
        cache.set("navbar:india", html("<nav/>"), &tags(&["navbar:india"]));

        assert!(cache.get("navbar:india").is_some());
        cache.invalidate_tag("navbar:india");
        assert!(cache.get("navbar:india").is_none());
    }

    #[test]
    fn test_root_path_key() {
        let cache = MemoryPageCache::new(None);
        cache.set("/", html("home"), &[]);
        assert!(cache.get("/").is_some());
    }
}
