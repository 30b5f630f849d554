//! Content entity types.
//!
//! These types are serialized to the JSON content store and exposed
//! through the admin API. Entities are plain data without business logic;
//! the store owns lookup and lifecycle, the renderer owns presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Region
// ============================================================================

/// Top-level content partition. Determines the routing prefix and which
/// dataset a request sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    India,
    Us,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::India, Region::Us];

    /// Parse from the wire form used by the admin API ("INDIA"/"US"),
    /// case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INDIA" => Some(Region::India),
            "US" => Some(Region::Us),
            _ => None,
        }
    }

    /// Lowercase label used in cache tags and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Region::India => "india",
            Region::Us => "us",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Status
// ============================================================================

/// Publication status. Only `Published` entities render publicly;
/// retirement is a status flip, not a row delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
    Archived,
}

impl Status {
    pub const fn is_published(&self) -> bool {
        matches!(self, Status::Published)
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Service and generic pages share a shape; the kind only affects how the
/// page is grouped in listings and the sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Service,
    Generic,
}

/// A public content page addressed by `(region, href)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPage {
    pub id: String,
    pub region: Region,

    /// Slug without leading slash (e.g. "gst-registration").
    pub href: String,

    /// Human label, also the fallback for title/heading.
    pub label: String,

    /// Trusted admin-authored body fragment.
    pub body_html: String,

    pub kind: PageKind,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Blogs
// ============================================================================

/// A blog post addressed by `(region, slug)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub region: Region,
    pub slug: String,
    pub title: String,

    /// Short summary used on the listing page and in feeds.
    #[serde(default)]
    pub excerpt: String,

    pub body_html: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    pub status: Status,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Navigation
// ============================================================================

/// A navbar entry, region-scoped and ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub region: Region,
    pub label: String,

    /// Target path as rendered into the anchor, already region-prefixed.
    pub href: String,

    pub order: i32,
}

// ============================================================================
// Hero sections
// ============================================================================

/// Hero section attached to a content page by `(region, page_href)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub region: Region,
    pub page_href: String,
    pub heading: String,

    #[serde(default)]
    pub subheading: String,

    #[serde(default)]
    pub cta_label: Option<String>,

    #[serde(default)]
    pub cta_href: Option<String>,
}

// ============================================================================
// FAQs
// ============================================================================

/// FAQ entry attached to a content page by `(region, page_href)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub region: Region,
    pub page_href: String,
    pub question: String,
    pub answer_html: String,
    pub order: i32,
}

// ============================================================================
// Metadata records
// ============================================================================

/// Which entity family a metadata record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaKind {
    Page,
    Blog,
}

impl MetaKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Some(MetaKind::Page),
            "blog" => Some(MetaKind::Blog),
            _ => None,
        }
    }
}

/// Freeform head-HTML blob keyed by `(kind, page id)`.
///
/// The blob is stored exactly as entered by the admin; the metadata
/// splitter decides what is emitted server-side at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaRecord {
    pub kind: MetaKind,
    pub page_id: String,
    pub meta_block: String,
}

impl MetaRecord {
    /// Store key for a `(kind, page id)` pair.
    pub fn key(kind: MetaKind, page_id: &str) -> String {
        let kind = match kind {
            MetaKind::Page => "page",
            MetaKind::Blog => "blog",
        };
        format!("{kind}:{page_id}")
    }
}
