//! Global config with atomic replacement support.
//!
//! Uses `arc-swap` for lock-free reads. The request loop calls [`cfg`] per
//! request, so a future config reload path only has to [`ArcSwap::store`]
//! a new value.
//!
//! # Usage
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! serve_site(&c)?;  // Arc auto-derefs to &SiteConfig
//! ```

use super::SiteConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage with atomic replacement support.
///
/// Initialized with default config, then replaced with the loaded config
/// in main via [`init_config`].
static CONFIG: LazyLock<ArcSwap<SiteConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SiteConfig::default()));

/// Get current config as `Arc<SiteConfig>`.
///
/// Returns an `Arc` that keeps the config alive. Thread-safe and wait-free.
#[inline]
pub fn cfg() -> Arc<SiteConfig> {
    CONFIG.load_full()
}

/// Initialize global config (called once at startup).
///
/// This replaces the default config with the loaded one.
#[inline]
pub fn init_config(config: SiteConfig) {
    CONFIG.store(Arc::new(config));
}
