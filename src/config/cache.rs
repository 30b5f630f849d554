//! `[cache]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[cache]` section in regionpress.toml - rendered page cache settings.
///
/// # Example
/// ```toml
/// [cache]
/// enable = true
/// ttl_secs = 300   # entries recompute after 5 minutes even without
///                  # an explicit invalidation
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Enable the rendered page cache. When disabled every request
    /// re-renders from the content store.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Natural expiry for cached entries, in seconds. `0` means entries
    /// never expire on their own and only invalidation evicts them.
    #[serde(default = "defaults::cache::ttl_secs")]
    #[educe(Default = defaults::cache::ttl_secs())]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// TTL as a `Duration`, `None` when entries never expire naturally.
    pub fn ttl(&self) -> Option<std::time::Duration> {
        (self.ttl_secs > 0).then(|| std::time::Duration::from_secs(self.ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::time::Duration;

    #[test]
    fn test_cache_config_defaults() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(config.cache.enable);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_cache_ttl_zero_never_expires() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test site"

            [cache]
            ttl_secs = 0
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.cache.ttl(), None);
    }
}
