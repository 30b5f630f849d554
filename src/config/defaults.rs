//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn email() -> String {
        "user@noreply.regionpress".into()
    }

    pub fn language() -> String {
        "en-IN".into()
    }
}

// ============================================================================
// [server] Section Defaults
// ============================================================================

pub mod server {
    use std::path::PathBuf;

    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5311
    }

    pub fn data() -> PathBuf {
        "content.json".into()
    }

    pub fn admin_token() -> String {
        String::new()
    }
}

// ============================================================================
// [cache] Section Defaults
// ============================================================================

pub mod cache {
    pub fn ttl_secs() -> u64 {
        300
    }
}

// ============================================================================
// [seo] Section Defaults
// ============================================================================

pub mod seo {
    pub fn og_type() -> String {
        "website".into()
    }

    pub fn twitter_card() -> String {
        "summary_large_image".into()
    }
}
