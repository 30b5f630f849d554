//! Metadata pipeline: splitting admin-authored head blobs and injecting
//! the residual into the rendered head.

pub mod inject;
pub mod split;

pub use inject::{DomHeadManager, HeadDocument, HeadManager, HeadNode, NoopHeadManager, HEAD_MARKER_ATTR};
pub use split::{split_meta_block, SplitMeta, JSON_LD_TYPE, SSR_META_ALLOWLIST};
