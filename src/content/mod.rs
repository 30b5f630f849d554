//! Content model and storage.

pub mod slug;
pub mod store;
pub mod types;

pub use store::{ContentStore, StoreError};
pub use types::{
    BlogPost, ContentPage, Faq, Hero, MetaKind, MetaRecord, NavItem, PageKind, Region, Status,
};
