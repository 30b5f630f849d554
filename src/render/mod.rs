//! HTML rendering pipeline.

pub mod common;
pub mod head;
pub mod minify;
pub mod page;

pub use head::PageSeo;
pub use minify::{MinifyType, minify};
pub use page::{
    render_blog_listing, render_blog_page, render_content_page, render_home, render_navbar,
    render_not_found,
};
