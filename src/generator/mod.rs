//! SEO artifact generators (sitemap, feeds).

pub mod rss;
pub mod sitemap;

pub use rss::build_feed;
pub use sitemap::build_sitemap;
