//! Full-document rendering for public routes.
//!
//! Every renderer produces a complete html document: the head via the
//! metadata pipeline, then navbar, hero, body and FAQs from the content
//! store. Entity body fields are trusted admin-authored html and are
//! written raw.

use anyhow::Result;
use chrono::Datelike;

use crate::config::SiteConfig;
use crate::content::{BlogPost, ContentPage, ContentStore, MetaKind, Region};
use crate::meta::{HeadDocument, HeadNode, split_meta_block};
use crate::routes;

use super::common::{
    XmlWriter, create_writer, into_bytes, write_end, write_raw, write_start, write_text_element,
};
use super::head::{PageSeo, build_head, write_head};
use super::minify::{MinifyType, minify};

// ============================================================================
// Navbar
// ============================================================================

/// Render the region's navigation fragment.
///
/// Cached separately under the region's navbar tag; pages embed the
/// fragment and carry the same tag so a nav change refreshes both.
pub fn render_navbar(store: &ContentStore, region: Region) -> Result<String> {
    let mut writer = create_writer(256);
    write_start(&mut writer, "nav", &[("class", "site-nav")])?;
    write_start(&mut writer, "ul", &[])?;

    for item in store.nav_items(region) {
        write_start(&mut writer, "li", &[])?;
        write_start(&mut writer, "a", &[("href", item.href.as_str())])?;
        write_raw(&mut writer, &escape_text(&item.label))?;
        write_end(&mut writer, "a")?;
        write_end(&mut writer, "li")?;
    }

    write_end(&mut writer, "ul")?;
    write_end(&mut writer, "nav")?;
    Ok(String::from_utf8_lossy(&into_bytes(writer)).into_owned())
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Render a content page (service or generic).
pub fn render_content_page(
    config: &SiteConfig,
    store: &ContentStore,
    page: &ContentPage,
    nav_html: &str,
) -> Result<Vec<u8>> {
    let split = store
        .meta_for(MetaKind::Page, &page.id)
        .map(|record| split_meta_block(&record.meta_block));
    let path = routes::content_path(page.region, &page.href);
    let seo = PageSeo::derive(config, &page.label, "", &path, split.as_ref());
    let head = build_head(config, &seo, split.as_ref());

    render_document(config, &head, |writer| {
        write_raw(writer, nav_html)?;
        write_start(writer, "main", &[])?;

        if let Some(hero) = store.hero_for(page.region, &page.href) {
            write_start(writer, "section", &[("class", "hero")])?;
            write_text_element(writer, "h1", &hero.heading)?;
            if !hero.subheading.is_empty() {
                write_text_element(writer, "p", &hero.subheading)?;
            }
            if let (Some(label), Some(href)) = (&hero.cta_label, &hero.cta_href) {
                write_start(writer, "a", &[("class", "cta"), ("href", href.as_str())])?;
                write_raw(writer, &escape_text(label))?;
                write_end(writer, "a")?;
            }
            write_end(writer, "section")?;
        } else {
            write_text_element(writer, "h1", &page.label)?;
        }

        write_start(writer, "article", &[])?;
        write_raw(writer, &page.body_html)?;
        write_end(writer, "article")?;

        let faqs = store.faqs_for(page.region, &page.href);
        if !faqs.is_empty() {
            write_start(writer, "section", &[("class", "faqs")])?;
            write_text_element(writer, "h2", "Frequently Asked Questions")?;
            for faq in faqs {
                write_start(writer, "details", &[])?;
                write_text_element(writer, "summary", &faq.question)?;
                write_raw(writer, &faq.answer_html)?;
                write_end(writer, "details")?;
            }
            write_end(writer, "section")?;
        }

        write_end(writer, "main")?;
        write_footer(writer, config)
    })
}

/// Render a blog detail page.
pub fn render_blog_page(
    config: &SiteConfig,
    store: &ContentStore,
    blog: &BlogPost,
    nav_html: &str,
) -> Result<Vec<u8>> {
    let split = store
        .meta_for(MetaKind::Blog, &blog.id)
        .map(|record| split_meta_block(&record.meta_block));
    let path = routes::blog_path(blog.region, &blog.slug);
    let seo = PageSeo::derive(config, &blog.title, &blog.excerpt, &path, split.as_ref());
    let head = build_head(config, &seo, split.as_ref());

    render_document(config, &head, |writer| {
        write_raw(writer, nav_html)?;
        write_start(writer, "main", &[])?;
        write_start(writer, "article", &[("class", "blog-post")])?;
        write_text_element(writer, "h1", &blog.title)?;

        write_start(writer, "p", &[("class", "byline")])?;
        let mut byline = blog.published_at.format("%Y-%m-%d").to_string();
        if let Some(author) = &blog.author {
            byline = format!("{byline} · {author}");
        }
        if let Some(category) = &blog.category {
            byline = format!("{byline} · {category}");
        }
        write_raw(writer, &escape_text(&byline))?;
        write_end(writer, "p")?;

        write_raw(writer, &blog.body_html)?;
        write_end(writer, "article")?;
        write_end(writer, "main")?;
        write_footer(writer, config)
    })
}

/// Render the region's blog index.
pub fn render_blog_listing(
    config: &SiteConfig,
    store: &ContentStore,
    region: Region,
    nav_html: &str,
) -> Result<Vec<u8>> {
    let path = routes::blog_listing_path(region);
    let seo = PageSeo::derive(config, "Blog", "", path, None);
    let head = build_head(config, &seo, None);

    render_document(config, &head, |writer| {
        write_raw(writer, nav_html)?;
        write_start(writer, "main", &[])?;
        write_text_element(writer, "h1", "Blog")?;
        write_start(writer, "ul", &[("class", "blog-index")])?;

        for blog in store.published_blogs(region) {
            let href = routes::blog_path(region, &blog.slug);
            write_start(writer, "li", &[])?;
            write_start(writer, "a", &[("href", href.as_str())])?;
            write_raw(writer, &escape_text(&blog.title))?;
            write_end(writer, "a")?;
            if !blog.excerpt.is_empty() {
                write_text_element(writer, "p", &blog.excerpt)?;
            }
            write_end(writer, "li")?;
        }

        write_end(writer, "ul")?;
        write_end(writer, "main")?;
        write_footer(writer, config)
    })
}

/// Render the region landing page: hero (if one is attached to the empty
/// href) plus the published service directory and recent posts.
pub fn render_home(
    config: &SiteConfig,
    store: &ContentStore,
    region: Region,
    nav_html: &str,
) -> Result<Vec<u8>> {
    let path = routes::home_path(region);
    let label = if config.base.title.is_empty() {
        "Home"
    } else {
        config.base.title.as_str()
    };
    let seo = PageSeo::derive(config, label, "", path, None);
    let head = build_head(config, &seo, None);

    render_document(config, &head, |writer| {
        write_raw(writer, nav_html)?;
        write_start(writer, "main", &[])?;

        if let Some(hero) = store.hero_for(region, "") {
            write_start(writer, "section", &[("class", "hero")])?;
            write_text_element(writer, "h1", &hero.heading)?;
            if !hero.subheading.is_empty() {
                write_text_element(writer, "p", &hero.subheading)?;
            }
            write_end(writer, "section")?;
        } else {
            write_text_element(writer, "h1", label)?;
        }

        write_start(writer, "section", &[("class", "services")])?;
        write_text_element(writer, "h2", "Services")?;
        write_start(writer, "ul", &[])?;
        for page in store.published_pages(region) {
            let href = routes::content_path(region, &page.href);
            write_start(writer, "li", &[])?;
            write_start(writer, "a", &[("href", href.as_str())])?;
            write_raw(writer, &escape_text(&page.label))?;
            write_end(writer, "a")?;
            write_end(writer, "li")?;
        }
        write_end(writer, "ul")?;
        write_end(writer, "section")?;

        write_end(writer, "main")?;
        write_footer(writer, config)
    })
}

/// Render the 404 page. No custom metadata exists for an unknown path,
/// so the head skips the injection pass entirely.
pub fn render_not_found(config: &SiteConfig) -> Result<Vec<u8>> {
    let mut head = HeadDocument::new();
    head.push(HeadNode::new("meta").with_attr("charset", "utf-8"));
    head.push(HeadNode::new("title").with_text("Page not found"));
    head.push(
        HeadNode::new("meta")
            .with_attr("name", "robots")
            .with_attr("content", "noindex"),
    );

    render_document(config, &head, |writer| {
        write_start(writer, "main", &[])?;
        write_text_element(writer, "h1", "404")?;
        write_text_element(writer, "p", "Page not found")?;
        write_end(writer, "main")
    })
}

// ============================================================================
// Document Assembly
// ============================================================================

/// Assemble `<!DOCTYPE html><html>...<head/>...<body/></html>` and
/// minify per config.
fn render_document<F>(config: &SiteConfig, head: &HeadDocument, body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut XmlWriter) -> Result<()>,
{
    let mut writer = create_writer(4096);

    write_raw(&mut writer, "<!DOCTYPE html>")?;
    write_start(&mut writer, "html", &[("lang", config.base.language.as_str())])?;
    write_head(&mut writer, head)?;
    write_start(&mut writer, "body", &[])?;
    body(&mut writer)?;
    write_end(&mut writer, "body")?;
    write_end(&mut writer, "html")?;

    let html = into_bytes(writer);
    Ok(minify(MinifyType::Html(&html), config).into_owned())
}

fn write_footer(writer: &mut XmlWriter, config: &SiteConfig) -> Result<()> {
    write_start(writer, "footer", &[])?;
    let notice = if config.base.copyright.is_empty() {
        format!("© {} {}", chrono::Utc::now().year(), config.base.title)
    } else {
        config.base.copyright.clone()
    };
    write_raw(writer, &escape_text(&notice))?;
    write_end(writer, "footer")
}

/// Escape text destined for a raw write.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{Faq, Hero, NavItem, PageKind, Status};
    use chrono::{TimeZone, Utc};

    fn config() -> SiteConfig {
        let mut c = SiteConfig::default();
        c.base.title = "Acme Filings".into();
        c.base.description = "Compliance services".into();
        c.base.url = Some("https://acmefilings.example".into());
        c.server.minify = false;
        c
    }

    fn page(region: Region, href: &str) -> ContentPage {
        ContentPage {
            id: "1".into(),
            region,
            href: href.into(),
            label: "GST Registration".into(),
            body_html: "<p>Register for GST.</p>".into(),
            kind: PageKind::Service,
            status: Status::Published,
            updated_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    fn blog(region: Region, slug: &str) -> BlogPost {
        BlogPost {
            id: "2".into(),
            region,
            slug: slug.into(),
            title: "Filing Deadlines".into(),
            excerpt: "What changes this year".into(),
            body_html: "<p>Deadlines move.</p>".into(),
            category: Some("compliance".into()),
            author: Some("Acme".into()),
            status: Status::Published,
            published_at: Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_navbar_renders_items_in_order() {
        let store = ContentStore::in_memory();
        store.upsert_nav_item(NavItem {
            id: "1".into(),
            region: Region::India,
            label: "Services".into(),
            href: "/services".into(),
            order: 2,
        });
        store.upsert_nav_item(NavItem {
            id: "2".into(),
            region: Region::India,
            label: "Home".into(),
            href: "/".into(),
            order: 1,
        });

        let nav = render_navbar(&store, Region::India).unwrap();
        let home = nav.find("Home").unwrap();
        let services = nav.find("Services").unwrap();
        assert!(home < services);
        assert!(nav.contains(r#"<a href="/services">"#));
    }

    #[test]
    fn test_content_page_full_document() {
        let c = config();
        let store = ContentStore::in_memory();
        let p = page(Region::India, "gst-registration");
        store.upsert_hero(Hero {
            id: "3".into(),
            region: Region::India,
            page_href: "gst-registration".into(),
            heading: "Register in days".into(),
            subheading: "Fast and compliant".into(),
            cta_label: Some("Start now".into()),
            cta_href: Some("/contact".into()),
        });
        store.upsert_faq(Faq {
            id: "4".into(),
            region: Region::India,
            page_href: "gst-registration".into(),
            question: "How long does it take?".into(),
            answer_html: "<p>About a week.</p>".into(),
            order: 1,
        });

        let html = render_content_page(&c, &store, &p, "<nav></nav>").unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en-IN">"#));
        assert!(html.contains("<title>GST Registration | Acme Filings</title>"));
        assert!(html.contains("Register in days"));
        assert!(html.contains("<p>Register for GST.</p>"));
        assert!(html.contains("How long does it take?"));
        assert!(html.contains("About a week."));
    }

    #[test]
    fn test_content_page_custom_meta_block() {
        let c = config();
        let store = ContentStore::in_memory();
        let p = page(Region::India, "gst-registration");
        store.set_meta(crate::content::MetaRecord {
            kind: MetaKind::Page,
            page_id: "1".into(),
            meta_block: concat!(
                r#"<meta name="robots" content="noindex">"#,
                r#"<script type="application/ld+json">{"@type":"Service"}</script>"#,
            )
            .into(),
        });

        let html = render_content_page(&c, &store, &p, "").unwrap();
        let html = String::from_utf8(html).unwrap();

        assert_eq!(html.matches(r#"name="robots""#).count(), 1);
        assert_eq!(html.matches(r#"{"@type":"Service"}"#).count(), 1);
    }

    #[test]
    fn test_blog_page_byline() {
        let c = config();
        let store = ContentStore::in_memory();
        let b = blog(Region::Us, "filing-deadlines");

        let html = render_blog_page(&c, &store, &b, "").unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.contains("Filing Deadlines"));
        assert!(html.contains("2026-01-20"));
        assert!(html.contains("compliance"));
    }

    #[test]
    fn test_blog_listing_links_use_region_prefix() {
        let c = config();
        let store = ContentStore::in_memory();
        store.upsert_blog(blog(Region::Us, "filing-deadlines"));

        let html = render_blog_listing(&c, &store, Region::Us, "").unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.contains(r#"<a href="/us/blog/filing-deadlines">"#));
    }

    #[test]
    fn test_home_lists_published_services() {
        let c = config();
        let store = ContentStore::in_memory();
        store.upsert_page(page(Region::India, "gst-registration"));

        let html = render_home(&c, &store, Region::India, "").unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.contains(r#"<a href="/gst-registration">"#));
        assert!(html.contains("GST Registration"));
    }

    #[test]
    fn test_not_found_noindex() {
        let c = config();
        let html = render_not_found(&c).unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.contains("404"));
        assert!(html.contains("noindex"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a & <b>"), "a &amp; &lt;b&gt;");
    }
}
