//! `<head>` rendering.
//!
//! Builds the server-rendered head document for a page: framework tags
//! (charset, viewport, title, description, canonical, Open Graph,
//! Twitter card), then the split results of the page's custom metadata
//! block (allow-listed metas and JSON-LD), and finally the injected
//! residual. A tag type is either server-rendered or injected, never
//! both.

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::config::SiteConfig;
use crate::meta::{DomHeadManager, HeadDocument, HeadManager, HeadNode, SplitMeta, JSON_LD_TYPE};

use super::common::XmlWriter;

/// Framework-owned metadata for one page.
#[derive(Debug, Clone, Default)]
pub struct PageSeo {
    pub title: String,
    pub description: String,
    pub canonical: Option<String>,
    pub og_image: Option<String>,
}

impl PageSeo {
    /// Derive page metadata from the entity label and the parsed subset
    /// of its custom metadata block.
    ///
    /// Falls back to `<label> | <site title>` and the entity/site
    /// description when the block carries no override.
    pub fn derive(
        config: &SiteConfig,
        label: &str,
        fallback_description: &str,
        path: &str,
        split: Option<&SplitMeta>,
    ) -> Self {
        let title = split
            .and_then(|s| s.title.clone())
            .unwrap_or_else(|| {
                if config.base.title.is_empty() {
                    label.to_string()
                } else {
                    format!("{label} | {}", config.base.title)
                }
            });

        let description = split
            .and_then(|s| s.ssr_value("description"))
            .unwrap_or(if fallback_description.is_empty() {
                &config.base.description
            } else {
                fallback_description
            })
            .to_string();

        let canonical = config
            .base
            .url
            .as_deref()
            .map(|base| format!("{}{path}", base.trim_end_matches('/')));

        Self {
            title,
            description,
            canonical,
            og_image: config.seo.og_image.clone(),
        }
    }
}

/// Build the complete head document for a page.
///
/// The custom block's residual is applied through the head manager so
/// the injection rules (skip title, skip SSR'd tags, dedup by marker)
/// hold on the server-rendered output exactly as they do on re-renders.
pub fn build_head(config: &SiteConfig, seo: &PageSeo, split: Option<&SplitMeta>) -> HeadDocument {
    let mut doc = HeadDocument::new();

    doc.push(HeadNode::new("meta").with_attr("charset", "utf-8"));
    doc.push(
        HeadNode::new("meta")
            .with_attr("name", "viewport")
            .with_attr("content", "width=device-width, initial-scale=1"),
    );

    doc.push(HeadNode::new("title").with_text(&seo.title));

    // The description meta belongs to the SSR allow-list; when the
    // custom block carries one it is emitted below with the other
    // allow-listed pairs, not here.
    let custom_description = split.is_some_and(|s| s.ssr_value("description").is_some());
    if !custom_description && !seo.description.is_empty() {
        doc.push(
            HeadNode::new("meta")
                .with_attr("name", "description")
                .with_attr("content", &seo.description),
        );
    }

    if let Some(canonical) = &seo.canonical {
        doc.push(
            HeadNode::new("link")
                .with_attr("rel", "canonical")
                .with_attr("href", canonical),
        );
    }

    write_social_tags(&mut doc, config, seo);

    if let Some(split) = split {
        for (name, content) in &split.ssr_meta {
            doc.push(
                HeadNode::new("meta")
                    .with_attr("name", name)
                    .with_attr("content", content),
            );
        }
        for ld in &split.json_ld {
            doc.push(
                HeadNode::new("script")
                    .with_attr("type", JSON_LD_TYPE)
                    .with_text(ld),
            );
        }
    }

    let mut manager = DomHeadManager::new(doc);
    if let Some(split) = split {
        manager.apply(split);
    }
    manager.into_document()
}

/// Open Graph and Twitter card tags.
fn write_social_tags(doc: &mut HeadDocument, config: &SiteConfig, seo: &PageSeo) {
    let og = |property: &str, content: &str| {
        HeadNode::new("meta")
            .with_attr("property", property)
            .with_attr("content", content)
    };
    let tw = |name: &str, content: &str| {
        HeadNode::new("meta")
            .with_attr("name", name)
            .with_attr("content", content)
    };

    doc.push(og("og:title", &seo.title));
    if !seo.description.is_empty() {
        doc.push(og("og:description", &seo.description));
    }
    if !config.base.title.is_empty() {
        doc.push(og("og:site_name", &config.base.title));
    }
    if let Some(canonical) = &seo.canonical {
        doc.push(og("og:url", canonical));
    }
    doc.push(og("og:type", &config.seo.og_type));
    if let Some(image) = &seo.og_image {
        doc.push(og("og:image", image));
    }

    doc.push(tw("twitter:card", &config.seo.twitter_card));
    doc.push(tw("twitter:title", &seo.title));
    if !seo.description.is_empty() {
        doc.push(tw("twitter:description", &seo.description));
    }
}

/// Serialize a head document into the page writer.
///
/// Container nodes (`title`, `script`, `style`) render with their inner
/// text; script bodies are written raw so JSON-LD survives verbatim.
pub fn write_head(writer: &mut XmlWriter, doc: &HeadDocument) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("head")))?;

    for node in doc.nodes() {
        let mut elem = BytesStart::new(node.tag.as_str());
        for (k, v) in &node.attrs {
            elem.push_attribute((k.as_str(), v.as_str()));
        }

        match &node.text {
            Some(text) => {
                writer.write_event(Event::Start(elem))?;
                if node.tag == "script" {
                    writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
                } else {
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                }
                writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
            }
            None if matches!(node.tag.as_str(), "script" | "style") => {
                // Scripts must not self-close in html.
                writer.write_event(Event::Start(elem))?;
                writer.write_event(Event::Text(BytesText::new(" ")))?;
                writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
            }
            None => {
                writer.write_event(Event::Empty(elem))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("head")))?;
    Ok(())
}
