//! Minification for rendered html and xml.
//!
//! Provides a unified `minify` function for both output types, with
//! automatic enable/disable based on `SiteConfig`.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Content type for minification.
pub enum MinifyType<'a> {
    /// HTML content
    Html(&'a [u8]),
    /// XML content
    Xml(&'a [u8]),
}

/// Minify content based on type and config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify<'a>(content: MinifyType<'a>, config: &SiteConfig) -> Cow<'a, [u8]> {
    if !config.server.minify {
        match content {
            MinifyType::Html(html) => Cow::Borrowed(html),
            MinifyType::Xml(xml) => Cow::Borrowed(xml),
        }
    } else {
        match content {
            MinifyType::Html(html) => Cow::Owned(minify_html_inner(html)),
            MinifyType::Xml(xml) => Cow::Owned(minify_xml_inner(xml)),
        }
    }
}

/// Minify HTML content using `minify_html` crate.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = false;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

/// Minify XML by removing whitespace between tags.
fn minify_xml_inner(xml: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(xml.len());
    let mut in_tag = false;
    let mut pending_ws = false;

    for &b in xml {
        match b {
            b'<' => {
                in_tag = true;
                pending_ws = false;
                out.push(b);
            }
            b'>' => {
                in_tag = false;
                out.push(b);
            }
            b'\n' | b'\r' | b'\t' => {
                if in_tag {
                    out.push(b' ');
                }
            }
            b' ' if !in_tag => {
                pending_ws = true;
            }
            _ => {
                if pending_ws {
                    out.push(b' ');
                    pending_ws = false;
                }
                out.push(b);
            }
        }
    }

    out
}
