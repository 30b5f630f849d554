//! Metadata block splitter.
//!
//! An admin-authored `meta_block` is a freeform head-HTML blob: meta
//! tags, link tags, JSON-LD scripts, verification snippets. At render
//! time it is split three ways:
//!
//! - `ssr_meta`: `<meta>` tags on a fixed allow-list, emitted during
//!   server rendering,
//! - `json_ld`: every `<script type="application/ld+json">` body,
//!   verbatim and in document order, rendered server-side,
//! - `residual`: the blob with the allow-listed metas removed, handed to
//!   the head injector for everything else.
//!
//! JSON-LD scripts stay in the residual; the injector skips them against
//! the `json_ld` sequence so each script renders exactly once.

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Cursor;
use std::str;

/// `<meta name="...">` names emitted server-side.
pub const SSR_META_ALLOWLIST: [&str; 4] = ["keywords", "googlebot", "description", "robots"];

/// The MIME type that marks a structured-data script.
pub const JSON_LD_TYPE: &str = "application/ld+json";

/// Result of splitting a `meta_block`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitMeta {
    /// First `<title>` text, if the blob carries one. The title itself
    /// stays in the residual; the injector skips it there.
    pub title: Option<String>,

    /// Allow-listed `(name, content)` pairs for server-side emission.
    pub ssr_meta: Vec<(String, String)>,

    /// JSON-LD script bodies, verbatim, not re-validated as JSON.
    pub json_ld: Vec<String>,

    /// The blob minus the allow-listed metas, for the head injector.
    pub residual: String,
}

impl SplitMeta {
    /// Allow-listed content by meta name, if present.
    pub fn ssr_value(&self, name: &str) -> Option<&str> {
        self.ssr_meta
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Check a meta name against the SSR allow-list, case-insensitively.
pub fn is_ssr_meta(name: &str) -> bool {
    SSR_META_ALLOWLIST
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(name))
}

/// Split a stored `meta_block` blob.
///
/// The parser is permissive: checks are disabled, broken attributes are
/// skipped, and on an unrecoverable parse error the remaining input is
/// passed through to the residual untouched. Malformed blobs degrade to
/// odd tag placement, never to a failed render.
pub fn split_meta_block(blob: &str) -> SplitMeta {
    let mut split = SplitMeta::default();

    let mut reader = Reader::from_reader(blob.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);

    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(blob.len())));

    // An allow-listed <meta> arrives as Start when written without `/>`;
    // its stray End (if any) is dropped too.
    let mut skip_meta_end = false;
    let mut in_title = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"meta" => {
                if extract_ssr_meta(&elem, &mut split) {
                    skip_meta_end = true;
                } else {
                    writer.write_event(Event::Start(elem)).ok();
                }
            }
            Ok(Event::Empty(elem)) if elem.name().as_ref() == b"meta" => {
                if !extract_ssr_meta(&elem, &mut split) {
                    writer.write_event(Event::Empty(elem)).ok();
                }
            }
            Ok(Event::End(elem)) if elem.name().as_ref() == b"meta" && skip_meta_end => {
                skip_meta_end = false;
            }
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"script" => {
                let is_json_ld = attr_value(&elem, b"type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE));

                if !is_json_ld {
                    writer.write_event(Event::Start(elem)).ok();
                    continue;
                }

                let start = elem.to_owned();
                let Ok(body) = reader.read_text(start.name()) else {
                    // Unterminated script: keep what we have.
                    break;
                };
                split.json_ld.push(body.clone().into_owned());

                // Retained in the residual verbatim; the injector dedups
                // against `json_ld`.
                writer.write_event(Event::Start(start)).ok();
                writer
                    .write_event(Event::Text(BytesText::from_escaped(body.as_ref())))
                    .ok();
                writer.write_event(Event::End(BytesEnd::new("script"))).ok();
            }
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"title" => {
                in_title = true;
                writer.write_event(Event::Start(elem)).ok();
            }
            Ok(Event::End(elem)) if elem.name().as_ref() == b"title" => {
                in_title = false;
                writer.write_event(Event::End(elem)).ok();
            }
            Ok(Event::Text(text)) => {
                if in_title && split.title.is_none() {
                    let raw = str::from_utf8(text.as_ref()).unwrap_or_default().trim();
                    if !raw.is_empty() {
                        split.title = Some(raw.to_string());
                    }
                }
                writer.write_event(Event::Text(text)).ok();
            }
            Ok(Event::Eof) => break,
            Ok(event) => {
                writer.write_event(event).ok();
            }
            Err(_) => {
                // Unrecoverable parse error: pass the rest through raw.
                let pos = reader.buffer_position() as usize;
                split.residual = finish_residual(writer, blob, pos);
                return split;
            }
        }
    }

    split.residual = String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned();
    split
}

/// Record an allow-listed meta into `split.ssr_meta`.
///
/// Returns `true` when the element was captured (and must not reach the
/// residual).
fn extract_ssr_meta(elem: &BytesStart<'_>, split: &mut SplitMeta) -> bool {
    let Some(name) = attr_value(elem, b"name") else {
        return false;
    };
    if !is_ssr_meta(&name) {
        return false;
    }

    let content = attr_value(elem, b"content").unwrap_or_default();
    split.ssr_meta.push((name.to_ascii_lowercase(), content));
    true
}

/// Append the unparsed tail of the blob to the residual.
fn finish_residual(writer: Writer<Cursor<Vec<u8>>>, blob: &str, pos: usize) -> String {
    let mut residual = String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned();
    if pos < blob.len() {
        residual.push_str(&blob[pos..]);
    }
    residual
}

/// Lossy attribute lookup; broken attributes read as absent.
fn attr_value(elem: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    elem.attributes().flatten().find_map(|attr| {
        (attr.key.as_ref() == key)
            .then(|| String::from_utf8_lossy(attr.value.as_ref()).into_owned())
    })
}
