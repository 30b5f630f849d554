//! Head injection with marker-based deduplication.
//!
//! The residual blob produced by the splitter is materialized into a
//! [`HeadDocument`] as marked nodes. Re-applying first removes the
//! previous pass's nodes, so repeated renders of the same page never
//! accumulate duplicates; `clear` removes every tracked node.
//!
//! Injection rules, per child of the parsed residual:
//!
//! - `<title>`: skip; the title is owned by the server-rendered head.
//! - `<meta>` on the SSR allow-list: skip; already rendered.
//! - JSON-LD `<script>` whose body is in `SplitMeta::json_ld`: skip;
//!   already rendered. SSR and injection are mutually exclusive per tag,
//!   so first-occurrence crawlers always see the intended value.
//! - other `<script>`: rebuilt as a fresh node, marked, appended.
//! - `<meta>`/`<link>`: any marked node with the same `name`/`property`/
//!   `rel` key is removed first, then marked and appended.
//! - anything else: marked and appended.

use quick_xml::{Reader, events::Event};

use super::split::{SplitMeta, is_ssr_meta, JSON_LD_TYPE};

/// Attribute marking injected nodes.
pub const HEAD_MARKER_ATTR: &str = "data-rp-head";

// ============================================================================
// Head Document Model
// ============================================================================

/// A single element in the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,

    /// Inner text for container tags (`title`, `script`, `style`).
    pub text: Option<String>,
}

impl HeadNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            text: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_marked(&self) -> bool {
        self.attr(HEAD_MARKER_ATTR).is_some()
    }

    fn mark(&mut self) {
        if !self.is_marked() {
            self.attrs
                .push((HEAD_MARKER_ATTR.to_string(), "true".to_string()));
        }
    }

    /// Identity used to replace an older injected tag of the same kind.
    fn dedup_key(&self) -> Option<(&'static str, String)> {
        ["name", "property", "rel"]
            .into_iter()
            .find_map(|key| self.attr(key).map(|value| (key, value.to_string())))
    }
}

/// An ordered list of head nodes with stable ids.
///
/// The id indirection is what makes removal-by-pass possible: the
/// injector tracks the ids it appended, not positions, so interleaved
/// server-rendered nodes are never disturbed.
#[derive(Debug, Default)]
pub struct HeadDocument {
    nodes: Vec<(u64, HeadNode)>,
    next_id: u64,
}

impl HeadDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, returning its id.
    pub fn push(&mut self, node: HeadNode) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.nodes.push((id, node));
        id
    }

    /// Remove every node whose id is in `ids`.
    pub fn remove_ids(&mut self, ids: &[u64]) {
        self.nodes.retain(|(id, _)| !ids.contains(id));
    }

    /// Remove the first marked node matching `tag` and dedup key.
    fn remove_marked(&mut self, tag: &str, key: &(&'static str, String)) -> Option<u64> {
        let pos = self.nodes.iter().position(|(_, n)| {
            n.is_marked() && n.tag == tag && n.attr(key.0).is_some_and(|v| v == key.1)
        })?;
        Some(self.nodes.remove(pos).0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HeadNode> {
        self.nodes.iter().map(|(_, n)| n)
    }

    #[allow(dead_code)]
    pub fn marked_count(&self) -> usize {
        self.nodes().filter(|n| n.is_marked()).count()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Head Manager
// ============================================================================

/// Capability seam between rendering and head mutation.
///
/// Backed by [`DomHeadManager`] where a head document exists, and by
/// [`NoopHeadManager`] for headless paths that render no custom head.
pub trait HeadManager {
    /// Materialize the residual blob, replacing the previous pass.
    fn apply(&mut self, split: &SplitMeta);

    /// Remove every node this manager injected.
    fn clear(&mut self);
}

/// Injects into an owned [`HeadDocument`].
#[derive(Debug, Default)]
pub struct DomHeadManager {
    doc: HeadDocument,
    injected: Vec<u64>,
}

impl DomHeadManager {
    pub fn new(doc: HeadDocument) -> Self {
        Self {
            doc,
            injected: Vec::new(),
        }
    }

    pub fn document(&self) -> &HeadDocument {
        &self.doc
    }

    pub fn into_document(self) -> HeadDocument {
        self.doc
    }

    fn inject(&mut self, mut node: HeadNode) {
        node.mark();
        let id = self.doc.push(node);
        self.injected.push(id);
    }
}

impl HeadManager for DomHeadManager {
    fn apply(&mut self, split: &SplitMeta) {
        // Re-entrant: drop the previous pass before parsing the new blob.
        self.doc.remove_ids(&self.injected);
        self.injected.clear();

        for node in parse_fragment(&split.residual) {
            match node.tag.as_str() {
                "title" => {}
                "meta" if node.attr("name").is_some_and(is_ssr_meta) => {}
                "script" => {
                    let is_rendered_json_ld = node
                        .attr("type")
                        .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
                        && node.text.as_deref().is_some_and(|body| {
                            split.json_ld.iter().any(|ld| ld.trim() == body.trim())
                        });
                    if is_rendered_json_ld {
                        continue;
                    }

                    // Rebuilt rather than moved, mirroring the DOM rule
                    // that scripts inserted via innerHTML do not execute.
                    let mut fresh = HeadNode::new("script");
                    fresh.attrs = node.attrs.clone();
                    fresh.text = node.text.clone();
                    self.inject(fresh);
                }
                "meta" | "link" => {
                    if let Some(key) = node.dedup_key()
                        && let Some(removed) = self.doc.remove_marked(&node.tag, &key)
                    {
                        self.injected.retain(|id| *id != removed);
                    }
                    self.inject(node);
                }
                _ => self.inject(node),
            }
        }
    }

    fn clear(&mut self) {
        self.doc.remove_ids(&self.injected);
        self.injected.clear();
    }
}

/// Head manager for contexts without a head document (feed and sitemap
/// responses, head-less test harnesses).
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct NoopHeadManager;

impl HeadManager for NoopHeadManager {
    fn apply(&mut self, _split: &SplitMeta) {}
    fn clear(&mut self) {}
}

// ============================================================================
// Fragment Parsing
// ============================================================================

/// Parse a residual blob into flat head nodes.
///
/// Head fragments have no meaningful nesting; children of a container
/// element are flattened in document order. Unclosed void tags
/// (`<meta ...>`) close at the next element or end of input.
fn parse_fragment(residual: &str) -> Vec<HeadNode> {
    let mut reader = Reader::from_reader(residual.as_bytes());
    reader.config_mut().trim_text(true);
    reader.config_mut().enable_all_checks(false);

    let mut out = Vec::new();
    let mut current: Option<HeadNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
                current = Some(node_from_start(&elem));
            }
            Ok(Event::Empty(elem)) => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
                out.push(node_from_start(&elem));
            }
            Ok(Event::Text(text)) => {
                if let Some(node) = current.as_mut() {
                    let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                    match node.text.as_mut() {
                        Some(existing) => existing.push_str(&raw),
                        None => node.text = Some(raw),
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
            }
            Ok(Event::Eof) => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    out
}

fn node_from_start(elem: &quick_xml::events::BytesStart<'_>) -> HeadNode {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut node = HeadNode::new(&tag);
    for attr in elem.attributes().flatten() {
        node.attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(attr.value.as_ref()).into_owned(),
        ));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::split::split_meta_block;

    fn split_of(residual: &str) -> SplitMeta {
        SplitMeta {
            residual: residual.to_string(),
            ..SplitMeta::default()
        }
    }

    #[test]
    fn test_inject_marks_and_appends() {
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of(r#"<meta name="author" content="Acme"/>"#));

        let doc = mgr.document();
        assert_eq!(doc.marked_count(), 1);
        let node = doc.nodes().next().unwrap();
        assert_eq!(node.tag, "meta");
        assert_eq!(node.attr("name"), Some("author"));
        assert_eq!(node.attr("content"), Some("Acme"));
        assert!(node.is_marked());
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let split = split_of(r#"<meta name="author" content="Acme"/><link rel="me" href="/a"/>"#);
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split);
        mgr.apply(&split);

        // Second pass removed the first pass's nodes before appending.
        assert_eq!(mgr.document().marked_count(), 2);
    }

    #[test]
    fn test_reapply_replaces_changed_blob() {
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of(r#"<meta name="author" content="Old"/>"#));
        mgr.apply(&split_of(r#"<meta name="author" content="New"/>"#));

        let doc = mgr.document();
        assert_eq!(doc.marked_count(), 1);
        assert_eq!(doc.nodes().next().unwrap().attr("content"), Some("New"));
    }

    #[test]
    fn test_clear_removes_every_marked_node() {
        let mut doc = HeadDocument::new();
        doc.push(HeadNode::new("title").with_text("Server Title"));
        let mut mgr = DomHeadManager::new(doc);

        mgr.apply(&split_of(
            r#"<meta name="author" content="A"/><script src="/t.js"> </script>"#,
        ));
        assert_eq!(mgr.document().marked_count(), 2);

        mgr.clear();
        assert_eq!(mgr.document().marked_count(), 0);
        // Server-rendered nodes survive teardown.
        assert_eq!(mgr.document().len(), 1);
    }

    #[test]
    fn test_title_skipped() {
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of("<title>Custom</title>"));

        assert!(mgr.document().is_empty());
    }

    #[test]
    fn test_ssr_allowlisted_meta_skipped() {
        // A residual normally has these removed already; a hand-edited
        // blob that still carries one must not re-add it.
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of(r#"<meta name="robots" content="noindex"/>"#));

        assert!(mgr.document().is_empty());
    }

    #[test]
    fn test_plain_script_recreated_and_marked() {
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of(r#"<script src="/analytics.js" defer=""> </script>"#));

        let node = mgr.document().nodes().next().unwrap();
        assert_eq!(node.tag, "script");
        assert_eq!(node.attr("src"), Some("/analytics.js"));
        assert!(node.is_marked());
    }

    #[test]
    fn test_rendered_json_ld_skipped() {
        let body = r#"{"@type":"FAQPage"}"#;
        let blob = format!(r#"<script type="application/ld+json">{body}</script>"#);

        // Full pipeline: split, then inject the residual.
        let split = split_meta_block(&blob);
        assert_eq!(split.json_ld.len(), 1, "split must extract the script");
        assert!(split.residual.contains(body), "residual must retain it");

        let mut mgr = DomHeadManager::default();
        mgr.apply(&split);
        assert!(
            mgr.document().is_empty(),
            "json-ld already rendered server-side must not inject"
        );
    }

    #[test]
    fn test_unrendered_json_ld_still_injects() {
        // JSON-LD in the blob but absent from the rendered sequence
        // (e.g. a blob edited after the split) is injected normally.
        let mut mgr = DomHeadManager::default();
        let mut split = split_of(r#"<script type="application/ld+json">{"a":1}</script>"#);
        split.json_ld.clear();
        mgr.apply(&split);

        assert_eq!(mgr.document().marked_count(), 1);
    }

    #[test]
    fn test_dedup_against_preexisting_marked_node() {
        let mut doc = HeadDocument::new();
        let mut stale = HeadNode::new("meta")
            .with_attr("name", "author")
            .with_attr("content", "Stale");
        stale.mark();
        doc.push(stale);

        let mut mgr = DomHeadManager::new(doc);
        mgr.apply(&split_of(r#"<meta name="author" content="Fresh"/>"#));

        let doc = mgr.document();
        assert_eq!(doc.marked_count(), 1);
        assert_eq!(doc.nodes().next().unwrap().attr("content"), Some("Fresh"));
    }

    #[test]
    fn test_other_elements_appended_marked() {
        let mut mgr = DomHeadManager::default();
        mgr.apply(&split_of(r#"<base href="https://cdn.example/"/>"#));

        let node = mgr.document().nodes().next().unwrap();
        assert_eq!(node.tag, "base");
        assert!(node.is_marked());
    }

    #[test]
    fn test_noop_manager_does_nothing() {
        let mut mgr = NoopHeadManager;
        mgr.apply(&split_of(r#"<meta name="author" content="A"/>"#));
        mgr.clear();
    }

    #[test]
    fn test_parse_fragment_unclosed_void_tags() {
        let nodes = parse_fragment(r#"<meta name="a" content="1"><meta name="b" content="2">"#);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].attr("name"), Some("a"));
        assert_eq!(nodes[1].attr("name"), Some("b"));
    }
}
