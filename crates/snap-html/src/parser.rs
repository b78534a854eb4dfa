//! HTML5 Parser implementation
//!
//! Uses html5ever's build-in RcDom and converts to our DOM format.
//! This is simpler and more reliable than implementing TreeSink directly.

use std::sync::LazyLock;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use snap_dom::{Document, DomTree, Node, NodeData, NodeId, StyleSheetRef};
use url::Url;

static ABOUT_BLANK: LazyLock<Url> = LazyLock::new(|| Url::parse("about:blank").expect("about:blank"));

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into an `about:blank` Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, ABOUT_BLANK.clone())
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: Url) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        // Convert RcDom to our DOM
        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_node(&dom.document, document.tree_mut(), root);

        // Pick up <base>, <style> and <link rel=stylesheet>
        finalize(&mut document);

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                // Document node - just process children
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                let mut node = Node::doctype(name.to_string());
                node.data = NodeData::Doctype {
                    name: name.to_string(),
                    public_id: public_id.to_string(),
                    system_id: system_id.to_string(),
                };
                let id = tree.push(node);
                tree.append_child(parent, id);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                tree.append_text(parent, &text);
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id);
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.append_element(parent, &name.local);
                if let Some(elem) = tree.element_mut(id) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, attr.value.to_string());
                    }
                }

                // Process children
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id);
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // HTML documents never carry them
            }
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the document base URL and its stylesheets in document order
fn finalize(document: &mut Document) {
    let root = document.tree().root();
    let mut base = None;
    let mut sheets = Vec::new();

    for (id, node) in document.tree().descendants(root) {
        let Some(elem) = node.as_element() else { continue };
        match elem.tag_name() {
            "base" if base.is_none() => {
                if let Some(href) = elem.get_attr("href") {
                    base = document.url().join(href.trim()).ok();
                }
            }
            "style" => sheets.push(SheetSource::Inline(id)),
            "link" => {
                let is_sheet = elem.get_attr("rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet"))
                });
                if let (true, Some(href)) = (is_sheet, elem.get_attr("href")) {
                    sheets.push(SheetSource::Linked(id, href.to_string()));
                }
            }
            _ => {}
        }
    }

    if let Some(base) = base {
        document.set_base_url(base);
    }

    for source in sheets {
        let sheet = match source {
            SheetSource::Inline(id) => {
                StyleSheetRef::inline(document.tree().text_content(id), Some(id))
            }
            SheetSource::Linked(id, href) => match document.resolve_url(&href) {
                Some(url) => StyleSheetRef::linked(url, Some(id)),
                None => {
                    tracing::debug!("Skipping stylesheet with bad href {:?}", href);
                    continue;
                }
            },
        };
        document.add_style_sheet(sheet);
    }
}

enum SheetSource {
    Inline(NodeId),
    Linked(NodeId, String),
}
