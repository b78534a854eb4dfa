//! Document - High-level document API

use std::collections::HashSet;

use url::Url;

use crate::{DomTree, NodeId};

/// A stylesheet attached to a document
///
/// `text` is only readable when the sheet's rules are accessible to the
/// document (inline `<style>`, or a linked sheet that was loaded and is
/// same-origin). Inaccessible linked sheets must be fetched separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheetRef {
    /// Absolute URL for linked sheets
    pub href: Option<Url>,
    /// Sheet source, if loaded
    pub text: Option<String>,
    /// Rules may be read by the document
    pub origin_clean: bool,
    /// The `<style>` or `<link>` element that owns the sheet
    pub owner: Option<NodeId>,
}

impl StyleSheetRef {
    /// Sheet from an inline `<style>` element
    pub fn inline(text: impl Into<String>, owner: Option<NodeId>) -> Self {
        Self {
            href: None,
            text: Some(text.into()),
            origin_clean: true,
            owner,
        }
    }

    /// Sheet from `<link rel=stylesheet>`, not yet loaded
    pub fn linked(href: Url, owner: Option<NodeId>) -> Self {
        Self {
            href: Some(href),
            text: None,
            origin_clean: false,
            owner,
        }
    }

    /// Whether the sheet's rules can be read synchronously
    pub fn is_accessible(&self) -> bool {
        self.origin_clean && self.text.is_some()
    }
}

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: Url,
    /// Value of `<base href>`, resolved
    base_url: Option<Url>,
    /// Stylesheets in document order
    style_sheets: Vec<StyleSheetRef>,
}

impl Document {
    /// Create a new document with an html/head/body skeleton
    pub fn new(url: Url) -> Self {
        let mut doc = Self::empty(url);
        let root = doc.tree.root();
        let html = doc.tree.append_element(root, "html");
        doc.tree.append_element(html, "head");
        doc.tree.append_element(html, "body");
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: Url) -> Self {
        Self {
            tree: DomTree::new(),
            url,
            base_url: None,
            style_sheets: Vec::new(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL that relative references resolve against
    pub fn base_url(&self) -> &Url {
        self.base_url.as_ref().unwrap_or(&self.url)
    }

    /// Record a `<base href>` value
    pub fn set_base_url(&mut self, base: Url) {
        self.base_url = Some(base);
    }

    /// Resolve a possibly-relative reference against the base URL
    pub fn resolve_url(&self, reference: &str) -> Option<Url> {
        self.base_url().join(reference.trim()).ok()
    }

    /// Get the root element (`<html>` in well-formed documents)
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.children(self.tree.root())
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Get `<head>`
    pub fn head(&self) -> Option<NodeId> {
        self.child_of_root_element("head")
    }

    /// Get `<body>`
    pub fn body(&self) -> Option<NodeId> {
        self.child_of_root_element("body")
    }

    fn child_of_root_element(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree.children(html)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.is(tag)))
            .map(|(id, _)| id)
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.elements_by_tag("title")
            .first()
            .map(|id| self.tree.text_content(*id).trim().to_string())
            .unwrap_or_default()
    }

    /// All elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.tree.descendants(self.tree.root())
            .filter(|(_, node)| node.as_element().is_some_and(|e| e.is(tag)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .find(|(_, node)| node.as_element().and_then(|e| e.id()) == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Every id present in the document
    pub fn ids(&self) -> HashSet<String> {
        self.tree.descendants(self.tree.root())
            .filter_map(|(_, node)| node.as_element().and_then(|e| e.id()))
            .map(str::to_string)
            .collect()
    }

    /// Stylesheets in document order
    pub fn style_sheets(&self) -> &[StyleSheetRef] {
        &self.style_sheets
    }

    /// Mutable stylesheet list (loaders fill in `text`)
    pub fn style_sheets_mut(&mut self) -> &mut Vec<StyleSheetRef> {
        &mut self.style_sheets
    }

    /// Attach a stylesheet
    pub fn add_style_sheet(&mut self, sheet: StyleSheetRef) {
        self.style_sheets.push(sheet);
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_skeleton() {
        let doc = Document::new(url("https://example.com/"));
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tree().element(html).unwrap().tag_name(), "html");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_get_element_by_id_and_ids() {
        let mut doc = Document::new(url("https://example.com/"));
        let body = doc.body().unwrap();
        let div = doc.tree_mut().append_element(body, "div");
        doc.tree_mut().set_attribute(div, "id", "main");

        assert_eq!(doc.get_element_by_id("main"), Some(div));
        assert_eq!(doc.get_element_by_id("missing"), None);
        assert!(doc.ids().contains("main"));
    }

    #[test]
    fn test_base_url_resolution() {
        let mut doc = Document::empty(url("https://example.com/a/page.html"));
        assert_eq!(doc.resolve_url("img.png").unwrap().as_str(), "https://example.com/a/img.png");

        doc.set_base_url(url("https://cdn.example.com/assets/"));
        assert_eq!(doc.resolve_url("img.png").unwrap().as_str(), "https://cdn.example.com/assets/img.png");
        assert_eq!(doc.url().as_str(), "https://example.com/a/page.html");
    }

    #[test]
    fn test_sheet_accessibility() {
        let inline = StyleSheetRef::inline("p {}", None);
        assert!(inline.is_accessible());

        let mut linked = StyleSheetRef::linked(url("https://example.com/a.css"), None);
        assert!(!linked.is_accessible());
        linked.text = Some("p {}".into());
        assert!(!linked.is_accessible());
        linked.origin_clean = true;
        assert!(linked.is_accessible());
    }
}
