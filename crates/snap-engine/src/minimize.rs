//! Style Minimizer
//!
//! Shrinks each captured style down to the properties a fresh render of
//! the frame would get wrong. The frame is rendered once without any
//! captured styles; elements are then visited in document order and
//! given just enough inline style to reproduce their captured computed
//! style. Styles stay applied as the walk proceeds, so inherited values
//! don't get repeated on descendants.

use std::collections::HashMap;

use snap_css::{ComputedStyle, StyleResolver, StyleSource};
use snap_dom::{Document, NodeId};
use url::Url;

use crate::capture::{style_attribute, style_css, StyleMap, StyleMetadata};
use crate::escape::unescape_html;
use crate::{CaptureError, FrameCapture, Viewport};

/// Rounds of set-then-compare per element
const MAX_ITERATIONS: usize = 5;

/// Element of a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleTarget {
    /// The document element
    Root,
    /// Element with this id
    Id(String),
}

/// Offscreen render of a document
pub trait BaselineRenderer {
    /// Render `html` at the given viewport size
    fn render(&self, html: &str, viewport: Viewport) -> Result<Box<dyn RenderedPage>, CaptureError>;
}

/// A rendered document whose inline styles can be changed
pub trait RenderedPage {
    /// Replace the inline style of `target`; false if there is no such element
    fn set_inline_style(&mut self, target: &StyleTarget, css: &str) -> bool;

    /// Current computed style of `target`
    fn computed_style(&self, target: &StyleTarget) -> Option<ComputedStyle>;
}

/// Renders with the crate's own HTML parser and style resolver
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolverRenderer;

impl ResolverRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl BaselineRenderer for ResolverRenderer {
    fn render(&self, html: &str, viewport: Viewport) -> Result<Box<dyn RenderedPage>, CaptureError> {
        let url = Url::parse("about:blank").map_err(|e| CaptureError::BaselineRender(e.to_string()))?;
        let document = snap_html::parse(html, url);
        tracing::debug!(
            "Baseline render: {} nodes at {}x{}",
            document.tree().len(),
            viewport.width,
            viewport.height
        );
        Ok(Box::new(ResolvedPage::new(document)))
    }
}

/// Page rendered by [`ResolverRenderer`]
struct ResolvedPage {
    document: Document,
    styles: StyleResolver,
    ids: HashMap<String, NodeId>,
}

impl ResolvedPage {
    fn new(document: Document) -> Self {
        let styles = StyleResolver::for_document(&document);

        // The root is addressed on its own, and a repeated id names the
        // first element carrying it
        let mut ids = HashMap::new();
        let tree = document.tree();
        let root = document.document_element();
        for (id, node) in tree.descendants(tree.root()) {
            if Some(id) == root {
                continue;
            }
            if let Some(value) = node.as_element().and_then(|e| e.id()) {
                ids.entry(value.to_string()).or_insert(id);
            }
        }

        Self { document, styles, ids }
    }

    fn node(&self, target: &StyleTarget) -> Option<NodeId> {
        match target {
            StyleTarget::Root => self.document.document_element(),
            StyleTarget::Id(id) => self.ids.get(id).copied(),
        }
    }
}

impl RenderedPage for ResolvedPage {
    fn set_inline_style(&mut self, target: &StyleTarget, css: &str) -> bool {
        let Some(node) = self.node(target) else { return false };
        self.document.tree_mut().set_attribute(node, "style", css);
        true
    }

    fn computed_style(&self, target: &StyleTarget) -> Option<ComputedStyle> {
        let node = self.node(target)?;
        Some(self.styles.computed_style(self.document.tree(), node))
    }
}

/// Minimize the captured styles of one frame and write them into its
/// style holes.
///
/// The frame's child frames must already be spliced in. Returns the
/// number of elements whose style was minimized.
pub fn minimize_frame(renderer: &dyn BaselineRenderer, capture: &mut FrameCapture) -> Result<usize, CaptureError> {
    let Some(meta) = capture.style.take() else { return Ok(0) };
    let depth = capture.depth();

    let mut text = capture.text();
    for _ in 0..depth {
        text = unescape_html(&text);
    }

    let viewport = Viewport { width: meta.window_width, height: meta.window_height };
    let mut page = match renderer.render(&text, viewport) {
        Ok(page) => page,
        Err(e) => {
            capture.style = Some(meta);
            return Err(e);
        }
    };

    let mut minimized = 0;
    for (target, index, original) in targets(&meta) {
        let Some(required) = minimize_element(page.as_mut(), &target, original) else {
            tracing::debug!("Frame {}: {:?} missing from baseline", capture.frame_index, target);
            continue;
        };
        capture.html.fill(index, style_attribute(&style_css(&required), depth));
        minimized += 1;
    }

    tracing::debug!("Frame {}: minimized {} element styles", capture.frame_index, minimized);
    capture.style = Some(meta);
    Ok(minimized)
}

/// Root first, then every id in buffer order
fn targets(meta: &StyleMetadata) -> Vec<(StyleTarget, usize, &StyleMap)> {
    let mut out: Vec<_> = meta
        .id_to_style_index
        .iter()
        .filter_map(|(id, index)| {
            let map = meta.id_to_style_map.get(id)?;
            Some((StyleTarget::Id(id.clone()), *index, map))
        })
        .collect();
    out.sort_by_key(|(_, index, _)| *index);

    if let Some(index) = meta.root_style_index {
        out.insert(0, (StyleTarget::Root, index, &meta.root_style));
    }
    out
}

/// Smallest subset of `original` that reproduces it on `target`
fn minimize_element(page: &mut dyn RenderedPage, target: &StyleTarget, original: &StyleMap) -> Option<StyleMap> {
    let mut required = StyleMap::new();

    for _ in 0..MAX_ITERATIONS {
        if !page.set_inline_style(target, &style_css(&required)) {
            return None;
        }
        let current = page.computed_style(target)?;

        let mut added = false;
        for (name, value) in original {
            if required.contains_key(name) {
                continue;
            }
            if current.get(name) != Some(value.as_str()) {
                required.insert(name.clone(), value.clone());
                added = true;
            }
        }
        if !added {
            return Some(required);
        }
    }

    page.set_inline_style(target, &style_css(&required));
    Some(required)
}
