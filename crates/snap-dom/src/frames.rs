//! Frame Tree
//!
//! The browsing-context hierarchy: the top document plus one frame per
//! loaded `<iframe>`, each owning its own `Document`. A frame may see its
//! ancestors and its list of child frames, but never another frame's DOM;
//! capture code must only read `document(frame)` for the frame it serves.

use crate::{Document, NodeId};

/// Frame identifier (index into the frame arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) u32);

impl FrameId {
    /// The top-level frame
    pub const TOP: FrameId = FrameId(0);
}

/// A browsing context
#[derive(Debug, Clone)]
pub struct Frame {
    /// Containing frame (None for the top document)
    pub parent: Option<FrameId>,
    /// Child frames in document order of their `<iframe>` elements
    pub children: Vec<FrameId>,
    /// The `<iframe>` element in the parent document hosting this frame
    pub host: Option<NodeId>,
    /// The frame's document
    pub document: Document,
}

/// Arena of frames rooted at the top document
#[derive(Debug, Clone)]
pub struct FrameTree {
    frames: Vec<Frame>,
}

impl FrameTree {
    /// Create a frame tree holding just the top document
    pub fn new(top: Document) -> Self {
        Self {
            frames: vec![Frame {
                parent: None,
                children: Vec::new(),
                host: None,
                document: top,
            }],
        }
    }

    /// The top-level frame
    pub fn root(&self) -> FrameId {
        FrameId::TOP
    }

    /// Get a frame
    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id.0 as usize)
    }

    /// Get a frame's document
    pub fn document(&self, id: FrameId) -> Option<&Document> {
        self.get(id).map(|f| &f.document)
    }

    /// Get a frame's document mutably
    pub fn document_mut(&mut self, id: FrameId) -> Option<&mut Document> {
        self.frames.get_mut(id.0 as usize).map(|f| &mut f.document)
    }

    /// Parent frame
    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.get(id).and_then(|f| f.parent)
    }

    /// Child frames in document order
    pub fn children(&self, id: FrameId) -> &[FrameId] {
        self.get(id).map(|f| f.children.as_slice()).unwrap_or(&[])
    }

    /// Attach `document` as a child frame of `parent`, hosted by the
    /// `<iframe>` element `host` of the parent document.
    ///
    /// Children must be added in document order of their host elements.
    pub fn add_child(&mut self, parent: FrameId, host: NodeId, document: Document) -> Option<FrameId> {
        self.get(parent)?;
        let id = FrameId(self.frames.len() as u32);
        tracing::debug!("Attaching frame {:?} under {:?} ({})", id, parent, document.url());
        self.frames.push(Frame {
            parent: Some(parent),
            children: Vec::new(),
            host: Some(host),
            document,
        });
        self.frames[parent.0 as usize].children.push(id);
        Some(id)
    }

    /// The frame loaded by the `<iframe>` element `host` of `parent`
    /// (the element's `contentWindow`)
    pub fn content_frame(&self, parent: FrameId, host: NodeId) -> Option<FrameId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.get(*child).and_then(|f| f.host) == Some(host))
    }

    /// All frames, parents before children
    pub fn frame_ids(&self) -> Vec<FrameId> {
        let mut out = Vec::with_capacity(self.frames.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: a tree has at least the top frame
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn doc(s: &str) -> Document {
        Document::new(Url::parse(s).unwrap())
    }

    #[test]
    fn test_add_children_in_order() {
        let mut top = doc("https://example.com/");
        let body = top.body().unwrap();
        let a = top.tree_mut().append_element(body, "iframe");
        let b = top.tree_mut().append_element(body, "iframe");

        let mut frames = FrameTree::new(top);
        let fa = frames.add_child(FrameId::TOP, a, doc("https://example.com/a")).unwrap();
        let fb = frames.add_child(FrameId::TOP, b, doc("https://example.com/b")).unwrap();

        assert_eq!(frames.children(FrameId::TOP), &[fa, fb]);
        assert_eq!(frames.parent(fb), Some(FrameId::TOP));
        assert_eq!(frames.content_frame(FrameId::TOP, b), Some(fb));
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_frame_ids_pre_order() {
        let top = doc("https://example.com/");
        let mut frames = FrameTree::new(top);
        let a = frames.add_child(FrameId::TOP, NodeId(1), doc("https://example.com/a")).unwrap();
        let b = frames.add_child(FrameId::TOP, NodeId(2), doc("https://example.com/b")).unwrap();
        let aa = frames.add_child(a, NodeId(1), doc("https://example.com/aa")).unwrap();

        assert_eq!(frames.frame_ids(), vec![FrameId::TOP, a, aa, b]);
    }

    #[test]
    fn test_add_child_to_unknown_parent() {
        let mut frames = FrameTree::new(doc("https://example.com/"));
        assert!(frames.add_child(FrameId(9), NodeId(1), doc("https://example.com/x")).is_none());
    }
}
