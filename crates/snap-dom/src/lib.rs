//! snapit DOM - Document Object Model
//!
//! Arena-based DOM trees plus the frame tree that links an `<iframe>`
//! element to the document loaded inside it.

mod node;
mod tree;
mod document;
mod frames;

pub use node::{Node, NodeData, ElementData, Attribute, TextData};
pub use tree::{DomTree, Children, Descendants};
pub use document::{Document, StyleSheetRef};
pub use frames::{Frame, FrameId, FrameTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
