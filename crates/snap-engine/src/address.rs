//! Frame Address Resolver
//!
//! A frame is named by the dotted path of sibling indices from the top
//! document: the root is `0`, its second iframe `0.1`, that iframe's first
//! child `0.1.0`. The number of components minus one is the frame's
//! nesting depth, which drives the escaping level of everything it emits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snap_dom::{FrameId, FrameTree};

use crate::CaptureError;

/// Dotted frame path such as `0.2.1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameAddress(Vec<u32>);

impl FrameAddress {
    /// The top-level document
    pub fn root() -> Self {
        Self(vec![0])
    }

    /// Address of the `index`-th child frame
    pub fn child(&self, index: u32) -> Self {
        let mut parts = self.0.clone();
        parts.push(index);
        Self(parts)
    }

    /// Containing frame, None for the root
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Nesting depth: components minus one
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Path components
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for FrameAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl FromStr for FrameAddress {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| CaptureError::InvalidAddress(s.to_string()))?;
        match parts.first() {
            Some(0) => Ok(Self(parts)),
            _ => Err(CaptureError::InvalidAddress(s.to_string())),
        }
    }
}

impl Serialize for FrameAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FrameAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Position of `frame` among its parent's child frames, None for the root
pub fn index_in_parent(frames: &FrameTree, frame: FrameId) -> Result<Option<usize>, CaptureError> {
    frames.get(frame).ok_or(CaptureError::UnknownFrame)?;
    let Some(parent) = frames.parent(frame) else {
        return Ok(None);
    };
    frames
        .children(parent)
        .iter()
        .position(|c| *c == frame)
        .map(Some)
        .ok_or(CaptureError::UnknownFrame)
}

/// Full dotted address of `frame`
pub fn fully_qualified_address(frames: &FrameTree, frame: FrameId) -> Result<FrameAddress, CaptureError> {
    let mut indices = Vec::new();
    let mut cur = frame;
    while let Some(index) = index_in_parent(frames, cur)? {
        indices.push(index as u32);
        cur = frames.parent(cur).ok_or(CaptureError::UnknownFrame)?;
    }
    indices.push(0);
    indices.reverse();
    Ok(FrameAddress(indices))
}

/// Nesting depth of `frame` (0 for the top document)
pub fn depth(frames: &FrameTree, frame: FrameId) -> Result<usize, CaptureError> {
    fully_qualified_address(frames, frame).map(|a| a.depth())
}
