//! Fragment buffer and hole registry
//!
//! Serialization appends fragments; holes are indices reserved as empty
//! fragments and overwritten once their content is known. Indices never
//! move, so they stay valid handles for the life of the capture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::FrameAddress;

/// Ordered string fragments; the output is their concatenation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buffer {
    fragments: Vec<String>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, returning its index
    pub fn push(&mut self, fragment: impl Into<String>) -> usize {
        self.fragments.push(fragment.into());
        self.fragments.len() - 1
    }

    /// Reserve an empty fragment to fill later
    pub fn reserve(&mut self) -> usize {
        self.push(String::new())
    }

    /// Overwrite the fragment at `index`
    pub fn fill(&mut self, index: usize, content: impl Into<String>) {
        if let Some(slot) = self.fragments.get_mut(index) {
            *slot = content.into();
        } else {
            tracing::warn!("Ignoring fill of unknown buffer slot {}", index);
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Concatenate all fragments
    pub fn join(&self) -> String {
        self.fragments.concat()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<String> {
        self.fragments
    }
}

impl From<Vec<String>> for Buffer {
    fn from(fragments: Vec<String>) -> Self {
        Self { fragments }
    }
}

/// Pending holes of one buffer
#[derive(Debug, Clone, Default)]
pub struct Holes {
    /// Buffer index → resource to inline
    pub src: BTreeMap<usize, Url>,
    /// Buffer index → child frame whose text goes there
    pub frames: BTreeMap<usize, FrameAddress>,
}

impl Holes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty() && self.frames.is_empty()
    }
}
