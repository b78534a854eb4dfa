//! Per-frame capture results
//!
//! What one frame hands to the collector: its fragment buffer, the holes
//! still open in it, its address and, when minimizing, the captured
//! styles keyed by element id. Field names serialize in camelCase so a
//! capture can cross a message channel as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::escape::{char_encoding, escape_text, escape_unicode, TextKind};
use crate::{Buffer, FrameAddress};

/// Property → value, as captured from a computed style
pub type StyleMap = BTreeMap<String, String>;

/// Style metadata recorded by the minimizing serializer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMetadata {
    /// Element id → buffer index of its `style` hole
    pub id_to_style_index: BTreeMap<String, usize>,
    /// Element id → captured computed style
    pub id_to_style_map: BTreeMap<String, StyleMap>,
    pub window_width: u32,
    pub window_height: u32,
    /// Style hole of the document element
    pub root_style_index: Option<usize>,
    /// Captured computed style of the document element
    pub root_style: StyleMap,
}

/// One frame's serialized document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCapture {
    pub html: Buffer,
    /// Buffer index → resource still to be inlined
    pub src_holes: BTreeMap<usize, Url>,
    /// Buffer index → child frame whose text goes there
    pub frame_holes: BTreeMap<usize, FrameAddress>,
    /// Address of the captured frame
    pub frame_index: FrameAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMetadata>,
}

impl FrameCapture {
    /// Nesting depth of the frame
    pub fn depth(&self) -> usize {
        self.frame_index.depth()
    }

    /// Current text of the buffer
    pub fn text(&self) -> String {
        self.html.join()
    }

    /// Write every captured style, unminimized, into its hole
    pub fn fill_style_holes(&mut self) {
        let Some(meta) = self.style.take() else { return };
        let depth = self.depth();

        if let Some(index) = meta.root_style_index {
            self.html.fill(index, style_attribute(&style_css(&meta.root_style), depth));
        }
        for (id, index) in &meta.id_to_style_index {
            if let Some(map) = meta.id_to_style_map.get(id) {
                self.html.fill(*index, style_attribute(&style_css(map), depth));
            }
        }
        self.style = Some(meta);
    }
}

/// `prop: value;` list in map order
pub fn style_css(map: &StyleMap) -> String {
    map.iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `name="value" ` with the value escaped one level below the quotes
pub fn attribute(name: &str, value: &str, depth: usize) -> String {
    let quote = char_encoding('"', depth);
    let value = escape_unicode(&escape_text(value, depth + 1), TextKind::Html);
    format!("{}={}{}{} ", name, quote, value, quote)
}

/// The `style` attribute fragment, or nothing for an empty style
pub fn style_attribute(css: &str, depth: usize) -> String {
    if css.is_empty() {
        String::new()
    } else {
        attribute("style", css, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_levels() {
        assert_eq!(attribute("title", "a\"b", 0), "title=\"a&quot;b\" ");
        assert_eq!(attribute("title", "a\"b", 1), "title=&quot;a&amp;quot;b&quot; ");
        assert_eq!(attribute("alt", "café", 0), "alt=\"caf&#233;\" ");
    }

    #[test]
    fn test_style_css() {
        let map: StyleMap = [("width", "5px"), ("color", "red")]
            .iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(style_css(&map), "color: red; width: 5px;");
        assert_eq!(style_attribute("", 2), "");
    }

    #[test]
    fn test_json_shape() {
        let mut html = Buffer::new();
        html.push("<!DOCTYPE html>\n");
        let capture = FrameCapture {
            html,
            src_holes: BTreeMap::new(),
            frame_holes: [(3, FrameAddress::root().child(0))].into_iter().collect(),
            frame_index: FrameAddress::root(),
            style: None,
        };
        let json = serde_json::to_value(&capture).unwrap();
        assert_eq!(json["frameIndex"], "0");
        assert_eq!(json["frameHoles"]["3"], "0.0");
        assert!(json.get("style").is_none());

        let back: FrameCapture = serde_json::from_value(json).unwrap();
        assert_eq!(back, capture);
    }
}
