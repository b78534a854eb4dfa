//! Computed Style
//!
//! An ordered property → value map, the equivalent of what
//! `getComputedStyle()` exposes. Order is stable so `css_text()` is
//! deterministic.

use crate::properties::INITIAL_VALUES;
use crate::parse_declarations;

/// Fully resolved style of one element or pseudo-element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    props: Vec<(String, String)>,
}

impl ComputedStyle {
    /// Empty style (no properties)
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known property at its initial value
    pub fn initial() -> Self {
        INITIAL_VALUES.iter()
            .map(|(name, value, _)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Parse `prop: value; ...` text (the `cssText` form)
    pub fn parse(text: &str) -> Self {
        parse_declarations(text)
            .into_iter()
            .map(|d| (d.property, d.value))
            .collect()
    }

    /// Value of a property
    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its position if already present
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.props.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            self.props.push((name.to_string(), value.to_string()));
        }
    }

    /// Remove a property
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.props.iter().position(|(n, _)| n == name)?;
        Some(self.props.remove(pos).1)
    }

    /// Whether a property is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Properties in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Serialize as `prop: value; prop: value;`
    pub fn css_text(&self) -> String {
        self.props.iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether generated content is present: `content` is set to
    /// something other than `none`/`normal`/empty.
    pub fn has_content(&self) -> bool {
        match self.get("content").map(str::trim) {
            None | Some("") | Some("none") | Some("normal") => false,
            Some(_) => true,
        }
    }
}

impl FromIterator<(String, String)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut style = ComputedStyle::new();
        for (name, value) in iter {
            style.set(&name, &value);
        }
        style
    }
}
