//! snapit CSS & Style System
//!
//! Stylesheet parsing and a small cascade that yields computed styles for
//! elements and their `:before`/`:after` pseudo-elements.

mod parser;
mod cascade;
mod computed;
mod properties;
mod selectors;

pub use parser::CssParser;
pub use cascade::{StyleResolver, StyleSource};
pub use computed::ComputedStyle;
pub use properties::{initial_value, is_inherited};
pub use selectors::{PseudoElement, Selector, Specificity};

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Parsed stylesheet
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of style rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// CSS rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important: false,
        }
    }
}

/// Parse a declaration list such as a `style` attribute or `cssText`.
///
/// Goes through the same path as stylesheet declarations, so values and
/// shorthands come out the same either way. Normal declarations precede
/// `!important` ones.
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    CssParser::new().parse_declarations(text)
}

/// Split `text` on `sep`, ignoring separators inside quotes or parentheses
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("width: 5px; COLOR: Red ;; content: \"a;b\"");
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0], Declaration::new("width", "5px"));
        assert_eq!(decls[1].property, "color");
        assert_eq!(decls[1].value, "red");
        assert_eq!(decls[2].property, "content");
        assert!(decls[2].value.contains("a;b"));
    }

    #[test]
    fn test_parse_important() {
        let decls = parse_declarations("color: red !important; width: 5px");
        let color = decls.iter().find(|d| d.property == "color").unwrap();
        assert!(color.important);
        assert_eq!(color.value, "red");
        assert!(!decls.iter().find(|d| d.property == "width").unwrap().important);
    }

    #[test]
    fn test_split_selector_list() {
        assert_eq!(split_top_level("a, b:not(c, d), e", ','), vec!["a", " b:not(c, d)", " e"]);
    }
}
