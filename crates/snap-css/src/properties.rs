//! CSS Properties
//!
//! Known longhand properties with their initial values and inheritance,
//! plus the user-agent defaults applied before author styles.

use crate::Declaration;

/// (name, initial value, inherited)
pub(crate) const INITIAL_VALUES: &[(&str, &str, bool)] = &[
    // Animation
    ("animation-delay", "0s", false),
    ("animation-direction", "normal", false),
    ("animation-duration", "0s", false),
    ("animation-fill-mode", "none", false),
    ("animation-iteration-count", "1", false),
    ("animation-name", "none", false),
    ("animation-play-state", "running", false),
    ("animation-timing-function", "ease", false),
    // Background
    ("background-attachment", "scroll", false),
    ("background-color", "rgba(0, 0, 0, 0)", false),
    ("background-image", "none", false),
    ("background-position", "0% 0%", false),
    ("background-repeat", "repeat", false),
    // Border
    ("border-bottom-color", "currentcolor", false),
    ("border-bottom-style", "none", false),
    ("border-bottom-width", "0px", false),
    ("border-left-color", "currentcolor", false),
    ("border-left-style", "none", false),
    ("border-left-width", "0px", false),
    ("border-right-color", "currentcolor", false),
    ("border-right-style", "none", false),
    ("border-right-width", "0px", false),
    ("border-top-color", "currentcolor", false),
    ("border-top-style", "none", false),
    ("border-top-width", "0px", false),
    // Box model
    ("box-sizing", "content-box", false),
    ("display", "inline", false),
    ("float", "none", false),
    ("height", "auto", false),
    ("margin-bottom", "0px", false),
    ("margin-left", "0px", false),
    ("margin-right", "0px", false),
    ("margin-top", "0px", false),
    ("max-height", "none", false),
    ("max-width", "none", false),
    ("min-height", "0px", false),
    ("min-width", "0px", false),
    ("overflow-x", "visible", false),
    ("overflow-y", "visible", false),
    ("padding-bottom", "0px", false),
    ("padding-left", "0px", false),
    ("padding-right", "0px", false),
    ("padding-top", "0px", false),
    ("width", "auto", false),
    // Positioning
    ("bottom", "auto", false),
    ("left", "auto", false),
    ("position", "static", false),
    ("right", "auto", false),
    ("top", "auto", false),
    ("z-index", "auto", false),
    // Generated content
    ("content", "normal", false),
    ("opacity", "1", false),
    ("transform", "none", false),
    ("vertical-align", "baseline", false),
    // Inherited
    ("color", "rgb(0, 0, 0)", true),
    ("cursor", "auto", true),
    ("direction", "ltr", true),
    ("font-family", "serif", true),
    ("font-size", "16px", true),
    ("font-style", "normal", true),
    ("font-weight", "400", true),
    ("letter-spacing", "normal", true),
    ("line-height", "normal", true),
    ("list-style-type", "disc", true),
    ("text-align", "start", true),
    ("text-decoration-line", "none", false),
    ("text-indent", "0px", true),
    ("text-transform", "none", true),
    ("visibility", "visible", true),
    ("white-space", "normal", true),
    ("word-spacing", "0px", true),
];

/// Initial value of a property, if known
pub fn initial_value(name: &str) -> Option<&'static str> {
    INITIAL_VALUES.iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, v, _)| *v)
}

/// Whether a property inherits by default.
///
/// Custom properties (`--*`) inherit; unknown properties do not.
pub fn is_inherited(name: &str) -> bool {
    if name.starts_with("--") {
        return true;
    }
    INITIAL_VALUES.iter()
        .find(|(n, _, _)| *n == name)
        .is_some_and(|(_, _, inherited)| *inherited)
}

/// User-agent declarations for an element
pub(crate) fn ua_declarations(tag: &str) -> Vec<Declaration> {
    let list: &[(&str, &str)] = match tag {
        "html" | "address" | "article" | "aside" | "blockquote" | "details"
        | "dialog" | "dd" | "div" | "dl" | "dt" | "fieldset" | "figcaption"
        | "figure" | "footer" | "form" | "header" | "hgroup" | "main" | "nav"
        | "section" | "summary" => &[("display", "block")],
        "body" => &[("display", "block"), ("margin-top", "8px"), ("margin-right", "8px"),
            ("margin-bottom", "8px"), ("margin-left", "8px")],
        "p" => &[("display", "block"), ("margin-top", "16px"), ("margin-bottom", "16px")],
        "h1" => &[("display", "block"), ("font-size", "32px"), ("font-weight", "700"),
            ("margin-top", "21.44px"), ("margin-bottom", "21.44px")],
        "h2" => &[("display", "block"), ("font-size", "24px"), ("font-weight", "700"),
            ("margin-top", "19.92px"), ("margin-bottom", "19.92px")],
        "h3" | "h4" | "h5" | "h6" => &[("display", "block"), ("font-weight", "700")],
        "ul" | "ol" | "menu" => &[("display", "block"), ("margin-top", "16px"),
            ("margin-bottom", "16px"), ("padding-left", "40px")],
        "li" => &[("display", "list-item")],
        "head" | "script" | "style" | "link" | "meta" | "title" | "base"
        | "template" | "noscript" => &[("display", "none")],
        "b" | "strong" | "th" => &[("font-weight", "700")],
        "i" | "em" | "cite" | "var" | "dfn" => &[("font-style", "italic")],
        "u" | "ins" => &[("text-decoration-line", "underline")],
        "s" | "strike" | "del" => &[("text-decoration-line", "line-through")],
        "code" | "kbd" | "samp" | "pre" => &[("font-family", "monospace")],
        "a" => &[("color", "rgb(0, 0, 238)"), ("cursor", "pointer"),
            ("text-decoration-line", "underline")],
        "table" => &[("display", "table")],
        "tr" => &[("display", "table-row")],
        "td" => &[("display", "table-cell")],
        "img" | "iframe" | "input" | "button" | "select" | "textarea" => &[("display", "inline-block")],
        _ => &[],
    };
    list.iter().map(|(n, v)| Declaration::new(n, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        assert_eq!(initial_value("width"), Some("auto"));
        assert_eq!(initial_value("animation-delay"), Some("0s"));
        assert_eq!(initial_value("not-a-property"), None);
    }

    #[test]
    fn test_inheritance() {
        assert!(is_inherited("color"));
        assert!(is_inherited("--accent"));
        assert!(!is_inherited("width"));
        assert!(!is_inherited("unknown"));
    }

    #[test]
    fn test_ua_defaults() {
        assert!(ua_declarations("div").iter().any(|d| d.property == "display" && d.value == "block"));
        assert!(ua_declarations("span").is_empty());
    }
}
