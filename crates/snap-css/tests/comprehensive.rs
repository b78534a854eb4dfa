//! Comprehensive tests for snap-css
//!
//! Tests parsing edge cases and style computation on parsed documents.

use snap_css::{parse_stylesheet, ComputedStyle, CssParser, PseudoElement, StyleResolver, StyleSource};
use url::Url;

fn load(html: &str) -> snap_html::Document {
    snap_html::parse(html, Url::parse("https://example.com/").unwrap())
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_empty() {
    let stylesheet = CssParser::new().parse("").unwrap();
    assert_eq!(stylesheet.len(), 0);
}

#[test]
fn test_parse_multiple_rules() {
    let css = r#"
        .foo { color: red; }
        .bar { background: blue; }
        #baz { display: flex; }
    "#;
    let stylesheet = parse_stylesheet(css).unwrap();
    assert_eq!(stylesheet.len(), 3);
}

#[test]
fn test_parse_skips_unsupported_selectors() {
    let css = r#"
        div.container > p.text { color: black; }
        a:hover { color: blue; }
        h1 + h2 { margin: 0; }
        input[type="text"] { width: 3px; }
    "#;
    let stylesheet = parse_stylesheet(css).unwrap();
    assert_eq!(stylesheet.len(), 2);
}

#[test]
fn test_parse_font_face_ignored() {
    let css = r#"
        @font-face { font-family: "X"; src: url(x.woff2); }
        p { width: 1px }
    "#;
    let stylesheet = parse_stylesheet(css).unwrap();
    assert_eq!(stylesheet.len(), 1);
}

// ============================================================================
// COMPUTED STYLES
// ============================================================================

#[test]
fn test_document_stylesheets_apply() {
    let doc = load(r#"<html><head><style>#a { width: 5px }</style></head>
        <body><div id="a">x</div></body></html>"#);
    let resolver = StyleResolver::for_document(&doc);
    let div = doc.get_element_by_id("a").unwrap();

    let style = resolver.computed_style(doc.tree(), div);
    assert_eq!(style.get("width"), Some("5px"));
    assert_eq!(style.get("display"), Some("block"));
    assert_eq!(style.get("animation-delay"), Some("0s"));
}

#[test]
fn test_style_attribute_wins() {
    let doc = load(r#"<style>div { height: 1px }</style><div style="height: 2px">x</div>"#);
    let resolver = StyleResolver::for_document(&doc);
    let div = doc.elements_by_tag("div")[0];
    assert_eq!(resolver.computed_style(doc.tree(), div).get("height"), Some("2px"));
}

#[test]
fn test_linked_sheet_without_text_is_skipped() {
    let doc = load(r#"<link rel="stylesheet" href="/a.css"><p>x</p>"#);
    let resolver = StyleResolver::for_document(&doc);
    assert!(resolver.is_empty());
}

#[test]
fn test_pseudo_elements() {
    let doc = load(r#"<style>
        li:before { content: "\2022" }
        li:after { content: none }
    </style><ul><li>one</li></ul>"#);
    let resolver = StyleResolver::for_document(&doc);
    let li = doc.elements_by_tag("li")[0];

    let before = resolver.pseudo_style(doc.tree(), li, PseudoElement::Before).unwrap();
    assert!(before.has_content());
    let after = resolver.pseudo_style(doc.tree(), li, PseudoElement::After).unwrap();
    assert!(!after.has_content());
}

#[test]
fn test_computed_style_css_text() {
    let style: ComputedStyle = vec![
        ("width".to_string(), "5px".to_string()),
        ("animation-delay".to_string(), "0s".to_string()),
    ].into_iter().collect();
    assert_eq!(style.css_text(), "width: 5px; animation-delay: 0s;");
}
