//! Comprehensive tests for snap-html
//!
//! Document building details the capture pipeline relies on.

use snap_html::{HtmlParser, parse};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_parse_minimal_html() {
    let doc = HtmlParser::new().parse("");
    assert!(doc.tree().len() >= 1, "Even empty HTML should have root");
    assert!(doc.document_element().is_some());
}

#[test]
fn test_doctype_is_kept_as_node() {
    let doc = HtmlParser::new().parse("<!DOCTYPE html><p>x</p>");
    let root = doc.tree().root();
    let first = doc.tree().children(root).next().unwrap().1;
    assert!(first.is_doctype());
}

#[test]
fn test_text_entities_are_decoded() {
    let doc = HtmlParser::new().parse("<p>a &lt;b&gt; &amp; &quot;c&quot;</p>");
    let p = doc.elements_by_tag("p")[0];
    assert_eq!(doc.tree().text_content(p), "a <b> & \"c\"");
}

#[test]
fn test_srcdoc_attribute_is_decoded_once() {
    let doc = HtmlParser::new().parse(r#"<iframe srcdoc="<p class=&quot;x&quot;>hi</p>"></iframe>"#);
    let iframe = doc.elements_by_tag("iframe")[0];
    let srcdoc = doc.tree().element(iframe).unwrap().get_attr("srcdoc").unwrap();
    assert_eq!(srcdoc, r#"<p class="x">hi</p>"#);
}

#[test]
fn test_comments_are_nodes() {
    let doc = HtmlParser::new().parse("<body><!-- note --><p>x</p></body>");
    let body = doc.body().unwrap();
    let kinds: Vec<bool> = doc.tree().children(body).map(|(_, n)| n.is_element()).collect();
    assert_eq!(kinds, vec![false, true]);
}

// ============================================================================
// BASE URL AND STYLESHEETS
// ============================================================================

#[test]
fn test_base_href() {
    let html = r#"<head><base href="/static/"></head><body><img src="a.png"></body>"#;
    let doc = parse(html, url("https://example.com/pages/index.html"));
    assert_eq!(doc.base_url().as_str(), "https://example.com/static/");
    assert_eq!(doc.resolve_url("a.png").unwrap().as_str(), "https://example.com/static/a.png");
}

#[test]
fn test_stylesheets_in_document_order() {
    let html = r#"
        <head>
            <link rel="stylesheet" href="https://fonts.example.net/css">
            <style>p { color: red; }</style>
            <link rel="icon" href="favicon.ico">
            <link rel="alternate stylesheet" href="alt.css">
        </head>
    "#;
    let doc = parse(html, url("https://example.com/"));
    let sheets = doc.style_sheets();
    assert_eq!(sheets.len(), 3);

    assert_eq!(sheets[0].href.as_ref().unwrap().as_str(), "https://fonts.example.net/css");
    assert!(!sheets[0].is_accessible());

    assert!(sheets[1].href.is_none());
    assert_eq!(sheets[1].text.as_deref(), Some("p { color: red; }"));
    assert!(sheets[1].is_accessible());

    assert_eq!(sheets[2].href.as_ref().unwrap().as_str(), "https://example.com/alt.css");
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let doc = HtmlParser::new().parse("<div><p><span>text");
    assert_eq!(doc.elements_by_tag("span").len(), 1);
}

#[test]
fn test_parse_orphan_closing_tag() {
    let doc = HtmlParser::new().parse("</div>");
    assert!(doc.body().is_some());
}
