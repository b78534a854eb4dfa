//! snapit HTML Parser
//!
//! Builds `snap_dom` documents from HTML text with html5ever. Used to
//! load pages for capture and to render reassembled output for the style
//! minimizer's baseline.

mod parser;

pub use parser::HtmlParser;
pub use snap_dom::Document;

use url::Url;

/// Parse an HTML string into a document located at `url`
pub fn parse(html: &str, url: Url) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
