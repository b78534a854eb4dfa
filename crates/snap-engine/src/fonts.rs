//! `@font-face` extraction
//!
//! Pulls font declarations out of stylesheet text and rewrites their
//! `url(...)` references to absolute URLs so the rules still work once
//! inlined into a document with a different base.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

static FONT_FACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@font-face\s*\{[^}]*\}").expect("font-face regex"));

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#).expect("css url regex")
});

static SRC_DESCRIPTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^|[{;\s])src\s*:").expect("src descriptor regex"));

/// Every well-formed `@font-face` rule in `css`, with urls made absolute
/// against `base`. Rules without a `src` descriptor are skipped.
pub fn extract_font_faces(css: &str, base: &Url) -> Vec<String> {
    FONT_FACE
        .find_iter(css)
        .filter_map(|m| {
            let rule = m.as_str();
            if !SRC_DESCRIPTOR.is_match(rule) {
                tracing::warn!("Skipping @font-face without src in {}", base);
                return None;
            }
            Some(absolutize_urls(rule, base))
        })
        .collect()
}

/// Rewrite each `url(...)` in `css` to an absolute, double-quoted URL.
///
/// `data:` URLs pass through; references that fail to resolve are kept.
pub fn absolutize_urls(css: &str, base: &Url) -> String {
    CSS_URL
        .replace_all(css, |caps: &Captures<'_>| {
            let reference = [1, 2, 3]
                .iter()
                .find_map(|i| caps.get(*i))
                .map(|m| m.as_str().trim())
                .unwrap_or("");

            if reference.is_empty() {
                return caps[0].to_string();
            }
            if reference.len() >= 5 && reference[..5].eq_ignore_ascii_case("data:") {
                return format!("url(\"{}\")", reference);
            }
            match base.join(reference) {
                Ok(url) => format!("url(\"{}\")", url),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}
