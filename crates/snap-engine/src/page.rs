//! Page - a loaded document and all of its frames
//!
//! Loading fetches the top document, then walks it breadth-first for
//! `<iframe>` elements, giving each one a child frame: `srcdoc` content
//! is parsed in place, `src` documents are fetched, anything else gets an
//! empty `about:blank` document. Linked stylesheets of every frame are
//! fetched so the frame can be styled.

use std::collections::VecDeque;
use std::sync::LazyLock;

use snap_dom::{Document, FrameTree, NodeId};
use snap_net::Fetcher;
use url::Url;

use crate::serializer::same_origin;
use crate::{CaptureConfig, CaptureError};

static ABOUT_BLANK: LazyLock<Url> = LazyLock::new(|| Url::parse("about:blank").expect("about:blank"));
static ABOUT_SRCDOC: LazyLock<Url> = LazyLock::new(|| Url::parse("about:srcdoc").expect("about:srcdoc"));

/// A loaded web page
#[derive(Debug, Clone)]
pub struct Page {
    frames: FrameTree,
}

/// How an `<iframe>` gets its document
enum FrameSource {
    Srcdoc(String),
    Src(Url),
    Blank,
}

impl Page {
    /// Page over an existing frame tree
    pub fn new(frames: FrameTree) -> Self {
        Self { frames }
    }

    /// Page with just the top document parsed from `html`; no frames
    /// or stylesheets are loaded
    pub fn from_html(html: &str, url: Url) -> Self {
        Self::new(FrameTree::new(snap_html::parse(html, url)))
    }

    /// Fetch and load the page at `url`
    pub async fn load<F: Fetcher>(url: &Url, fetcher: &F, config: &CaptureConfig) -> Result<Self, CaptureError> {
        tracing::info!("Loading: {}", url);
        let response = fetcher.fetch(url).await?.error_for_status()?;
        Self::load_html(&response.text(), url.clone(), fetcher, config).await
    }

    /// Load a page from already-fetched HTML, fetching its frames and
    /// stylesheets
    pub async fn load_html<F: Fetcher>(
        html: &str,
        url: Url,
        fetcher: &F,
        config: &CaptureConfig,
    ) -> Result<Self, CaptureError> {
        let mut top = snap_html::parse(html, url);
        let top_url = top.url().clone();
        load_style_sheets(&mut top, &top_url, fetcher).await;

        let mut frames = FrameTree::new(top);
        let mut queue = VecDeque::from([(frames.root(), 0usize)]);

        while let Some((frame, depth)) = queue.pop_front() {
            let Some(document) = frames.document(frame) else { continue };
            let hosts = iframe_sources(document);
            if hosts.is_empty() {
                continue;
            }
            if depth >= config.max_frame_depth {
                tracing::warn!("Not loading {} frames nested deeper than {}", hosts.len(), depth);
                continue;
            }
            let base = document.base_url().clone();

            for (host, source) in hosts {
                let mut child = load_frame(source, &base, fetcher).await;
                load_style_sheets(&mut child, &top_url, fetcher).await;
                match frames.add_child(frame, host, child) {
                    Some(id) => queue.push_back((id, depth + 1)),
                    None => tracing::warn!("Could not attach frame under {:?}", frame),
                }
            }
        }

        tracing::info!("Loaded {} frames", frames.len());
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &FrameTree {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FrameTree {
        &mut self.frames
    }

    /// Top-level document
    pub fn document(&self) -> Option<&Document> {
        self.frames.document(self.frames.root())
    }

    /// Get the page title
    pub fn title(&self) -> String {
        self.document().map(Document::title).unwrap_or_default()
    }
}

/// Every `<iframe>` of `document` with where its content comes from
fn iframe_sources(document: &Document) -> Vec<(NodeId, FrameSource)> {
    let tree = document.tree();
    document
        .elements_by_tag("iframe")
        .into_iter()
        .filter_map(|id| {
            let elem = tree.element(id)?;
            let source = if let Some(srcdoc) = elem.get_attr("srcdoc") {
                FrameSource::Srcdoc(srcdoc.to_string())
            } else {
                elem.get_attr("src")
                    .filter(|src| !src.trim().is_empty())
                    .and_then(|src| document.resolve_url(src))
                    .map_or(FrameSource::Blank, FrameSource::Src)
            };
            Some((id, source))
        })
        .collect()
}

async fn load_frame<F: Fetcher>(source: FrameSource, base: &Url, fetcher: &F) -> Document {
    match source {
        FrameSource::Srcdoc(html) => {
            let mut doc = snap_html::parse(&html, ABOUT_SRCDOC.clone());
            doc.set_base_url(base.clone());
            doc
        }
        FrameSource::Src(url) => match fetcher.fetch(&url).await.and_then(|r| r.error_for_status()) {
            Ok(response) => snap_html::parse(&response.text(), url),
            Err(e) => {
                tracing::warn!("Failed to load frame {}: {}", url, e);
                Document::new(url)
            }
        },
        FrameSource::Blank => Document::new(ABOUT_BLANK.clone()),
    }
}

/// Fetch the text of every linked stylesheet of `document`. Sheets are
/// readable by the document only when same-origin with the top page.
async fn load_style_sheets<F: Fetcher>(document: &mut Document, top_url: &Url, fetcher: &F) {
    let unloaded: Vec<(usize, Url)> = document
        .style_sheets()
        .iter()
        .enumerate()
        .filter(|(_, sheet)| sheet.text.is_none())
        .filter_map(|(i, sheet)| sheet.href.clone().map(|href| (i, href)))
        .collect();

    for (index, href) in unloaded {
        let text = match fetcher.fetch(&href).await.and_then(|r| r.error_for_status()) {
            Ok(response) => response.text(),
            Err(e) => {
                tracing::warn!("Failed to load stylesheet {}: {}", href, e);
                continue;
            }
        };
        if let Some(sheet) = document.style_sheets_mut().get_mut(index) {
            sheet.origin_clean = same_origin(&href, top_url);
            sheet.text = Some(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_net::MemoryFetcher;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_load_frames_in_order() {
        let fetcher = MemoryFetcher::new()
            .with(
                "https://example.com/",
                "text/html",
                r#"<iframe src="a.html"></iframe><iframe srcdoc="<p>inline</p>"></iframe><iframe></iframe>"#,
            )
            .with("https://example.com/a.html", "text/html", "<iframe src='missing.html'></iframe>");

        let page = smol::block_on(Page::load(&url("https://example.com/"), &fetcher, &CaptureConfig::default())).unwrap();
        let frames = page.frames();
        assert_eq!(frames.len(), 5);

        let children = frames.children(frames.root());
        let urls: Vec<&str> = children.iter().map(|c| frames.document(*c).unwrap().url().as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/a.html", "about:srcdoc", "about:blank"]);

        let srcdoc = frames.document(children[1]).unwrap();
        assert_eq!(srcdoc.base_url().as_str(), "https://example.com/");
        assert_eq!(srcdoc.elements_by_tag("p").len(), 1);

        // Failed fetch still yields a frame
        let nested = frames.children(children[0]);
        assert_eq!(nested.len(), 1);
        assert_eq!(frames.document(nested[0]).unwrap().url().as_str(), "https://example.com/missing.html");
    }

    #[test]
    fn test_max_frame_depth() {
        let fetcher = MemoryFetcher::new().with("https://example.com/f.html", "text/html", "<iframe src='f.html'></iframe>");
        let config = CaptureConfig { max_frame_depth: 2, ..CaptureConfig::default() };
        let page = smol::block_on(Page::load(&url("https://example.com/f.html"), &fetcher, &config)).unwrap();
        assert_eq!(page.frames().len(), 3);
    }

    #[test]
    fn test_stylesheet_access() {
        let fetcher = MemoryFetcher::new()
            .with("https://example.com/site.css", "text/css", "p { width: 1px }")
            .with("https://cdn.test/lib.css", "text/css", "p { height: 1px }");
        let html = r#"<link rel="stylesheet" href="/site.css"><link rel="stylesheet" href="https://cdn.test/lib.css"><link rel="stylesheet" href="/gone.css">"#;
        let page = smol::block_on(Page::load_html(html, url("https://example.com/"), &fetcher, &CaptureConfig::default())).unwrap();

        let sheets = page.document().unwrap().style_sheets();
        assert_eq!(sheets.len(), 3);
        assert!(sheets[0].is_accessible());
        assert!(sheets[1].text.is_some());
        assert!(!sheets[1].is_accessible());
        assert!(sheets[2].text.is_none());
    }

    #[test]
    fn test_top_level_failure() {
        let fetcher = MemoryFetcher::new();
        let result = smol::block_on(Page::load(&url("https://example.com/"), &fetcher, &CaptureConfig::default()));
        assert!(matches!(result, Err(CaptureError::PageLoad(_))));
    }
}
