//! Resource Hole Filler
//!
//! Resolves a frame's pending holes one request at a time. Failures are
//! logged and leave the slot empty; nothing here is fatal.

use snap_net::{to_data_url, Fetcher};

use crate::fonts::extract_font_faces;
use crate::serializer::SerializedFrame;
use crate::FrameCapture;

/// Outcome of a fill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub failed: usize,
}

impl FillReport {
    /// Combine two reports
    pub fn merge(self, other: FillReport) -> FillReport {
        FillReport {
            filled: self.filled + other.filled,
            failed: self.failed + other.failed,
        }
    }
}

/// Fetch every stylesheet queued for font extraction and collect its
/// `@font-face` rules
pub async fn fill_font_holes<F: Fetcher>(frame: &mut SerializedFrame, fetcher: &F) -> FillReport {
    let mut report = FillReport::default();

    while !frame.fonts.pending.is_empty() {
        let href = frame.fonts.pending.remove(0);
        let css = match fetcher.fetch(&href).await.and_then(|r| r.error_for_status()) {
            Ok(response) => response.text(),
            Err(e) => {
                tracing::warn!("Failed to fetch stylesheet {}: {}", href, e);
                report.failed += 1;
                continue;
            }
        };

        let rules = extract_font_faces(&css, &href);
        tracing::debug!("Found {} font rules in {}", rules.len(), href);
        frame.fonts.rules.extend(rules);
        report.filled += 1;
    }

    report
}

/// Replace each resource hole with a `data:` URL of the fetched resource
pub async fn fill_resource_holes<F: Fetcher>(capture: &mut FrameCapture, fetcher: &F) -> FillReport {
    let mut report = FillReport::default();

    while let Some((index, url)) = capture.src_holes.pop_first() {
        let response = match fetcher.fetch(&url).await.and_then(|r| r.error_for_status()) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to inline {}: {}", url, e);
                report.failed += 1;
                continue;
            }
        };

        capture.html.fill(index, to_data_url(response.mime(), &response.body));
        report.filled += 1;
    }

    if report.filled + report.failed > 0 {
        tracing::debug!(
            "Frame {}: inlined {} resources, {} failed",
            capture.frame_index,
            report.filled,
            report.failed
        );
    }
    report
}

/// Point each resource hole at its original absolute URL instead of
/// inlining it
pub fn fill_resource_holes_with_urls(capture: &mut FrameCapture) -> usize {
    let depth = capture.depth();
    let mut count = 0;
    while let Some((index, url)) = capture.src_holes.pop_first() {
        let escaped = crate::escape::escape_text(url.as_str(), depth + 1);
        capture.html.fill(index, escaped);
        count += 1;
    }
    count
}
