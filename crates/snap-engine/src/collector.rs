//! Frame result collector
//!
//! Gathers one capture per frame as they are delivered. The number of
//! frames is known up front, so completeness is a simple count.

use std::collections::BTreeMap;

use snap_net::Fetcher;

use crate::fill::{fill_resource_holes, FillReport};
use crate::{CaptureError, FrameAddress, FrameCapture};

/// Accumulates frame captures keyed by address
#[derive(Debug, Default)]
pub struct Collector {
    expected: usize,
    captures: BTreeMap<FrameAddress, FrameCapture>,
}

impl Collector {
    /// Collector waiting for `expected` frames
    pub fn new(expected: usize) -> Self {
        Self { expected, captures: BTreeMap::new() }
    }

    /// Record one frame's capture
    pub fn deliver(&mut self, capture: FrameCapture) -> Result<(), CaptureError> {
        let address = capture.frame_index.clone();
        if self.captures.contains_key(&address) {
            return Err(CaptureError::DuplicateFrame(address));
        }
        tracing::debug!(
            "Received frame {} ({}/{})",
            address,
            self.captures.len() + 1,
            self.expected
        );
        self.captures.insert(address, capture);
        Ok(())
    }

    /// Whether every expected frame has been delivered
    pub fn is_complete(&self) -> bool {
        self.captures.len() >= self.expected
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn received(&self) -> usize {
        self.captures.len()
    }

    /// Complete set of captures with every resource hole resolved.
    ///
    /// Fails if a frame is still missing.
    pub async fn finish<F: Fetcher>(self, fetcher: &F) -> Result<Vec<FrameCapture>, CaptureError> {
        if !self.is_complete() {
            return Err(CaptureError::IncompleteCollection {
                expected: self.expected,
                received: self.captures.len(),
            });
        }

        let mut report = FillReport::default();
        let mut out = Vec::with_capacity(self.captures.len());
        for (_, mut capture) in self.captures {
            if !capture.src_holes.is_empty() {
                report = report.merge(fill_resource_holes(&mut capture, fetcher).await);
            }
            out.push(capture);
        }

        if report.filled + report.failed > 0 {
            tracing::debug!("Collector filled {} leftover holes, {} failed", report.filled, report.failed);
        }
        Ok(out)
    }

    /// Whatever has been delivered so far, in address order
    pub fn into_captures(self) -> Vec<FrameCapture> {
        self.captures.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buffer;
    use snap_net::MemoryFetcher;
    use url::Url;

    fn capture(address: FrameAddress) -> FrameCapture {
        FrameCapture {
            html: Buffer::from(vec!["x".to_string()]),
            src_holes: BTreeMap::new(),
            frame_holes: BTreeMap::new(),
            frame_index: address,
            style: None,
        }
    }

    #[test]
    fn test_completion() {
        let mut collector = Collector::new(2);
        collector.deliver(capture(FrameAddress::root().child(0))).unwrap();
        assert!(!collector.is_complete());
        collector.deliver(capture(FrameAddress::root())).unwrap();
        assert!(collector.is_complete());

        let captures = smol::block_on(collector.finish(&MemoryFetcher::new())).unwrap();
        let order: Vec<String> = captures.iter().map(|c| c.frame_index.to_string()).collect();
        assert_eq!(order, vec!["0", "0.0"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut collector = Collector::new(2);
        collector.deliver(capture(FrameAddress::root())).unwrap();
        assert!(matches!(
            collector.deliver(capture(FrameAddress::root())),
            Err(CaptureError::DuplicateFrame(_))
        ));
    }

    #[test]
    fn test_incomplete_finish() {
        let mut collector = Collector::new(3);
        collector.deliver(capture(FrameAddress::root())).unwrap();
        let err = smol::block_on(collector.finish(&MemoryFetcher::new())).unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteCollection { expected: 3, received: 1 }));
    }

    #[test]
    fn test_leftover_holes_filled() {
        let mut root = capture(FrameAddress::root());
        root.html = Buffer::from(vec!["<img src=\"".to_string(), String::new(), "\" >".to_string()]);
        root.src_holes.insert(1, Url::parse("https://example.com/a.png").unwrap());

        let mut collector = Collector::new(1);
        collector.deliver(root).unwrap();
        let fetcher = MemoryFetcher::new().with("https://example.com/a.png", "image/png", b"A".to_vec());
        let captures = smol::block_on(collector.finish(&fetcher)).unwrap();
        assert_eq!(captures[0].text(), "<img src=\"data:image/png;base64,QQ==\" >");
    }
}
