//! Cross-Frame Reassembler
//!
//! Splices every frame's text into its parent's `srcdoc` hole, deepest
//! frames first, and joins the root buffer into the final document.

use std::collections::HashMap;

use crate::minimize::{minimize_frame, BaselineRenderer};
use crate::{CaptureError, FrameAddress, FrameCapture};

/// Final document plus what happened while building it
#[derive(Debug, Clone)]
pub struct Reassembly {
    pub html: String,
    pub report: ReassemblyReport,
}

/// Summary of a reassembly pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassemblyReport {
    /// Frames spliced into the output, root included
    pub frames: usize,
    /// Frame holes with no matching capture, left as empty iframes
    pub dangling: Vec<FrameAddress>,
    /// Elements whose style went through the minimizer
    pub minimized_elements: usize,
}

/// Build the final document from every frame's capture.
///
/// With a `minimizer`, each frame's styles are minimized once its child
/// frames are in place; otherwise the full captured styles are written.
pub fn reassemble(
    captures: Vec<FrameCapture>,
    minimizer: Option<&dyn BaselineRenderer>,
) -> Result<Reassembly, CaptureError> {
    let mut pending = HashMap::with_capacity(captures.len());
    for capture in captures {
        let address = capture.frame_index.clone();
        if pending.insert(address.clone(), capture).is_some() {
            return Err(CaptureError::DuplicateFrame(address));
        }
    }
    if !pending.contains_key(&FrameAddress::root()) {
        return Err(CaptureError::MissingRoot);
    }

    let mut assembler = Assembler { pending, minimizer, report: ReassemblyReport::default() };
    let html = assembler.assemble(&FrameAddress::root()).unwrap_or_default();

    for address in assembler.pending.keys() {
        tracing::debug!("Capture for frame {} has no hole to fill", address);
    }
    tracing::info!(
        "Reassembled {} frames ({} dangling)",
        assembler.report.frames,
        assembler.report.dangling.len()
    );

    Ok(Reassembly { html, report: assembler.report })
}

struct Assembler<'a> {
    pending: HashMap<FrameAddress, FrameCapture>,
    minimizer: Option<&'a dyn BaselineRenderer>,
    report: ReassemblyReport,
}

impl Assembler<'_> {
    /// Text of the frame at `address`, or None if it was never captured
    fn assemble(&mut self, address: &FrameAddress) -> Option<String> {
        let mut capture = self.pending.remove(address)?;

        let holes = std::mem::take(&mut capture.frame_holes);
        for (index, child) in holes {
            match self.assemble(&child) {
                Some(text) => capture.html.fill(index, text),
                None => {
                    tracing::warn!("No capture for frame {}, leaving it empty", child);
                    self.report.dangling.push(child);
                }
            }
        }

        self.finish_styles(&mut capture);
        self.report.frames += 1;
        Some(capture.text())
    }

    fn finish_styles(&mut self, capture: &mut FrameCapture) {
        if capture.style.is_none() {
            return;
        }
        if let Some(renderer) = self.minimizer {
            match minimize_frame(renderer, capture) {
                Ok(count) => {
                    self.report.minimized_elements += count;
                    return;
                }
                Err(e) => tracing::warn!("Frame {}: {}, keeping full styles", capture.frame_index, e),
            }
        }
        capture.fill_style_holes();
    }
}
