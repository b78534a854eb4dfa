//! Capture errors

use crate::FrameAddress;

/// Errors raised while capturing or reassembling a page
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No capture for the root frame")]
    MissingRoot,

    #[error("Frame {0} was captured twice")]
    DuplicateFrame(FrameAddress),

    #[error("Collected {received} of {expected} frames")]
    IncompleteCollection { expected: usize, received: usize },

    #[error("Failed to load page: {0}")]
    PageLoad(#[from] snap_net::NetError),

    #[error("Baseline render failed: {0}")]
    BaselineRender(String),

    #[error("Invalid frame address: {0:?}")]
    InvalidAddress(String),

    #[error("Frame is not part of this page")]
    UnknownFrame,
}
