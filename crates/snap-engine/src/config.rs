//! Capture Configuration

use std::time::Duration;

/// Viewport size recorded with each frame and used for baseline renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 800 }
    }
}

/// Capture configuration options
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Reduce inline styles to what differs from a style-less render
    pub minimize_styles: bool,

    /// Inline `@font-face` rules from linked stylesheets
    pub inline_fonts: bool,

    /// Replace same-origin image sources with data URLs
    pub inline_resources: bool,

    /// Viewport size
    pub viewport: Viewport,

    /// Deepest iframe nesting loaded by `Page::load`
    pub max_frame_depth: usize,

    /// Timeout applied to every fetch
    pub fetch_timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            minimize_styles: true,
            inline_fonts: true,
            inline_resources: true,
            viewport: Viewport::default(),
            max_frame_depth: 8,
            fetch_timeout: Duration::from_secs(30),
            user_agent: format!("snapit/{}", crate::VERSION),
        }
    }
}
