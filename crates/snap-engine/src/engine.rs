//! Engine - Main entry point

use snap_css::StyleResolver;
use snap_net::Fetcher;
use url::Url;

use crate::collector::Collector;
use crate::fill::{fill_font_holes, fill_resource_holes, fill_resource_holes_with_urls, FillReport};
use crate::minimize::{BaselineRenderer, ResolverRenderer};
use crate::reassemble::{reassemble, ReassemblyReport};
use crate::{CaptureConfig, CaptureError, FrameCapture, Page, TreeSerializer};

/// Result of capturing a page
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The single-file document
    pub html: String,
    pub report: ReassemblyReport,
    /// Resource holes filled and failed across all frames
    pub resources: FillReport,
    /// Per-frame captures as delivered, before reassembly
    pub frames: Vec<FrameCapture>,
}

/// The snapit capture engine
pub struct Engine {
    config: CaptureConfig,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: CaptureConfig) -> Self {
        tracing::info!("snapit {} initialized", crate::VERSION);
        Self { config }
    }

    /// Load a URL and all of its frames
    pub async fn load_url<F: Fetcher>(&self, url: &Url, fetcher: &F) -> Result<Page, CaptureError> {
        Page::load(url, fetcher, &self.config).await
    }

    /// Capture a loaded page into a single document
    pub async fn capture<F: Fetcher>(&self, page: &Page, fetcher: &F) -> Result<Snapshot, CaptureError> {
        capture_page(page, fetcher, &self.config).await
    }

    /// Get engine configuration
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

/// Serialize every frame of `page`, fill its holes, collect the results
/// and reassemble them into one document
pub async fn capture_page<F: Fetcher>(
    page: &Page,
    fetcher: &F,
    config: &CaptureConfig,
) -> Result<Snapshot, CaptureError> {
    let frames = page.frames();
    let mut collector = Collector::new(frames.len());
    let mut resources = FillReport::default();

    for id in frames.frame_ids() {
        let document = frames.document(id).ok_or(CaptureError::UnknownFrame)?;
        let styles = StyleResolver::for_document(document);
        let mut serialized = TreeSerializer::new(frames, id, &styles, config)?.serialize();

        if config.inline_fonts {
            fill_font_holes(&mut serialized, fetcher).await;
        }
        let mut capture = serialized.into_capture();

        if config.inline_resources {
            resources = resources.merge(fill_resource_holes(&mut capture, fetcher).await);
        } else {
            fill_resource_holes_with_urls(&mut capture);
        }
        collector.deliver(capture)?;
    }

    let captures = collector.finish(fetcher).await?;
    let delivered = captures.clone();

    let renderer = ResolverRenderer::new();
    let minimizer = if config.minimize_styles {
        Some(&renderer as &dyn BaselineRenderer)
    } else {
        None
    };
    let reassembly = reassemble(captures, minimizer)?;

    tracing::info!(
        "Captured {} frames, {} resources inlined ({} failed)",
        reassembly.report.frames,
        resources.filled,
        resources.failed
    );

    Ok(Snapshot {
        html: reassembly.html,
        report: reassembly.report,
        resources,
        frames: delivered,
    })
}
