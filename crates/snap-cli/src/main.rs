//! snapit - Save a web page as a single self-contained HTML file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use snap_engine::{CaptureConfig, Engine, Viewport};
use snap_net::ResourceLoader;
use tracing_subscriber::EnvFilter;
use url::Url;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Save a web page, iframes included, as one HTML file
#[derive(Parser, Debug)]
#[command(name = "snapit", version, about)]
struct Args {
    /// URL or local file to capture
    target: String,

    /// Output file
    #[arg(long, short, default_value = "webpage.html")]
    output: PathBuf,

    /// Keep full computed styles instead of minimizing them
    #[arg(long)]
    no_minimize: bool,

    /// Don't inline @font-face rules from linked stylesheets
    #[arg(long)]
    no_fonts: bool,

    /// Keep image URLs instead of inlining them as data URLs
    #[arg(long)]
    no_resources: bool,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_viewport, default_value = "1280x800")]
    viewport: Viewport,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Deepest iframe nesting to load
    #[arg(long, default_value_t = 8)]
    max_frame_depth: usize,

    /// Also write the per-frame captures as JSON
    #[arg(long)]
    frames_json: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> CaptureConfig {
        CaptureConfig {
            minimize_styles: !self.no_minimize,
            inline_fonts: !self.no_fonts,
            inline_resources: !self.no_resources,
            viewport: self.viewport,
            max_frame_depth: self.max_frame_depth,
            fetch_timeout: Duration::from_secs(self.timeout),
            ..CaptureConfig::default()
        }
    }
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width = width.trim().parse().map_err(|e| format!("invalid width: {e}"))?;
    let height = height.trim().parse().map_err(|e| format!("invalid height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("viewport must not be empty".to_string());
    }
    Ok(Viewport { width, height })
}

/// A URL as given, or a local path turned into a `file:` URL
fn resolve_target(target: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(target) {
        // Single-letter schemes are Windows drive letters
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(target);
    let absolute = fs::canonicalize(path).with_context(|| format!("No such file: {}", path.display()))?;
    match Url::from_file_path(&absolute) {
        Ok(url) => Ok(url),
        Err(()) => bail!("Cannot turn {} into a file URL", absolute.display()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();
    let url = resolve_target(&args.target)?;

    let loader = ResourceLoader::new(&config.user_agent, config.fetch_timeout)
        .context("Failed to create HTTP client")?;
    let engine = Engine::new(config);

    let snapshot = smol::block_on(async {
        let page = engine.load_url(&url, &loader).await?;
        tracing::info!("Loaded {:?}", page.title());
        engine.capture(&page, &loader).await
    })
    .with_context(|| format!("Failed to capture {}", url))?;

    if !snapshot.report.dangling.is_empty() {
        tracing::warn!("{} frames were left empty", snapshot.report.dangling.len());
    }

    fs::write(&args.output, &snapshot.html)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {} ({} bytes)", args.output.display(), snapshot.html.len());

    if let Some(path) = &args.frames_json {
        let json = serde_json::to_string_pretty(&snapshot.frames)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} frame captures to {}", snapshot.frames.len(), path.display());
    }

    Ok(())
}
