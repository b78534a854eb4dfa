//! snapit Engine
//!
//! Captures a web page, iframes included, as one self-contained HTML
//! document.
//!
//! # Pipeline
//! - Each frame is serialized on its own into a fragment buffer, escaped
//!   for its nesting depth, with holes for what isn't known yet
//! - Holes for images and fonts are filled with fetched data
//! - Child frames are spliced into their parent's `srcdoc` attribute
//! - Inline styles are minimized against a style-less render
//!
//! # Example
//! ```rust,ignore
//! use snap_engine::{Engine, CaptureConfig};
//! use snap_net::ResourceLoader;
//!
//! let loader = ResourceLoader::new("snapit", timeout)?;
//! let engine = Engine::new(CaptureConfig::default());
//! let page = engine.load_url(&url, &loader).await?;
//! let snapshot = engine.capture(&page, &loader).await?;
//! std::fs::write("webpage.html", snapshot.html)?;
//! ```

mod engine;
mod page;
mod config;
mod error;
mod buffer;
mod capture;
mod collector;
mod ids;
pub mod address;
pub mod escape;
pub mod fonts;
pub mod serializer;
pub mod fill;
pub mod minimize;
pub mod reassemble;

pub use engine::{capture_page, Engine, Snapshot};
pub use page::Page;
pub use config::{CaptureConfig, Viewport};
pub use error::CaptureError;
pub use buffer::{Buffer, Holes};
pub use capture::{attribute, style_attribute, style_css, FrameCapture, StyleMap, StyleMetadata};
pub use collector::Collector;
pub use ids::{next_id, ID_PREFIX};
pub use address::{fully_qualified_address, index_in_parent, FrameAddress};
pub use serializer::{same_origin, FontCollection, SerializedFrame, TreeSerializer};
pub use fill::FillReport;
pub use minimize::{minimize_frame, BaselineRenderer, RenderedPage, ResolverRenderer, StyleTarget};
pub use reassemble::{reassemble, Reassembly, ReassemblyReport};

// Re-export sub-crates for advanced usage
pub use snap_html as html;
pub use snap_css as css;
pub use snap_dom as dom;
pub use snap_net as net;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
