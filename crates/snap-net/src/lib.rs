//! snapit Networking
//!
//! Resource fetching for page loading and hole filling. `http`/`https`
//! go through reqwest, `file:` and `data:` URLs are served locally.

mod loader;
mod data_url;
mod memory;

pub use data_url::{parse_data_url, to_data_url};
pub use loader::ResourceLoader;
pub use memory::MemoryFetcher;
pub use url::Url;

use std::future::Future;

/// MIME type used when a response doesn't carry one
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Source of resources
///
/// Implementations must be usable from any task; the engine drives them
/// one request at a time.
pub trait Fetcher {
    /// Fetch a URL
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<Response, NetError>> + Send;
}

/// Fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// MIME type without parameters, if known
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// 200 response with a body
    pub fn ok(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(normalize_mime).filter(|m| !m.is_empty()),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self, NetError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(NetError::HttpError { status: self.status })
        }
    }

    /// MIME type, falling back to `application/octet-stream`
    pub fn mime(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_MIME)
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Strip parameters and lowercase a `Content-Type` value
pub(crate) fn normalize_mime(value: &str) -> String {
    value.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Malformed data URL")]
    InvalidDataUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
