//! Resource Loader
//!
//! Fetches `http`/`https` with a blocking reqwest client run on smol's
//! blocking pool, `file:` URLs from disk and `data:` URLs inline.

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::{parse_data_url, Fetcher, NetError, Response};

/// Load resources from network and disk
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    client: reqwest::blocking::Client,
}

impl ResourceLoader {
    /// Create a loader with the given user agent and per-request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch_http(client: reqwest::blocking::Client, url: Url) -> Result<Response, NetError> {
        let response = client
            .get(url.as_str())
            .send()
            .map_err(|e| NetError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .map_err(|e| NetError::Network(e.to_string()))?
            .to_vec();

        let mut response = Response::ok(content_type.as_deref(), body);
        response.status = status;
        Ok(response)
    }

    async fn fetch_file(url: &Url) -> Result<Response, NetError> {
        let path = url
            .to_file_path()
            .map_err(|_| NetError::InvalidUrl(url.to_string()))?;
        let body = smol::fs::read(&path).await?;
        Ok(Response::ok(Some(guess_mime(&path)), body))
    }
}

impl Fetcher for ResourceLoader {
    async fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        tracing::debug!("Fetching {}", url);
        match url.scheme() {
            "http" | "https" => {
                let client = self.client.clone();
                let url = url.clone();
                smol::unblock(move || Self::fetch_http(client, url)).await
            }
            "file" => Self::fetch_file(url).await,
            "data" => parse_data_url(url.as_str()),
            other => Err(NetError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// MIME type from a file extension
pub(crate) fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        _ => crate::DEFAULT_MIME,
    }
}
