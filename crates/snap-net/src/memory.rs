//! In-memory fetcher
//!
//! Serves a fixed set of URLs; everything else is `NotFound`. `data:` URLs
//! are decoded as usual.

use std::collections::HashMap;
use std::sync::Mutex;

use url::Url;

use crate::{parse_data_url, Fetcher, NetError, Response};

/// Fetcher backed by a URL → response map
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Response>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `content_type` at `url`
    pub fn with(mut self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, Response::ok(Some(content_type), body));
        self
    }

    /// Serve an arbitrary response at `url`
    pub fn insert(&mut self, url: &str, response: Response) {
        let key = Url::parse(url).map(String::from).unwrap_or_else(|_| url.to_string());
        self.responses.insert(key, response);
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        if url.scheme() == "data" {
            return parse_data_url(url.as_str());
        }
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| NetError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fetch() {
        let fetcher = MemoryFetcher::new().with("https://a.test/x.png", "image/png", b"png".to_vec());
        let url = Url::parse("https://a.test/x.png").unwrap();
        let resp = smol::block_on(fetcher.fetch(&url)).unwrap();
        assert_eq!(resp.body, b"png");

        let missing = Url::parse("https://a.test/y.png").unwrap();
        assert!(smol::block_on(fetcher.fetch(&missing)).is_err());
        assert_eq!(fetcher.requests().len(), 2);
    }
}
