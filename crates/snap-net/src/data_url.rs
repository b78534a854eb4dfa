//! `data:` URLs

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::{normalize_mime, NetError, Response, DEFAULT_MIME};

/// Encode bytes as `data:<mime>;base64,<data>`.
///
/// An empty MIME type becomes `application/octet-stream`.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = match mime.trim() {
        "" => DEFAULT_MIME,
        m => m,
    };
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Decode a `data:` URL into a response
pub fn parse_data_url(url: &str) -> Result<Response, NetError> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or(NetError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(NetError::InvalidDataUrl)?;

    let (mime, is_base64) = match meta.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (meta, false),
    };

    let body = if is_base64 {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64_STANDARD.decode(cleaned).map_err(|_| NetError::InvalidDataUrl)?
    } else {
        percent_decode(payload)
    };

    let mime = normalize_mime(mime);
    let content_type = if mime.is_empty() { "text/plain" } else { &mime };
    Ok(Response::ok(Some(content_type), body))
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let hex = bytes.get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match (bytes[i], hex) {
            (b'%', Some(b)) => {
                out.push(b);
                i += 3;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}
