//! Escaping Engine
//!
//! A value nested inside N levels of `srcdoc` quoting must survive N
//! rounds of HTML attribute decoding. Level 0 is the literal character,
//! level k+1 is the HTML escape of level k, which has the closed form
//! `&` + `amp;`×(k-1) + entity tail.

/// The five characters with reserved meaning in HTML text and attributes
const RESERVED: [(char, &str); 5] = [
    ('&', "amp;"),
    ('<', "lt;"),
    ('>', "gt;"),
    ('"', "quot;"),
    ('\'', "#39;"),
];

/// How code points ≥ 128 are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `&#N;` for HTML text and attribute values
    Html,
    /// `\hex ` inside CSS
    Css,
}

fn entity_tail(c: char) -> Option<&'static str> {
    RESERVED.iter().find(|(r, _)| *r == c).map(|(_, tail)| *tail)
}

/// Encoding of `c` at escaping `level`.
///
/// Characters other than the five reserved ones are returned unchanged.
pub fn char_encoding(c: char, level: usize) -> String {
    match (level, entity_tail(c)) {
        (0, _) | (_, None) => c.to_string(),
        (level, Some(tail)) => {
            let mut out = String::with_capacity(1 + 4 * level + tail.len());
            out.push('&');
            for _ in 1..level {
                out.push_str("amp;");
            }
            out.push_str(tail);
            out
        }
    }
}

/// Encode every reserved character of `text` at `level`, in one pass
pub fn escape_text(text: &str, level: usize) -> String {
    if level == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if entity_tail(c).is_some() {
            out.push_str(&char_encoding(c, level));
        } else {
            out.push(c);
        }
    }
    out
}

/// Replace every code point ≥ 128 with an HTML or CSS escape
pub fn escape_unicode(text: &str, kind: TextKind) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let cp = c as u32;
        match (cp < 128, kind) {
            (true, _) => out.push(c),
            (false, TextKind::Html) => out.push_str(&format!("&#{};", cp)),
            (false, TextKind::Css) => out.push_str(&format!("\\{:x} ", cp)),
        }
    }
    out
}

/// Decode one level of HTML character references.
///
/// Handles the named entities produced by [`char_encoding`] (plus
/// `&apos;`) and numeric references; anything else is kept verbatim.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|end| *end <= 12).and_then(|end| {
            let name = &rest[1..end];
            decode_entity(name).map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let cp = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(cp)
        }
    }
}
