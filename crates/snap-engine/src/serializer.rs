//! Tree Serializer
//!
//! Walks one frame's DOM depth-first and produces the fragment buffer for
//! it. Everything the frame emits is escaped for its nesting depth, so the
//! buffer can later be dropped verbatim into the parent's `srcdoc` hole.
//! Content that isn't known yet (same-origin images, child frames, font
//! rules from unreadable stylesheets, minimized styles) is left as holes.

use std::collections::HashSet;

use snap_css::{ComputedStyle, PseudoElement, StyleSource};
use snap_dom::{Document, ElementData, FrameId, FrameTree, NodeData, NodeId};
use url::Url;

use crate::address::fully_qualified_address;
use crate::capture::{attribute, StyleMap, StyleMetadata};
use crate::escape::{char_encoding, escape_text, escape_unicode, TextKind};
use crate::fonts::extract_font_faces;
use crate::ids::next_id;
use crate::{Buffer, CaptureConfig, CaptureError, FrameAddress, FrameCapture, Holes, Viewport};

/// Elements dropped from the output together with their subtree
const FILTERED_TAGS: [&str; 4] = ["script", "noscript", "style", "link"];

/// Elements without a closing tag
const VOID_TAGS: [&str; 15] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

const PSEUDO_ELEMENTS: [PseudoElement; 2] = [PseudoElement::Before, PseudoElement::After];

/// Same origin: scheme, host and port all match
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Font rules gathered for one frame
#[derive(Debug, Clone, Default)]
pub struct FontCollection {
    /// Buffer index of the font `<style>` placeholder
    pub placeholder: usize,
    /// Extracted `@font-face` rules
    pub rules: Vec<String>,
    /// Stylesheets that couldn't be read in place and must be fetched
    pub pending: Vec<Url>,
}

/// A serialized frame whose font rules may still need fetching
#[derive(Debug, Clone)]
pub struct SerializedFrame {
    pub capture: FrameCapture,
    pub fonts: FontCollection,
}

impl SerializedFrame {
    /// Write the collected font rules and return the capture
    pub fn into_capture(self) -> FrameCapture {
        let Self { mut capture, fonts } = self;
        if !fonts.pending.is_empty() {
            tracing::debug!(
                "Frame {}: {} stylesheets never fetched for fonts",
                capture.frame_index,
                fonts.pending.len()
            );
        }
        if !fonts.rules.is_empty() {
            let css = fonts.rules.join("\n");
            let css = escape_unicode(&escape_text(&css, capture.depth()), TextKind::Css);
            capture.html.fill(fonts.placeholder, format!("<style>{}</style>", css));
        }
        capture
    }
}

/// Serializes one frame of a `FrameTree`
pub struct TreeSerializer<'a, S: StyleSource> {
    document: &'a Document,
    frames: &'a FrameTree,
    frame: FrameId,
    styles: &'a S,
    address: FrameAddress,
    depth: usize,
    top_url: Url,
    minimize: bool,
    inline_fonts: bool,
    viewport: Viewport,

    buffer: Buffer,
    holes: Holes,
    pseudo_css: Vec<String>,
    fonts: FontCollection,
    existing_ids: HashSet<String>,
    id_counter: u32,
    style_meta: StyleMetadata,
}

impl<'a, S: StyleSource> TreeSerializer<'a, S> {
    /// Prepare to serialize `frame`, reading styles from `styles`
    pub fn new(
        frames: &'a FrameTree,
        frame: FrameId,
        styles: &'a S,
        config: &CaptureConfig,
    ) -> Result<Self, CaptureError> {
        let document = frames.document(frame).ok_or(CaptureError::UnknownFrame)?;
        let top_url = frames
            .document(frames.root())
            .ok_or(CaptureError::UnknownFrame)?
            .url()
            .clone();
        let address = fully_qualified_address(frames, frame)?;

        Ok(Self {
            document,
            frames,
            frame,
            styles,
            depth: address.depth(),
            address,
            top_url,
            minimize: config.minimize_styles,
            inline_fonts: config.inline_fonts,
            viewport: config.viewport,
            buffer: Buffer::new(),
            holes: Holes::new(),
            pseudo_css: Vec::new(),
            fonts: FontCollection::default(),
            existing_ids: document.ids(),
            id_counter: 0,
            style_meta: StyleMetadata::default(),
        })
    }

    /// Serialize the whole document
    pub fn serialize(mut self) -> SerializedFrame {
        tracing::debug!("Serializing frame {} ({})", self.address, self.document.url());

        self.buffer.push("<!DOCTYPE html>\n");
        let pseudo_placeholder = self.buffer.reserve();
        self.fonts.placeholder = self.buffer.reserve();

        if self.inline_fonts {
            self.collect_fonts();
        }

        let tree = self.document.tree();
        let top_level: Vec<NodeId> = tree.children(tree.root()).map(|(id, _)| id).collect();
        for id in top_level {
            self.process_node(id);
        }

        let pseudo = escape_unicode(
            &escape_text(&self.pseudo_css.join(""), self.depth),
            TextKind::Css,
        );
        self.buffer.fill(pseudo_placeholder, format!("<style>{}</style>", pseudo));

        let style = if self.minimize {
            self.style_meta.window_width = self.viewport.width;
            self.style_meta.window_height = self.viewport.height;
            Some(self.style_meta)
        } else {
            None
        };

        tracing::debug!(
            "Frame {}: {} fragments, {} resource holes, {} frame holes",
            self.address,
            self.buffer.len(),
            self.holes.src.len(),
            self.holes.frames.len()
        );

        SerializedFrame {
            capture: FrameCapture {
                html: self.buffer,
                src_holes: self.holes.src,
                frame_holes: self.holes.frames,
                frame_index: self.address,
                style,
            },
            fonts: self.fonts,
        }
    }

    fn collect_fonts(&mut self) {
        let document = self.document;
        for sheet in document.style_sheets() {
            match (&sheet.text, &sheet.href) {
                (Some(text), _) if sheet.is_accessible() => {
                    let base = sheet.href.as_ref().unwrap_or(document.base_url());
                    self.fonts.rules.extend(extract_font_faces(text, base));
                }
                (_, Some(href)) => self.fonts.pending.push(href.clone()),
                _ => {}
            }
        }
    }

    fn process_node(&mut self, id: NodeId) {
        let document = self.document;
        let tree = document.tree();
        let Some(node) = tree.get(id) else { return };

        match &node.data {
            NodeData::Text(text) => {
                let escaped = escape_text(&text.content, self.depth + 1);
                self.buffer.push(escape_unicode(&escaped, TextKind::Html));
            }
            NodeData::Element(elem) if !FILTERED_TAGS.contains(&elem.tag_name()) => {
                self.process_element(id, elem);
            }
            _ => {}
        }
    }

    fn process_element(&mut self, id: NodeId, elem: &ElementData) {
        let document = self.document;
        let tag = elem.tag_name();
        let tree = document.tree();
        let is_root = document.document_element() == Some(id);
        let mut generated_id = None;

        self.buffer.push(format!("<{} ", tag));

        let style = self.styles.computed_style(tree, id);
        let map = || -> StyleMap { style.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() };
        if self.minimize && is_root {
            self.style_meta.root_style_index = Some(self.buffer.reserve());
            self.style_meta.root_style = map();
        } else if self.minimize {
            let element_id = self.element_id(elem, &mut generated_id);
            if self.style_meta.id_to_style_index.contains_key(&element_id) {
                // Repeated author id: the minimizer can only find the first
                // element carrying it, so this one keeps its full style
                self.push_attribute("style", &style.css_text());
            } else {
                let index = self.buffer.reserve();
                self.style_meta.id_to_style_index.insert(element_id.clone(), index);
                self.style_meta.id_to_style_map.insert(element_id, map());
            }
        } else {
            self.push_attribute("style", &style.css_text());
        }

        for attr in &elem.attrs {
            match attr.name.as_str() {
                "style" => {}
                "src" => self.process_src(id, elem, &attr.value),
                "srcdoc" if tag == "iframe" => {}
                "id" if attr.value.trim().is_empty() => {}
                name => self.push_attribute(name, &attr.value),
            }
        }

        if tag == "iframe" {
            self.process_iframe(id);
        }

        self.process_pseudo_elements(id, elem, &mut generated_id);

        if let Some(generated) = generated_id {
            self.push_attribute("id", &generated);
        }
        self.buffer.push(">");

        let children: Vec<NodeId> = tree.children(id).map(|(c, _)| c).collect();
        for child in children {
            self.process_node(child);
        }

        if !VOID_TAGS.contains(&tag) {
            self.buffer.push(format!("</{}>", tag));
        }
    }

    /// The element's id, generating one if it has none
    fn element_id(&mut self, elem: &ElementData, generated: &mut Option<String>) -> String {
        if let Some(id) = elem.id() {
            return id.to_string();
        }
        if let Some(id) = generated {
            return id.clone();
        }
        let (id, counter) = next_id(self.id_counter, &self.existing_ids);
        self.id_counter = counter;
        self.existing_ids.insert(id.clone());
        *generated = Some(id.clone());
        id
    }

    fn process_pseudo_elements(&mut self, id: NodeId, elem: &ElementData, generated: &mut Option<String>) {
        let document = self.document;
        let tree = document.tree();
        for pseudo in PSEUDO_ELEMENTS {
            let Some(style) = self.styles.pseudo_style(tree, id, pseudo) else { continue };
            if !style.has_content() {
                continue;
            }
            let element_id = self.element_id(elem, generated);
            self.pseudo_css.push(pseudo_rule(&element_id, pseudo, &style));
        }
    }

    fn process_src(&mut self, id: NodeId, elem: &ElementData, value: &str) {
        let tag = elem.tag_name();
        if tag == "iframe" {
            return;
        }

        let document = self.document;
        let Some(url) = document.resolve_url(value) else {
            self.push_attribute("src", value);
            return;
        };

        let tree = document.tree();
        let inlinable = match tag {
            "img" => true,
            "source" => tree
                .parent_element(id)
                .and_then(|p| tree.element(p))
                .is_some_and(|p| p.is("picture")),
            "input" => elem.get_attr("type").is_some_and(|t| t.trim().eq_ignore_ascii_case("image")),
            _ => false,
        };

        if inlinable && same_origin(&url, &self.top_url) {
            let index = self.push_hole_attribute("src");
            self.holes.src.insert(index, url);
        } else {
            self.push_attribute("src", url.as_str());
        }
    }

    fn process_iframe(&mut self, id: NodeId) {
        let Some(child) = self.frames.content_frame(self.frame, id) else {
            tracing::warn!("Frame {}: iframe without a loaded document", self.address);
            self.push_attribute("srcdoc", "");
            return;
        };
        match fully_qualified_address(self.frames, child) {
            Ok(address) => {
                let index = self.push_hole_attribute("srcdoc");
                self.holes.frames.insert(index, address);
            }
            Err(e) => {
                tracing::warn!("Frame {}: {}", self.address, e);
                self.push_attribute("srcdoc", "");
            }
        }
    }

    fn push_attribute(&mut self, name: &str, value: &str) {
        self.buffer.push(attribute(name, value, self.depth));
    }

    /// `name="` + hole + `" `, returning the hole's index
    fn push_hole_attribute(&mut self, name: &str) -> usize {
        let quote = char_encoding('"', self.depth);
        self.buffer.push(format!("{}={}", name, quote));
        let index = self.buffer.reserve();
        self.buffer.push(format!("{} ", quote));
        index
    }
}

/// `#id:before{css} `
fn pseudo_rule(id: &str, pseudo: PseudoElement, style: &ComputedStyle) -> String {
    format!("#{}{}{{{}}} ", id, pseudo.as_str(), style.css_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_css::StyleResolver;
    use snap_dom::Document;

    fn frames_for(html: &str, url: &str) -> FrameTree {
        FrameTree::new(snap_html::parse(html, Url::parse(url).unwrap()))
    }

    fn plain() -> CaptureConfig {
        CaptureConfig { minimize_styles: false, ..CaptureConfig::default() }
    }

    fn serialize(frames: &FrameTree, frame: FrameId, config: &CaptureConfig) -> FrameCapture {
        let styles = StyleResolver::for_document(frames.document(frame).unwrap());
        TreeSerializer::new(frames, frame, &styles, config)
            .unwrap()
            .serialize()
            .into_capture()
    }

    #[test]
    fn test_no_holes_for_plain_div() {
        let frames = frames_for("<div>test</div>", "https://example.com/");
        let capture = serialize(&frames, FrameId::TOP, &plain());
        assert!(capture.src_holes.is_empty());
        assert!(capture.frame_holes.is_empty());
        assert!(capture.text().starts_with("<!DOCTYPE html>\n<style></style><html "));
    }

    #[test]
    fn test_void_and_closing_tags() {
        let frames = frames_for("<p>a<br>b<img src='https://cdn.test/x.png'></p>", "https://example.com/");
        let text = serialize(&frames, FrameId::TOP, &plain()).text();
        assert!(text.contains("</p>"));
        assert!(!text.contains("</br>"));
        assert!(!text.contains("</img>"));
    }

    #[test]
    fn test_filtered_tags_dropped() {
        let frames = frames_for(
            "<head><style>p{}</style><link rel=stylesheet href=a.css></head><body><script>x()</script><noscript>n</noscript>t</body>",
            "https://example.com/",
        );
        let text = serialize(&frames, FrameId::TOP, &plain()).text();
        assert!(!text.contains("<script"));
        assert!(!text.contains("<noscript"));
        assert!(!text.contains("<link"));
        assert!(!text.contains("x()"));
        assert!(text.contains(">t</body>"));
    }

    #[test]
    fn test_text_escaping_at_top_level() {
        let frames = frames_for("<div>&lt;div&gt; with '&amp;\"</div>", "https://example.com/");
        let text = serialize(&frames, FrameId::TOP, &plain()).text();
        assert!(text.contains(">&lt;div&gt; with &#39;&amp;&quot;</div>"));
    }

    #[test]
    fn test_attribute_values_fully_escaped() {
        let frames = frames_for(r#"<a title="x&quot;<y>" href="?a=1&amp;b=2">l</a>"#, "https://example.com/");
        let text = serialize(&frames, FrameId::TOP, &plain()).text();
        assert!(text.contains(r#"title="x&quot;&lt;y&gt;" "#));
        assert!(text.contains(r#"href="?a=1&amp;b=2" "#));
    }

    #[test]
    fn test_src_policy() {
        let html = r#"
            <img src="/same.png">
            <img src="https://cdn.test/other.png">
            <picture><source src="pic.webp"></picture>
            <video><source src="movie.mp4"></video>
            <input type="image" src="btn.png">
            <script src="x.js"></script>
            <embed src="e.swf">
        "#;
        let frames = frames_for(html, "https://example.com/dir/page.html");
        let capture = serialize(&frames, FrameId::TOP, &plain());
        let holes: Vec<&str> = capture.src_holes.values().map(Url::as_str).collect();
        assert_eq!(holes, vec![
            "https://example.com/same.png",
            "https://example.com/dir/pic.webp",
            "https://example.com/dir/btn.png",
        ]);
        let text = capture.text();
        assert!(text.contains(r#"src="https://cdn.test/other.png" "#));
        assert!(text.contains(r#"src="https://example.com/dir/movie.mp4" "#));
        assert!(text.contains(r#"src="https://example.com/dir/e.swf" "#));
    }

    #[test]
    fn test_cross_origin_image_input_keeps_url() {
        let frames = frames_for(r#"<input type="image" src="https://cdn.test/btn.png">"#, "https://example.com/");
        let capture = serialize(&frames, FrameId::TOP, &plain());
        assert!(capture.src_holes.is_empty());
        assert!(capture.text().contains(r#"src="https://cdn.test/btn.png" "#));
    }

    #[test]
    fn test_src_hole_sits_between_quotes() {
        let frames = frames_for(r#"<img src="a.png">"#, "https://example.com/");
        let capture = serialize(&frames, FrameId::TOP, &plain());
        let (&index, _) = capture.src_holes.iter().next().unwrap();
        assert_eq!(capture.html.get(index - 1), Some("src=\""));
        assert_eq!(capture.html.get(index), Some(""));
        assert_eq!(capture.html.get(index + 1), Some("\" "));
    }

    #[test]
    fn test_pseudo_elements_get_ids() {
        let html = r#"<style>
            .a:before { content: "•" }
            #b:after { content: "x" }
            .c:before { content: none }
        </style><span class="a">1</span><span id="b">2</span><span class="c">3</span>"#;
        let frames = frames_for(html, "https://example.com/");
        let text = serialize(&frames, FrameId::TOP, &plain()).text();

        assert!(text.contains(r#"id="snap-it0" "#));
        assert!(text.contains("#snap-it0:before{"));
        assert!(text.contains("#b:after{"));
        assert!(text.contains("\\2022 "));
        assert!(!text.contains("snap-it1"));
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let html = r#"<style>p:before { content: "x" }</style><p id="snap-it0">a</p><p>b</p>"#;
        let frames = frames_for(html, "https://example.com/");
        let text = serialize(&frames, FrameId::TOP, &plain()).text();
        assert!(text.contains(r#"id="snap-it1" "#));
    }

    #[test]
    fn test_iframe_gets_frame_hole() {
        let mut top = snap_html::parse(
            r#"<iframe src="child.html" srcdoc="old"></iframe><iframe></iframe>"#,
            Url::parse("https://example.com/").unwrap(),
        );
        let host = top.elements_by_tag("iframe")[0];
        top.tree_mut().set_attribute(host, "title", "t");
        let mut frames = FrameTree::new(top);
        let child = Document::new(Url::parse("https://example.com/child.html").unwrap());
        frames.add_child(FrameId::TOP, host, child).unwrap();

        let capture = serialize(&frames, FrameId::TOP, &plain());
        let addresses: Vec<String> = capture.frame_holes.values().map(|a| a.to_string()).collect();
        assert_eq!(addresses, vec!["0.0"]);

        let text = capture.text();
        assert!(!text.contains("child.html"));
        assert!(!text.contains("old"));
        // The unloaded second iframe gets an empty srcdoc
        assert!(text.contains(r#"<iframe style="#));
        assert!(text.contains(r#"srcdoc="" >"#));
    }

    #[test]
    fn test_nested_frame_escaping() {
        let top = snap_html::parse("<iframe></iframe>", Url::parse("https://example.com/").unwrap());
        let host = top.elements_by_tag("iframe")[0];
        let mut frames = FrameTree::new(top);
        let child_doc = snap_html::parse(
            r#"<p title='a"b'>&lt;&amp;</p>"#,
            Url::parse("about:srcdoc").unwrap(),
        );
        let child = frames.add_child(FrameId::TOP, host, child_doc).unwrap();

        let capture = serialize(&frames, child, &plain());
        assert_eq!(capture.frame_index.to_string(), "0.0");
        let text = capture.text();
        assert!(text.contains("title=&quot;a&amp;quot;b&quot; "));
        assert!(text.contains(">&amp;lt;&amp;amp;</p>"));
    }

    #[test]
    fn test_nested_pseudo_element_quotes() {
        let top = snap_html::parse("<iframe></iframe>", Url::parse("https://example.com/").unwrap());
        let host = top.elements_by_tag("iframe")[0];
        let mut frames = FrameTree::new(top);
        let child_doc = snap_html::parse(
            r#"<style>p:before { content: "x" }</style><p>a</p>"#,
            Url::parse("about:srcdoc").unwrap(),
        );
        let child = frames.add_child(FrameId::TOP, host, child_doc).unwrap();

        let text = serialize(&frames, child, &plain()).text();
        assert!(text.contains("#snap-it0:before{"), "{}", text);
        assert!(text.contains("content: &quot;x&quot;"), "{}", text);
        assert!(!text.contains("content: \"x\""));
    }

    #[test]
    fn test_minimizing_records_style_holes() {
        let frames = frames_for(r#"<div id="x">a</div><span>b</span>"#, "https://example.com/");
        let capture = serialize(&frames, FrameId::TOP, &CaptureConfig::default());
        let meta = capture.style.as_ref().unwrap();

        assert_eq!(meta.window_width, 1280);
        assert!(meta.root_style_index.is_some());
        assert_eq!(meta.root_style.get("display").map(String::as_str), Some("block"));
        assert!(meta.id_to_style_index.contains_key("x"));
        // head, body and span get generated ids; the root does not
        assert_eq!(meta.id_to_style_index.len(), 4);
        for index in meta.id_to_style_index.values() {
            assert_eq!(capture.html.get(*index), Some(""));
        }
        assert!(!capture.text().contains("style="));
    }

    #[test]
    fn test_fonts_from_accessible_and_pending_sheets() {
        let mut doc = snap_html::parse(
            r#"<style>@font-face { font-family: A; src: url(a.woff2) }</style>
               <link rel="stylesheet" href="https://fonts.test/f.css">"#,
            Url::parse("https://example.com/p/").unwrap(),
        );
        assert_eq!(doc.style_sheets().len(), 2);
        doc.style_sheets_mut()[1].text = Some(String::new());
        let frames = FrameTree::new(doc);

        let styles = StyleResolver::new();
        let serialized = TreeSerializer::new(&frames, FrameId::TOP, &styles, &plain())
            .unwrap()
            .serialize();
        assert_eq!(serialized.fonts.rules.len(), 1);
        assert!(serialized.fonts.rules[0].contains("https://example.com/p/a.woff2"));
        assert_eq!(serialized.fonts.pending.len(), 1);

        let text = serialized.into_capture().text();
        assert!(text.contains("<style>@font-face"));
    }

    #[test]
    fn test_repeated_id_keeps_full_style() {
        let frames = frames_for(
            r#"<div id="x" style="width: 5px">a</div><div id="x" style="height: 7px">b</div>"#,
            "https://example.com/",
        );
        let capture = serialize(&frames, FrameId::TOP, &CaptureConfig::default());
        let meta = capture.style.as_ref().unwrap();

        let index = meta.id_to_style_index["x"];
        assert_eq!(capture.html.get(index), Some(""));
        assert_eq!(meta.id_to_style_map["x"].get("width").map(String::as_str), Some("5px"));

        // The second div carries its whole computed style inline
        let text = capture.text();
        let second = &text[text.find(">a</div>").unwrap()..];
        assert!(second.starts_with(r#">a</div><div style=""#), "{}", second);
        assert!(second.contains("height: 7px;"), "{}", second);
    }
}
