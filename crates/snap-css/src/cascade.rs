//! Style Cascade & Resolver
//!
//! Computes the final styles for DOM elements by:
//! 1. Matching selectors against elements
//! 2. Sorting by importance, origin, specificity and source order
//! 3. Resolving `inherit`/`initial`/`unset` against the parent style

use snap_dom::{Document, DomTree, NodeId};

use crate::computed::ComputedStyle;
use crate::properties::{initial_value, is_inherited, ua_declarations};
use crate::{parse_declarations, CssParser, Declaration, PseudoElement, Specificity, Stylesheet};

/// Anything that can report computed styles for a document's elements
pub trait StyleSource {
    /// Computed style of an element
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> ComputedStyle;

    /// Computed style of a pseudo-element, or None when no rule targets it
    fn pseudo_style(&self, tree: &DomTree, node: NodeId, pseudo: PseudoElement) -> Option<ComputedStyle>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    UserAgent,
    Author,
    Inline,
}

/// (important, origin, specificity, source order)
type CascadeKey = (bool, Origin, Specificity, usize);

/// Style resolver - computes styles for DOM elements
#[derive(Debug, Default, Clone)]
pub struct StyleResolver {
    /// Author stylesheets (page CSS) in document order
    author_styles: Vec<Stylesheet>,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with every readable stylesheet of `document`
    pub fn for_document(document: &Document) -> Self {
        let parser = CssParser::new();
        let mut resolver = Self::new();
        for sheet in document.style_sheets() {
            let Some(text) = sheet.text.as_deref() else { continue };
            match parser.parse(text) {
                Ok(parsed) => resolver.add_stylesheet(parsed),
                Err(e) => tracing::warn!("Ignoring unparsable stylesheet: {}", e),
            }
        }
        resolver
    }

    /// Add an author stylesheet
    pub fn add_stylesheet(&mut self, stylesheet: Stylesheet) {
        self.author_styles.push(stylesheet);
    }

    /// Number of author stylesheets
    pub fn len(&self) -> usize {
        self.author_styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.author_styles.is_empty()
    }

    /// Compute the style of `node` given its parent's computed style
    pub fn compute_style(&self, tree: &DomTree, node: NodeId, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let mut matches = Vec::new();

        if let Some(elem) = tree.element(node) {
            for (i, decl) in ua_declarations(elem.tag_name()).into_iter().enumerate() {
                matches.push(((false, Origin::UserAgent, Specificity::default(), i), decl));
            }
        }

        self.collect_matches(tree, node, None, &mut matches);

        if let Some(inline) = tree.element(node).and_then(|e| e.get_attr("style")) {
            for (i, decl) in parse_declarations(inline).into_iter().enumerate() {
                matches.push(((decl.important, Origin::Inline, Specificity::default(), i), decl));
            }
        }

        cascade(matches, parent)
    }

    fn collect_matches(
        &self,
        tree: &DomTree,
        node: NodeId,
        pseudo: Option<PseudoElement>,
        matches: &mut Vec<(CascadeKey, Declaration)>,
    ) {
        let mut order = 0;
        for sheet in &self.author_styles {
            for rule in &sheet.rules {
                let best = rule.selectors.iter()
                    .filter(|s| s.pseudo_element() == pseudo && s.matches(tree, node))
                    .map(|s| s.specificity())
                    .max();
                if let Some(spec) = best {
                    for decl in &rule.declarations {
                        matches.push(((decl.important, Origin::Author, spec, order), decl.clone()));
                        order += 1;
                    }
                } else {
                    order += rule.declarations.len();
                }
            }
        }
    }

    /// Styles of `node` and all its ancestors, root first
    fn ancestor_chain(&self, tree: &DomTree, node: NodeId) -> Option<ComputedStyle> {
        let mut chain = vec![node];
        let mut cur = tree.parent_element(node);
        while let Some(p) = cur {
            chain.push(p);
            cur = tree.parent_element(p);
        }

        let mut style: Option<ComputedStyle> = None;
        for id in chain.into_iter().rev() {
            style = Some(self.compute_style(tree, id, style.as_ref()));
        }
        style
    }
}

impl StyleSource for StyleResolver {
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> ComputedStyle {
        self.ancestor_chain(tree, node).unwrap_or_else(ComputedStyle::initial)
    }

    fn pseudo_style(&self, tree: &DomTree, node: NodeId, pseudo: PseudoElement) -> Option<ComputedStyle> {
        tree.element(node)?;
        let mut matches = Vec::new();
        self.collect_matches(tree, node, Some(pseudo), &mut matches);
        if matches.is_empty() {
            return None;
        }
        let parent = self.computed_style(tree, node);
        Some(cascade(matches, Some(&parent)))
    }
}

/// Apply sorted declarations on top of initial + inherited values
fn cascade(mut matches: Vec<(CascadeKey, Declaration)>, parent: Option<&ComputedStyle>) -> ComputedStyle {
    matches.sort_by(|a, b| a.0.cmp(&b.0));

    let mut style = ComputedStyle::initial();
    if let Some(parent) = parent {
        for (name, value) in parent.iter() {
            if is_inherited(name) {
                style.set(name, value);
            }
        }
    }

    for (_, decl) in &matches {
        apply_declaration(&mut style, decl, parent);
    }
    style
}

fn apply_declaration(style: &mut ComputedStyle, decl: &Declaration, parent: Option<&ComputedStyle>) {
    let name = decl.property.as_str();
    let inherited_value = || parent.and_then(|p| p.get(name)).map(str::to_string);

    let value = match decl.value.to_ascii_lowercase().as_str() {
        "inherit" => inherited_value().or_else(|| initial_value(name).map(str::to_string)),
        "initial" => initial_value(name).map(str::to_string),
        "unset" if is_inherited(name) => inherited_value().or_else(|| initial_value(name).map(str::to_string)),
        "unset" => initial_value(name).map(str::to_string),
        _ => Some(decl.value.clone()),
    };

    match value {
        Some(value) => style.set(name, &value),
        None => {
            style.remove(name);
        }
    }
}
