//! CSS Selectors
//!
//! A compact selector engine covering type, id, class, attribute and
//! structural selectors with descendant and child combinators, plus a
//! trailing `:before`/`:after` pseudo-element. Anything outside that set
//! fails to parse and the selector is dropped.

use snap_dom::{DomTree, ElementData, NodeId};

/// Pseudo-element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// ::before - content before element
    Before,
    /// ::after - content after element
    After,
}

impl PseudoElement {
    /// Parse from string, with or without leading colons
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim_start_matches(':').to_ascii_lowercase().as_str() {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            _ => None,
        }
    }

    /// Single-colon form used in generated rules
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => ":before",
            Self::After => ":after",
        }
    }
}

/// Selector specificity (ids, classes, types)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
    pseudo_classes: Vec<PseudoClass>,
    universal: bool,
}

impl Compound {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }

    fn matches(&self, tree: &DomTree, node: NodeId, elem: &ElementData) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != elem.tag_name()) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| elem.id() != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|c| elem.classes().any(|ec| ec == c)) {
            return false;
        }
        let attrs_ok = self.attrs.iter().all(|(name, op)| match (op, elem.get_attr(name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Includes(v), Some(actual)) => actual.split_ascii_whitespace().any(|w| w == v),
        });
        if !attrs_ok {
            return false;
        }
        self.pseudo_classes.iter().all(|pc| match pc {
            PseudoClass::Root => tree.parent_element(node).is_none(),
            PseudoClass::FirstChild => !has_element_sibling(tree, node, true),
            PseudoClass::LastChild => !has_element_sibling(tree, node, false),
        })
    }
}

fn has_element_sibling(tree: &DomTree, node: NodeId, before: bool) -> bool {
    let step = |id: NodeId| {
        tree.get(id).map(|n| if before { n.prev_sibling } else { n.next_sibling })
    };
    let mut cur = step(node);
    while let Some(id) = cur.filter(|id| id.is_valid()) {
        if tree.element(id).is_some() {
            return true;
        }
        cur = step(id);
    }
    false
}

/// A single complex selector, e.g. `ul > li.item:before`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    text: String,
    compounds: Vec<Compound>,
    /// combinators[i] joins compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
    pseudo: Option<PseudoElement>,
    specificity: Specificity,
}

impl Selector {
    /// Parse one selector (no commas). Returns None for unsupported syntax.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let mut parser = SelectorParser { chars: text.chars().collect(), pos: 0 };
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pseudo = None;

        loop {
            let (compound, pe) = parser.compound()?;
            if compound.is_empty() && pe.is_none() {
                return None;
            }
            compounds.push(compound);

            let had_space = parser.skip_whitespace();
            if pe.is_some() {
                pseudo = pe;
                if !parser.at_end() {
                    return None;
                }
                break;
            }
            if parser.at_end() {
                break;
            }
            match parser.peek() {
                Some('>') => {
                    parser.pos += 1;
                    parser.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some('+' | '~' | ',') => return None,
                _ if had_space => combinators.push(Combinator::Descendant),
                _ => return None,
            }
        }

        let specificity = compute_specificity(&compounds, pseudo);
        Some(Self { text: text.to_string(), compounds, combinators, pseudo, specificity })
    }

    /// Source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Trailing pseudo-element, if any
    pub fn pseudo_element(&self) -> Option<PseudoElement> {
        self.pseudo
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Whether the selector matches `node`, ignoring any pseudo-element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(tree, node, n - 1),
        }
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        let Some(elem) = tree.element(node) else { return false };
        if !self.compounds[idx].matches(tree, node, elem) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|p| self.matches_from(tree, p, idx - 1)),
            Combinator::Descendant => {
                let mut cur = tree.parent_element(node);
                while let Some(p) = cur {
                    if self.matches_from(tree, p, idx - 1) {
                        return true;
                    }
                    cur = tree.parent_element(p);
                }
                false
            }
        }
    }
}

fn compute_specificity(compounds: &[Compound], pseudo: Option<PseudoElement>) -> Specificity {
    let mut spec = Specificity::default();
    for c in compounds {
        spec.0 += c.id.is_some() as u32;
        spec.1 += (c.classes.len() + c.attrs.len() + c.pseudo_classes.len()) as u32;
        spec.2 += c.tag.is_some() as u32;
    }
    spec.2 += pseudo.is_some() as u32;
    spec
}

struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    fn quoted_or_ident(&mut self) -> Option<String> {
        match self.peek()? {
            q @ ('"' | '\'') => {
                self.pos += 1;
                let start = self.pos;
                while self.peek()? != q {
                    self.pos += 1;
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Some(value)
            }
            _ => self.ident(),
        }
    }

    fn compound(&mut self) -> Option<(Compound, Option<PseudoElement>)> {
        let mut compound = Compound::default();

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.universal = true;
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let name = self.ident()?.to_ascii_lowercase();
                    self.skip_whitespace();
                    let op = match self.peek()? {
                        ']' => AttrOp::Exists,
                        '=' => {
                            self.pos += 1;
                            self.skip_whitespace();
                            AttrOp::Equals(self.quoted_or_ident()?)
                        }
                        '~' if self.chars.get(self.pos + 1) == Some(&'=') => {
                            self.pos += 2;
                            self.skip_whitespace();
                            AttrOp::Includes(self.quoted_or_ident()?)
                        }
                        _ => return None,
                    };
                    self.skip_whitespace();
                    if self.peek()? != ']' {
                        return None;
                    }
                    self.pos += 1;
                    compound.attrs.push((name, op));
                }
                ':' => {
                    self.pos += 1;
                    let double = self.peek() == Some(':');
                    if double {
                        self.pos += 1;
                    }
                    let name = self.ident()?.to_ascii_lowercase();
                    if let Some(pe) = PseudoElement::parse(&name) {
                        return Some((compound, Some(pe)));
                    }
                    if double {
                        return None;
                    }
                    compound.pseudo_classes.push(match name.as_str() {
                        "root" => PseudoClass::Root,
                        "first-child" => PseudoClass::FirstChild,
                        "last-child" => PseudoClass::LastChild,
                        _ => return None,
                    });
                }
                _ => break,
            }
        }

        Some((compound, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let html = tree.append_element(tree.root(), "html");
        let body = tree.append_element(html, "body");
        let ul = tree.append_element(body, "ul");
        tree.set_attribute(ul, "class", "menu main");
        let li = tree.append_element(ul, "li");
        tree.set_attribute(li, "id", "first");
        tree.set_attribute(li, "data-x", "1");
        (tree, html, ul, li)
    }

    #[test]
    fn test_pseudo_element_parse() {
        assert_eq!(PseudoElement::parse("::before"), Some(PseudoElement::Before));
        assert_eq!(PseudoElement::parse(":after"), Some(PseudoElement::After));
        assert_eq!(PseudoElement::parse("marker"), None);
        assert_eq!(PseudoElement::After.as_str(), ":after");
    }

    #[test]
    fn test_specificity() {
        let s = Selector::parse("ul.menu > li#first:before").unwrap();
        assert_eq!(s.specificity(), Specificity(1, 1, 3));
        assert_eq!(s.pseudo_element(), Some(PseudoElement::Before));
    }

    #[test]
    fn test_matching() {
        let (tree, html, ul, li) = tree();
        assert!(Selector::parse("li").unwrap().matches(&tree, li));
        assert!(Selector::parse("body li").unwrap().matches(&tree, li));
        assert!(Selector::parse(".menu > #first").unwrap().matches(&tree, li));
        assert!(!Selector::parse("body > li").unwrap().matches(&tree, li));
        assert!(Selector::parse("ul.main.menu").unwrap().matches(&tree, ul));
        assert!(Selector::parse("[data-x=\"1\"]").unwrap().matches(&tree, li));
        assert!(Selector::parse("[class~=main]").unwrap().matches(&tree, ul));
        assert!(Selector::parse(":root").unwrap().matches(&tree, html));
        assert!(Selector::parse("li:first-child:last-child").unwrap().matches(&tree, li));
        assert!(Selector::parse("*").unwrap().matches(&tree, ul));
    }

    #[test]
    fn test_unsupported() {
        assert!(Selector::parse("a:hover").is_none());
        assert!(Selector::parse("a + b").is_none());
        assert!(Selector::parse("p::first-line").is_none());
        assert!(Selector::parse("p:before span").is_none());
        assert!(Selector::parse("").is_none());
    }
}
