//! CSS Parser using lightningcss
//!
//! Parses CSS stylesheets and `style` attributes into our internal
//! representation. Style rules nested in `@media` are flattened in source
//! order; other at-rules are skipped. Shorthands are expanded into their
//! longhands so the cascade only ever sees longhand names.

use lightningcss::declaration::DeclarationBlock;
use lightningcss::properties::{Property, PropertyId};
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;

use crate::{split_top_level, CssError, Declaration, Rule, Selector, Stylesheet};

/// CSS Parser
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };

        let stylesheet = StyleSheet::parse(css, options).map_err(|e| CssError::ParseError {
            line: e.loc.as_ref().map(|l| l.line + 1).unwrap_or(0),
            message: e.kind.to_string(),
        })?;

        let mut result = Stylesheet::new();
        self.convert_rules(&stylesheet.rules, &mut result);
        tracing::debug!("Parsed stylesheet with {} rules", result.len());
        Ok(result)
    }

    fn convert_rules(&self, rules: &CssRuleList, out: &mut Stylesheet) {
        for rule in rules.0.iter() {
            match rule {
                CssRule::Style(style_rule) => {
                    let Ok(text) = style_rule.selectors.to_css_string(PrinterOptions::default()) else {
                        continue;
                    };
                    let selectors: Vec<Selector> = split_top_level(&text, ',')
                        .into_iter()
                        .filter_map(Selector::parse)
                        .collect();
                    if selectors.is_empty() {
                        tracing::trace!("Skipping unsupported selector {:?}", text);
                        continue;
                    }
                    let declarations = convert_declarations(&style_rule.declarations);
                    out.rules.push(Rule { selectors, declarations });
                }
                CssRule::Media(media_rule) => self.convert_rules(&media_rule.rules, out),
                // @font-face, @keyframes, @import etc. don't produce element styles
                _ => {}
            }
        }
    }

    /// Parse a declaration list such as a `style` attribute or `cssText`.
    /// Invalid declarations are dropped.
    pub fn parse_declarations(&self, text: &str) -> Vec<Declaration> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        match StyleAttribute::parse(text, options) {
            Ok(attribute) => convert_declarations(&attribute.declarations),
            Err(e) => {
                tracing::trace!("Dropping style attribute {:?}: {}", text, e.kind);
                Vec::new()
            }
        }
    }
}

fn convert_declarations(block: &DeclarationBlock) -> Vec<Declaration> {
    let normal = block.declarations.iter().map(|p| (p, false));
    let important = block.important_declarations.iter().map(|p| (p, true));

    let mut out = Vec::new();
    for (prop, important) in normal.chain(important) {
        push_longhands(prop, important, &mut out);
    }
    out
}

/// Push `prop`, or its longhands when it is a shorthand. Shorthands
/// holding `var()` stay whole.
fn push_longhands(prop: &Property, important: bool, out: &mut Vec<Declaration>) {
    let id = prop.property_id();
    let longhands = id.longhands().unwrap_or_default();
    let parts: Vec<Property> = longhands.iter().filter_map(|l| prop.longhand(l)).collect();
    if !parts.is_empty() {
        for part in &parts {
            push_longhands(part, important, out);
        }
        return;
    }

    let Ok(value) = prop.value_to_css_string(PrinterOptions::default()) else { return };
    if is_wide_keyword(&value) {
        push_keyword(&id, &value, important, out);
    } else {
        out.push(declaration(id.name(), &value, important));
    }
}

/// `margin: inherit` and friends apply the keyword to every longhand
fn push_keyword(id: &PropertyId, value: &str, important: bool, out: &mut Vec<Declaration>) {
    match id.longhands() {
        Some(longhands) if !longhands.is_empty() => {
            for longhand in &longhands {
                push_keyword(longhand, value, important, out);
            }
        }
        _ => out.push(declaration(id.name(), value, important)),
    }
}

fn is_wide_keyword(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "inherit" | "initial" | "unset" | "revert" | "revert-layer")
}

fn declaration(property: &str, value: &str, important: bool) -> Declaration {
    let mut decl = Declaration::new(property, value);
    decl.important = important;
    decl
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}
