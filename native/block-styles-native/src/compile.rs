//! Style Tree Compiler
//!
//! `tree -> classify -> accumulate -> render -> CSS text`
//!
//! ## Key Invariants
//!
//! 1. **Determinism**: same tree, ancestor and escape flag give byte-identical output.
//!    The binder's change detection relies on it.
//! 2. **Child Scopes First**: at every level, everything produced by nested scopes
//!    (in key order) is emitted before the level's own flat rules.
//! 3. **Placeholders Stay Opaque**: `media_*` wrappers emit a variable token; the
//!    compiler never resolves it (see [`crate::vars`]).
//! 4. **Permissive Keys**: a key that is neither a breakpoint nor a feature query is
//!    always composed as a selector, never rejected.

use crate::error::{json_kind, StyleError};
use crate::escape::{escape_selector, EscapeDecoder, LegacyEscapes};
use crate::normalize::{normalize_with, Declaration};
use crate::options::StyleOptions;
use crate::tree::{classify, StyleNode, StyleTree};
use crate::vars::breakpoint_placeholder;

// ═══════════════════════════════════════════════════════════════════════════════
// ACCUMULATED CSS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum CssBlock {
    Rule(CssRule),
    /// `@media` / `@supports` wrapper around already-resolved blocks.
    Group { prelude: String, body: Vec<CssBlock> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct StyleCompiler<'d> {
    decoder: &'d dyn EscapeDecoder,
    escape: bool,
}

impl StyleCompiler<'static> {
    /// Compiler using the legacy escape decoder.
    pub fn new(escape: bool) -> Self {
        StyleCompiler {
            decoder: &LegacyEscapes,
            escape,
        }
    }

    pub fn from_options(options: &StyleOptions) -> Self {
        Self::new(options.escape)
    }
}

impl<'d> StyleCompiler<'d> {
    pub fn with_decoder(decoder: &'d dyn EscapeDecoder, escape: bool) -> Self {
        StyleCompiler { decoder, escape }
    }

    pub fn escape(&self) -> bool {
        self.escape
    }

    pub fn compile(&self, tree: &StyleTree, ancestor: &str) -> String {
        let nodes = classify(tree);
        let blocks = self.accumulate(&nodes, ancestor);
        render(&blocks)
    }

    /// Second pass: resolve selectors and group declarations per selector.
    pub fn accumulate(&self, nodes: &[StyleNode], selector: &str) -> Vec<CssBlock> {
        let mut blocks = Vec::new();
        let mut rules: Vec<CssRule> = Vec::new();

        for node in nodes {
            match node {
                StyleNode::Media(media) => {
                    let body = self.accumulate(&media.children, selector);
                    if !body.is_empty() {
                        blocks.push(CssBlock::Group {
                            prelude: format!("@media {}", breakpoint_placeholder(media.breakpoint())),
                            body,
                        });
                    }
                }
                StyleNode::Supports(supports) => {
                    let body = self.accumulate(&supports.children, selector);
                    if !body.is_empty() {
                        blocks.push(CssBlock::Group {
                            prelude: supports.condition.clone(),
                            body,
                        });
                    }
                }
                StyleNode::Selector(nested) => {
                    let composed = self.compose_selector(selector, &nested.key);
                    blocks.extend(self.accumulate(&nested.children, &composed));
                }
                StyleNode::Leaf(leaf) => {
                    let Some(declaration) =
                        normalize_with(self.decoder, &leaf.property, &leaf.value)
                    else {
                        continue;
                    };
                    let resolved = self.resolve_selector(selector);
                    match rules.iter_mut().find(|rule| rule.selector == resolved) {
                        Some(rule) => rule.declarations.push(declaration),
                        None => rules.push(CssRule {
                            selector: resolved,
                            declarations: vec![declaration],
                        }),
                    }
                }
            }
        }

        blocks.extend(rules.into_iter().map(CssBlock::Rule));
        blocks
    }

    /// Compose a nested key with its ancestor selector.
    ///
    /// Priority: `&` references, then encoded `u0026` references, then a descendant
    /// combinator. Without an ancestor the key is used as is.
    pub fn compose_selector(&self, ancestor: &str, key: &str) -> String {
        if ancestor.is_empty() {
            return key.to_string();
        }
        if key.contains('&') {
            return key.replace('&', ancestor);
        }
        if let Some(substituted) = self.decoder.substitute_parent(key, ancestor) {
            return substituted;
        }
        format!("{} {}", ancestor, key)
    }

    fn resolve_selector(&self, selector: &str) -> String {
        let decoded = self.decoder.decode_selector(selector);
        if self.escape {
            escape_selector(&decoded).into_owned()
        } else {
            decoded.into_owned()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Third pass. Blocks are joined with a single space.
pub fn render(blocks: &[CssBlock]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_block(block: &CssBlock) -> String {
    match block {
        CssBlock::Rule(rule) => {
            let declarations: String = rule
                .declarations
                .iter()
                .map(|d| format!(" {}", d))
                .collect();
            format!("{} {{{} }}", rule.selector, declarations)
        }
        CssBlock::Group { prelude, body } => format!("{} {{ {} }}", prelude, render(body)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Compile a style tree with the legacy escape decoder.
///
/// `escape = true` produces the persisted form (`>`/`<` in selectors become
/// entities); `escape = false` produces CSS for direct injection into a `<style>`
/// element.
pub fn compile(tree: &StyleTree, ancestor: &str, escape: bool) -> String {
    StyleCompiler::new(escape).compile(tree, ancestor)
}

/// Compile a tree received as JSON text.
pub fn compile_json(json: &str, ancestor: &str, escape: bool) -> Result<String, StyleError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| StyleError::json("style tree", e))?;
    match value {
        serde_json::Value::Object(tree) => Ok(compile(&tree, ancestor, escape)),
        other => Err(StyleError::NotAnObject {
            what: "style tree",
            found: json_kind(&other),
        }),
    }
}
