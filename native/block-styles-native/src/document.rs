//! # Document Stylesheet
//!
//! Collects the persisted styles of every block in a rendered document into one
//! stylesheet for the front end.
//!
//! ## Key Invariants
//!
//! 1. **Document Order**: a block's CSS precedes its inner blocks' CSS; a reusable
//!    block reference is expanded in place.
//! 2. **Parse Once Per Request**: identical content and reusable references already
//!    seen in the same request are skipped. The memo lives in [`ParseState`], owned
//!    by the caller, so separate requests never share it.
//! 3. **Cycle Safety**: a reusable block that (transitively) references itself is
//!    expanded only once.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use crate::binder::BlockTypeRegistry;
use crate::block::Block;
use crate::compile::compile;
use crate::vars::{replace_vars, VariableResolver};

/// Source of reusable block content, keyed by reference id.
pub trait ReusableBlocks: Sync {
    fn blocks(&self, reference: u64) -> Option<Vec<Block>>;
}

impl ReusableBlocks for HashMap<u64, Vec<Block>> {
    fn blocks(&self, reference: u64) -> Option<Vec<Block>> {
        self.get(&reference).cloned()
    }
}

/// For documents without reusable blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReusableBlocks;

impl ReusableBlocks for NoReusableBlocks {
    fn blocks(&self, _reference: u64) -> Option<Vec<Block>> {
        None
    }
}

/// Request-scoped memo of what has already been collected.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    parsed_content: HashSet<String>,
    parsed_reusable: HashSet<u64>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_content_parsed(&self, blocks: &[Block]) -> bool {
        self.parsed_content.contains(&compute_hash(blocks))
    }

    pub fn is_reusable_parsed(&self, reference: u64) -> bool {
        self.parsed_reusable.contains(&reference)
    }
}

/// SHA-256 of the serialized block list.
pub fn compute_hash(blocks: &[Block]) -> String {
    let serialized = serde_json::to_string(blocks).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct DocumentStyles<'a> {
    reusable: &'a dyn ReusableBlocks,
    resolver: &'a dyn VariableResolver,
    registry: Option<&'a BlockTypeRegistry>,
}

impl<'a> DocumentStyles<'a> {
    pub fn new(reusable: &'a dyn ReusableBlocks, resolver: &'a dyn VariableResolver) -> Self {
        DocumentStyles {
            reusable,
            resolver,
            registry: None,
        }
    }

    /// Apply registered style filters (front-end context) to each block's CSS.
    pub fn with_registry(mut self, registry: &'a BlockTypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Stylesheet for `blocks`, or `None` if this exact content was already collected
    /// during the request.
    pub fn collect(&self, blocks: &[Block], state: &mut ParseState) -> Option<String> {
        if blocks.is_empty() {
            return None;
        }
        if !state.parsed_content.insert(compute_hash(blocks)) {
            log::debug!("content already collected in this request, skipping");
            return None;
        }

        let mut styled = Vec::new();
        self.gather(blocks, state, &mut styled);

        let rendered: Vec<Option<String>> = styled.par_iter().map(|b| self.block_css(b)).collect();
        Some(rendered.into_iter().flatten().collect::<Vec<_>>().join("\n"))
    }

    fn gather(&self, blocks: &[Block], state: &mut ParseState, out: &mut Vec<Block>) {
        for block in blocks {
            if let Some(reference) = block.reusable_ref() {
                if state.parsed_reusable.insert(reference) {
                    match self.reusable.blocks(reference) {
                        Some(inner) => self.gather(&inner, state, out),
                        None => log::debug!("reusable block {} not found", reference),
                    }
                }
            }

            if !block.style_attributes().styles.is_empty() {
                out.push(block.clone());
            }

            self.gather(&block.inner_blocks, state, out);
        }
    }

    fn block_css(&self, block: &Block) -> Option<String> {
        let styles = block.style_attributes().styles;
        let mut css = compile(&styles, "", false);
        if let Some(block_type) = self.registry.and_then(|r| r.get(&block.name)) {
            css = block_type.filter_styles(css, &styles, false, &block.attributes);
        }
        if css.is_empty() {
            return None;
        }
        Some(replace_vars(&css, self.resolver))
    }
}
