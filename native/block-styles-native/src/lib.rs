//! # Block Styles Compiler
//!
//! Turns the nested, attribute-driven style description of a block into flat CSS,
//! and gives every styled block a document-unique class name to hang that CSS on.
//!
//! ## Pipeline
//!
//! 1. **Binder** ([`binder`]): asks the block type for a style tree built from the
//!    block's attributes and persists `{ id, className, styles }` only on change.
//! 2. **Allocator** ([`identity`]): supplies `id`/`className`, redrawing only for
//!    empty or duplicated ids.
//! 3. **Compiler** ([`compile`]): `classify -> accumulate -> render`. Escape on for
//!    the persisted form, off for the live editor preview.
//! 4. **Variables** ([`vars`]): breakpoint placeholders are resolved at display time.
//! 5. **Document** ([`document`]): front-end stylesheet for a whole block tree.
//!
//! ## Output Invariants
//!
//! 1. **Determinism**: same input, byte-identical CSS.
//! 2. **Child Scopes First**: nested scope output precedes a level's own flat rules.
//! 3. **Legacy Escapes**: `u0026`, `u003e`, `u003c`, `u0022`, `u0027` from XML exports
//!    are decoded behind [`escape::EscapeDecoder`].

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod binder;
pub mod block;
pub mod compile;
pub mod document;
pub mod error;
pub mod escape;
pub mod identity;
pub mod normalize;
pub mod options;
pub mod tree;
pub mod vars;
pub mod visitor;

#[cfg(test)]
mod binder_tests;
#[cfg(test)]
mod normalize_tests;

pub use binder::{BindOutcome, BlockType, BlockTypeRegistry, StyleBinder};
pub use block::{Block, StyleAttributes};
pub use compile::{compile, compile_json, StyleCompiler};
pub use document::{DocumentStyles, ParseState};
pub use error::StyleError;
pub use identity::{Allocator, BlockIdentity, IdGenerator, ShortHash};
pub use normalize::{normalize, Declaration};
pub use options::StyleOptions;
pub use tree::StyleTree;
pub use vars::{replace_vars, MediaSizes, VariableResolver};

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn to_napi(err: StyleError) -> napi::Error {
    napi::Error::from_reason(err.to_string())
}

/// Compile a JSON style tree. `escape` defaults to the persisted form.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_styles_native(
    tree_json: String,
    selector: Option<String>,
    escape: Option<bool>,
) -> napi::Result<String> {
    compile_json(
        &tree_json,
        selector.as_deref().unwrap_or(""),
        escape.unwrap_or(true),
    )
    .map_err(to_napi)
}

/// Resolve breakpoint placeholders using the media sizes from `options_json`.
#[cfg(feature = "napi")]
#[napi]
pub fn replace_vars_native(css: String, options_json: Option<String>) -> napi::Result<String> {
    let options = match options_json {
        Some(json) => StyleOptions::from_json(&json).map_err(to_napi)?,
        None => StyleOptions::default(),
    };
    Ok(replace_vars(&css, &MediaSizes::from_options(&options)))
}

/// Returns the allocated identity as `{ "id": ..., "className": ... }` JSON.
#[cfg(feature = "napi")]
#[napi]
pub fn allocate_identity_native(
    block_json: String,
    document_json: String,
    force_recheck: bool,
) -> napi::Result<String> {
    let block: Block = serde_json::from_str(&block_json)
        .map_err(|e| to_napi(StyleError::json("block", e)))?;
    let document: Vec<Block> = serde_json::from_str(&document_json)
        .map_err(|e| to_napi(StyleError::json("document", e)))?;

    let identity = Allocator::default().allocate(&block, &document, force_recheck);
    serde_json::to_string(&identity).map_err(|e| napi::Error::from_reason(e.to_string()))
}
