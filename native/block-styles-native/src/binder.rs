//! Style Attribute Binder
//!
//! Keeps a block's persisted style state (`id`, `className`, `styles`) in sync with
//! what its block type derives from the current attributes.
//!
//! ## Key Invariants
//!
//! 1. **Write Only On Change**: a bind whose identity and tree match what is stored
//!    yields [`BindOutcome::Unchanged`]. Running it again after applying an update
//!    is a no-op.
//! 2. **Recheck On Mount Only**: duplicate detection (`force_recheck`) runs when the
//!    block mounts, which covers duplicate and paste. Attribute edits reuse the
//!    stored identity.
//! 3. **Clear When Empty**: an empty tree with style state still stored clears all
//!    three fields.
//! 4. **Absent Callbacks Are No-ops**: no style callback means an empty tree, no
//!    selector callback means `.<className>`, no filter means the CSS is unchanged.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::block::{Block, StyleAttributes};
use crate::compile::compile;
use crate::identity::Allocator;
use crate::options::StyleOptions;
use crate::tree::StyleTree;
use crate::vars::{replace_vars, VariableResolver};

/// Save-element attribute carrying the escaped, compiled CSS of a block.
pub const SAVE_STYLES_ATTR: &str = "data-ghostkit-styles";
pub const SAVE_CLASS_ATTR: &str = "className";

pub type StylesCallback = Box<dyn Fn(&Map<String, Value>) -> StyleTree + Send + Sync>;
pub type SelectorCallback = Box<dyn Fn(&str) -> String + Send + Sync>;
pub type StylesFilter =
    Box<dyn Fn(&str, &StyleTree, bool, &Map<String, Value>) -> String + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Style hooks of one block type.
pub struct BlockType {
    pub name: String,
    styles_callback: Option<StylesCallback>,
    custom_selector: Option<SelectorCallback>,
    styles_filter: Option<StylesFilter>,
}

impl BlockType {
    pub fn new(name: &str) -> Self {
        BlockType {
            name: name.to_string(),
            styles_callback: None,
            custom_selector: None,
            styles_filter: None,
        }
    }

    pub fn with_styles<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> StyleTree + Send + Sync + 'static,
    {
        self.styles_callback = Some(Box::new(callback));
        self
    }

    pub fn with_selector<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.custom_selector = Some(Box::new(callback));
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &StyleTree, bool, &Map<String, Value>) -> String + Send + Sync + 'static,
    {
        self.styles_filter = Some(Box::new(filter));
        self
    }

    pub fn custom_styles(&self, attributes: &Map<String, Value>) -> StyleTree {
        match &self.styles_callback {
            Some(callback) => callback(attributes),
            None => StyleTree::new(),
        }
    }

    pub fn selector(&self, base: &str) -> String {
        match &self.custom_selector {
            Some(callback) => callback(base),
            None => base.to_string(),
        }
    }

    pub fn filter_styles(
        &self,
        css: String,
        tree: &StyleTree,
        is_editor: bool,
        attributes: &Map<String, Value>,
    ) -> String {
        match &self.styles_filter {
            Some(filter) => filter(&css, tree, is_editor, attributes),
            None => css,
        }
    }
}

#[derive(Default)]
pub struct BlockTypeRegistry {
    types: HashMap<String, BlockType>,
}

impl BlockTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, block_type: BlockType) {
        if self.types.contains_key(&block_type.name) {
            log::debug!("block type '{}' re-registered, using latest definition", block_type.name);
        }
        self.types.insert(block_type.name.clone(), block_type);
    }

    pub fn get(&self, name: &str) -> Option<&BlockType> {
        self.types.get(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    Unchanged,
    Update(StyleAttributes),
    Clear,
}

impl BindOutcome {
    /// Write the outcome into an attribute bag. Returns true if anything was written.
    pub fn apply(&self, attributes: &mut Map<String, Value>) -> bool {
        match self {
            BindOutcome::Unchanged => false,
            BindOutcome::Update(next) => {
                next.write(attributes);
                true
            }
            BindOutcome::Clear => {
                StyleAttributes::default().write(attributes);
                true
            }
        }
    }
}

#[derive(Default)]
pub struct StyleBinder {
    allocator: Allocator,
}

impl StyleBinder {
    pub fn new(allocator: Allocator) -> Self {
        StyleBinder { allocator }
    }

    pub fn from_options(options: &StyleOptions) -> Self {
        Self::new(Allocator::from_options(options))
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Run on mount (`mount = true`) and after every attribute change.
    pub fn bind(
        &self,
        block: &Block,
        document: &[Block],
        block_type: &BlockType,
        mount: bool,
    ) -> BindOutcome {
        let current = block.style_attributes();
        let tree = block_type.custom_styles(&block.attributes);

        if tree.is_empty() {
            return if current.has_style_state() {
                log::debug!("block {} lost its styles, clearing", block.client_id);
                BindOutcome::Clear
            } else {
                BindOutcome::Unchanged
            };
        }

        let identity = self.allocator.allocate(block, document, mount);
        if identity.is_empty() {
            return BindOutcome::Unchanged;
        }

        let selector = block_type.selector(&format!(".{}", identity.class_name));
        let mut styles = StyleTree::new();
        styles.insert(selector, Value::Object(tree));

        let next = StyleAttributes {
            id: identity.id,
            class_name: identity.class_name,
            styles,
        };

        if next == current {
            BindOutcome::Unchanged
        } else {
            log::debug!("block {} styles changed", block.client_id);
            BindOutcome::Update(next)
        }
    }

    /// Bind through a registry. Blocks of unknown types are left untouched.
    pub fn bind_registered(
        &self,
        block: &Block,
        document: &[Block],
        registry: &BlockTypeRegistry,
        mount: bool,
    ) -> BindOutcome {
        match registry.get(&block.name) {
            Some(block_type) => self.bind(block, document, block_type, mount),
            None => BindOutcome::Unchanged,
        }
    }

    /// CSS for the editor's `<style>` element: unescaped, filtered for the editor,
    /// variables resolved.
    pub fn live_styles(
        &self,
        block: &Block,
        block_type: &BlockType,
        resolver: &dyn VariableResolver,
    ) -> Option<String> {
        let attrs = block.style_attributes();
        if attrs.class_name.is_empty() || attrs.styles.is_empty() {
            return None;
        }
        let css = compile(&attrs.styles, "", false);
        let css = block_type.filter_styles(css, &attrs.styles, true, &block.attributes);
        Some(replace_vars(&css, resolver))
    }

    /// Escaped CSS persisted with the saved block markup. Variables stay unresolved.
    pub fn export_styles(&self, block: &Block, block_type: &BlockType) -> Option<String> {
        let attrs = block.style_attributes();
        if attrs.styles.is_empty() {
            return None;
        }
        let css = compile(&attrs.styles, "", true);
        Some(block_type.filter_styles(css, &attrs.styles, false, &block.attributes))
    }

    /// Add the styles attribute and the block class to a save element's props.
    pub fn save_props(
        &self,
        mut props: Map<String, Value>,
        block: &Block,
        block_type: &BlockType,
    ) -> Map<String, Value> {
        let Some(css) = self.export_styles(block, block_type) else {
            return props;
        };
        props.insert(SAVE_STYLES_ATTR.to_string(), Value::String(css));

        let class_name = block.style_attributes().class_name;
        if !class_name.is_empty() {
            let existing = props.get(SAVE_CLASS_ATTR).and_then(Value::as_str);
            let merged = merge_class_names(existing, &class_name);
            props.insert(SAVE_CLASS_ATTR.to_string(), Value::String(merged));
        }
        props
    }
}

/// Append `extra` to a space-separated class list, dropping duplicates.
pub fn merge_class_names(existing: Option<&str>, extra: &str) -> String {
    let mut classes: Vec<&str> = Vec::new();
    for class in existing
        .unwrap_or_default()
        .split_whitespace()
        .chain(extra.split_whitespace())
    {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    classes.join(" ")
}

/// Keep style state when a block is transformed into another type. Applies only
/// when the first source block is the same instance and holds styles.
pub fn carry_over_on_transform(transformed: &mut Block, sources: &[Block]) -> bool {
    let Some(source) = sources.first() else {
        return false;
    };
    if source.client_id != transformed.client_id {
        return false;
    }
    let attrs = source.style_attributes();
    if attrs.styles.is_empty() {
        return false;
    }
    attrs.write(&mut transformed.attributes);
    true
}
