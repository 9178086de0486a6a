//! Style tree classification.
//!
//! First compiler pass: every key of a [`StyleTree`] becomes a tagged
//! [`StyleNode`]. Scope keys are classified by prefix only:
//!
//! 1. `media_<name>` -> [`StyleNode::Media`]
//! 2. `@supports...` -> [`StyleNode::Supports`]
//! 3. anything else  -> [`StyleNode::Selector`]
//!
//! Leaves are kept as raw JSON values; `false` and `null` leaves are dropped here so
//! later passes never see them.

use serde_json::{Map, Value};

/// Nested attribute-driven description of CSS rules. Key order is output order.
pub type StyleTree = Map<String, Value>;

pub const MEDIA_PREFIX: &str = "media_";
pub const SUPPORTS_PREFIX: &str = "@supports";

#[derive(Debug, Clone, PartialEq)]
pub enum StyleNode {
    Media(MediaNode),
    Supports(SupportsNode),
    Selector(SelectorNode),
    Leaf(LeafNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaNode {
    /// Full key, e.g. `media_sm`.
    pub key: String,
    pub children: Vec<StyleNode>,
}

impl MediaNode {
    /// Breakpoint name without the `media_` prefix.
    pub fn breakpoint(&self) -> &str {
        &self.key[MEDIA_PREFIX.len()..]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupportsNode {
    /// Full `@supports (...)` prelude.
    pub condition: String,
    pub children: Vec<StyleNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorNode {
    pub key: String,
    pub children: Vec<StyleNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub property: String,
    pub value: Value,
}

pub fn is_media_key(key: &str) -> bool {
    key.starts_with(MEDIA_PREFIX)
}

pub fn is_supports_key(key: &str) -> bool {
    key.starts_with(SUPPORTS_PREFIX)
}

pub fn classify(tree: &StyleTree) -> Vec<StyleNode> {
    tree.iter()
        .filter_map(|(key, value)| classify_entry(key, value))
        .collect()
}

fn classify_entry(key: &str, value: &Value) -> Option<StyleNode> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Object(_) | Value::Array(_) => {
            let children = classify_scope(value);
            let node = if is_media_key(key) {
                StyleNode::Media(MediaNode {
                    key: key.to_string(),
                    children,
                })
            } else if is_supports_key(key) {
                StyleNode::Supports(SupportsNode {
                    condition: key.to_string(),
                    children,
                })
            } else {
                StyleNode::Selector(SelectorNode {
                    key: key.to_string(),
                    children,
                })
            };
            Some(node)
        }
        _ => Some(StyleNode::Leaf(LeafNode {
            property: key.to_string(),
            value: value.clone(),
        })),
    }
}

fn classify_scope(value: &Value) -> Vec<StyleNode> {
    match value {
        Value::Object(map) => classify(map),
        // Arrays behave like objects keyed by index
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| classify_entry(&i.to_string(), item))
            .collect(),
        _ => Vec::new(),
    }
}
