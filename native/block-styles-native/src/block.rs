use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::BlockIdentity;
use crate::tree::StyleTree;

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTED ATTRIBUTE NAMES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ATTR_ID: &str = "id";
pub const ATTR_CLASS_NAME: &str = "className";
pub const ATTR_STYLES: &str = "styles";

/// Name of the block type that references a reusable block by `ref` attribute.
pub const REUSABLE_BLOCK_NAME: &str = "core/block";
pub const ATTR_REUSABLE_REF: &str = "ref";

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK INSTANCE
// ═══════════════════════════════════════════════════════════════════════════════

/// One placed unit of content in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Editor-session identifier, stable for the lifetime of the instance.
    #[serde(default)]
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub inner_blocks: Vec<Block>,
}

impl Block {
    pub fn new(client_id: &str, name: &str) -> Self {
        Block {
            client_id: client_id.to_string(),
            name: name.to_string(),
            attributes: Map::new(),
            inner_blocks: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn with_inner_blocks(mut self, inner_blocks: Vec<Block>) -> Self {
        self.inner_blocks = inner_blocks;
        self
    }

    pub fn style_attributes(&self) -> StyleAttributes {
        StyleAttributes::read(&self.attributes)
    }

    /// Reference of a `core/block` instance, if this is one.
    pub fn reusable_ref(&self) -> Option<u64> {
        if self.name != REUSABLE_BLOCK_NAME {
            return None;
        }
        self.attributes.get(ATTR_REUSABLE_REF).and_then(Value::as_u64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLE ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

/// The style state the binder persists into a block's attribute bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StyleAttributes {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub styles: StyleTree,
}

impl StyleAttributes {
    /// Read leniently: missing or wrongly-typed fields count as empty. Older content
    /// stores cleared styles as `""` rather than `{}`.
    pub fn read(attributes: &Map<String, Value>) -> Self {
        let text = |name: &str| {
            attributes
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let styles = match attributes.get(ATTR_STYLES) {
            Some(Value::Object(tree)) => tree.clone(),
            _ => StyleTree::new(),
        };
        StyleAttributes {
            id: text(ATTR_ID),
            class_name: text(ATTR_CLASS_NAME),
            styles,
        }
    }

    pub fn write(&self, attributes: &mut Map<String, Value>) {
        attributes.insert(ATTR_ID.to_string(), Value::String(self.id.clone()));
        attributes.insert(
            ATTR_CLASS_NAME.to_string(),
            Value::String(self.class_name.clone()),
        );
        attributes.insert(ATTR_STYLES.to_string(), Value::Object(self.styles.clone()));
    }

    pub fn has_style_state(&self) -> bool {
        !self.id.is_empty() || !self.class_name.is_empty() || !self.styles.is_empty()
    }

    pub fn identity(&self) -> BlockIdentity {
        BlockIdentity {
            id: self.id.clone(),
            class_name: self.class_name.clone(),
        }
    }
}
