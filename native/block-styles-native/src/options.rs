use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::StyleError;

/// Number of draws the identity allocator makes before giving up on uniqueness.
pub const DEFAULT_ID_RETRY_BUDGET: u32 = 10;

/// Length of generated block id tokens.
pub const DEFAULT_ID_LENGTH: usize = 6;

/// Pipeline configuration, deserialized from the host in camelCase.
///
/// Every field has a default so a host may send `{}` or only the fields it cares
/// about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    /// HTML-entity escape `>`/`<` in selectors (persisted form).
    pub escape: bool,
    pub id_retry_budget: u32,
    pub id_length: usize,
    /// Breakpoint widths in pixels, keyed by variable name (`media_sm`, ...).
    pub media_sizes: BTreeMap<String, u32>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions {
            escape: true,
            id_retry_budget: DEFAULT_ID_RETRY_BUDGET,
            id_length: DEFAULT_ID_LENGTH,
            media_sizes: default_media_sizes(),
        }
    }
}

impl StyleOptions {
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let options: StyleOptions =
            serde_json::from_str(json).map_err(|e| StyleError::json("options", e))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.id_retry_budget == 0 {
            return Err(StyleError::InvalidOptions {
                reason: "idRetryBudget must be at least 1".to_string(),
            });
        }
        if self.id_length == 0 || self.id_length > 12 {
            return Err(StyleError::InvalidOptions {
                reason: format!("idLength must be within 1..=12, got {}", self.id_length),
            });
        }
        Ok(())
    }
}

pub fn default_media_sizes() -> BTreeMap<String, u32> {
    let mut sizes = BTreeMap::new();
    sizes.insert("media_sm".to_string(), 576);
    sizes.insert("media_md".to_string(), 768);
    sizes.insert("media_lg".to_string(), 992);
    sizes.insert("media_xl".to_string(), 1200);
    sizes
}
