//! Identity Allocator
//!
//! Gives every styled block a short token and a class name derived from it. The
//! class name is the selector of the block's compiled CSS, so it has to be unique
//! across the whole document tree, inner blocks included.
//!
//! ## Key Invariants
//!
//! 1. **Stable Identity**: an id that is set and unique is never re-issued.
//! 2. **Duplicate Detection**: with `force_recheck` (mount, duplicate, paste) an id
//!    also held by another instance is discarded and redrawn.
//! 3. **First Holder Keeps**: across a whole document, the first block in document
//!    order holding an id keeps it; later holders (pasted or duplicated copies) are
//!    redrawn.
//! 4. **Best-Effort Uniqueness**: draws are retried up to the retry budget. When the
//!    budget runs out the last candidate is used even if it collides. This is a known
//!    limitation, reported through `log::warn!` only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use crate::block::{Block, ATTR_CLASS_NAME, ATTR_ID};
use crate::options::{StyleOptions, DEFAULT_ID_LENGTH, DEFAULT_ID_RETRY_BUDGET};
use crate::visitor::{find_block_mut, flatten};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockIdentity {
    pub id: String,
    pub class_name: String,
}

impl BlockIdentity {
    pub fn for_block(block_name: &str, id: &str) -> Self {
        BlockIdentity {
            id: id.to_string(),
            class_name: class_name_for(block_name, id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn write(&self, attributes: &mut Map<String, Value>) {
        attributes.insert(ATTR_ID.to_string(), Value::String(self.id.clone()));
        attributes.insert(
            ATTR_CLASS_NAME.to_string(),
            Value::String(self.class_name.clone()),
        );
    }
}

/// `ghostkit/grid-column` + `a1b2c3` -> `ghostkit-grid-column-a1b2c3`.
/// Only the namespace separator is replaced.
pub fn class_name_for(block_name: &str, id: &str) -> String {
    format!("{}-{}", block_name.replacen('/', "-", 1), id)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ID GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

pub trait IdGenerator: Sync {
    /// Deterministic candidate for `client_id`; `attempt` perturbs later draws.
    fn generate(&self, client_id: &str, attempt: u32) -> String;
}

/// SHA-256 of the client id, base-36 encoded and truncated.
#[derive(Debug, Clone, Copy)]
pub struct ShortHash {
    length: usize,
}

impl Default for ShortHash {
    fn default() -> Self {
        ShortHash {
            length: DEFAULT_ID_LENGTH,
        }
    }
}

impl ShortHash {
    pub fn new(length: usize) -> Self {
        ShortHash { length }
    }
}

impl IdGenerator for ShortHash {
    fn generate(&self, client_id: &str, attempt: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(client_id.as_bytes());
        if attempt > 0 {
            hasher.update(format!(":{}", attempt).as_bytes());
        }
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let mut n = u64::from_be_bytes(head);

        let mut token = Vec::with_capacity(13);
        while n > 0 {
            token.push(BASE36[(n % 36) as usize]);
            n /= 36;
        }
        while token.len() < self.length {
            token.push(b'0');
        }
        token.truncate(self.length);
        token.into_iter().map(char::from).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ID INDEX
// ═══════════════════════════════════════════════════════════════════════════════

/// Document-wide id -> owning client ids. Rebuilt on every allocation.
struct IdIndex<'a> {
    owners: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> IdIndex<'a> {
    fn build(document: &'a [Block]) -> Self {
        let mut owners: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        for block in flatten(document) {
            let Some(id) = block.attributes.get(ATTR_ID).and_then(Value::as_str) else {
                continue;
            };
            if id.is_empty() || block.client_id.is_empty() {
                continue;
            }
            owners.entry(id).or_default().push(block.client_id.as_str());
        }
        IdIndex { owners }
    }

    fn is_taken_by_other(&self, id: &str, client_id: &str) -> bool {
        self.owners
            .get(id)
            .map(|owners| owners.iter().any(|owner| *owner != client_id))
            .unwrap_or(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ALLOCATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Allocator {
    generator: Box<dyn IdGenerator>,
    retry_budget: u32,
}

impl Default for Allocator {
    fn default() -> Self {
        Allocator {
            generator: Box::new(ShortHash::default()),
            retry_budget: DEFAULT_ID_RETRY_BUDGET,
        }
    }
}

impl Allocator {
    pub fn new(generator: Box<dyn IdGenerator>, retry_budget: u32) -> Self {
        Allocator {
            generator,
            retry_budget,
        }
    }

    pub fn from_options(options: &StyleOptions) -> Self {
        Self::new(
            Box::new(ShortHash::new(options.id_length)),
            options.id_retry_budget,
        )
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Identity for `block` within `document`.
    ///
    /// Returns an empty identity for blocks without a client id that do not already
    /// carry an id.
    pub fn allocate(&self, block: &Block, document: &[Block], force_recheck: bool) -> BlockIdentity {
        let current = block.style_attributes();
        let mut id = current.id;
        let mut class_name = current.class_name;

        if !id.is_empty() && !force_recheck {
            if class_name.is_empty() {
                class_name = class_name_for(&block.name, &id);
            }
            return BlockIdentity { id, class_name };
        }

        let index = IdIndex::build(document);

        if !id.is_empty() && index.is_taken_by_other(&id, &block.client_id) {
            log::debug!(
                "block {} shares id '{}' with another instance, redrawing",
                block.client_id,
                id
            );
            id.clear();
        }

        if id.is_empty() {
            if block.client_id.is_empty() {
                return BlockIdentity::default();
            }
            id = self.draw(&block.client_id, &index);
            class_name = class_name_for(&block.name, &id);
        } else if class_name.is_empty() {
            class_name = class_name_for(&block.name, &id);
        }

        BlockIdentity { id, class_name }
    }

    fn draw(&self, client_id: &str, index: &IdIndex<'_>) -> String {
        let mut candidate = String::new();
        for attempt in 0..self.retry_budget {
            candidate = self.generator.generate(client_id, attempt);
            if !candidate.is_empty() && !index.is_taken_by_other(&candidate, client_id) {
                return candidate;
            }
        }
        log::warn!(
            "id retry budget ({}) exhausted for block {}, keeping colliding id '{}'",
            self.retry_budget,
            client_id,
            candidate
        );
        candidate
    }

    /// Re-validate every block that already holds an id, in document order, writing
    /// new identities back. Used after whole subtrees were pasted or duplicated.
    ///
    /// With `force_recheck`, an id shared by several blocks stays with the first
    /// holder in document order and only the later holders are redrawn.
    /// Returns the number of blocks whose identity changed.
    pub fn allocate_document(&self, document: &mut [Block], force_recheck: bool) -> usize {
        let client_ids: Vec<String> = flatten(document)
            .into_iter()
            .filter(|block| !block.client_id.is_empty())
            .filter(|block| !block.style_attributes().id.is_empty())
            .map(|block| block.client_id.clone())
            .collect();

        let mut claimed: HashSet<String> = HashSet::new();
        let mut changed = 0;
        for client_id in client_ids {
            let update = {
                let doc: &[Block] = document;
                let Some(block) = flatten(doc).into_iter().find(|b| b.client_id == client_id)
                else {
                    continue;
                };
                let current = block.style_attributes();

                let identity = if !force_recheck || !claimed.contains(&current.id) {
                    self.allocate(block, doc, false)
                } else {
                    log::debug!(
                        "block {} repeats id '{}' of an earlier block, redrawing",
                        block.client_id,
                        current.id
                    );
                    let index = IdIndex::build(doc);
                    let id = self.draw(&block.client_id, &index);
                    BlockIdentity::for_block(&block.name, &id)
                };
                claimed.insert(identity.id.clone());

                if identity != current.identity() {
                    Some(identity)
                } else {
                    None
                }
            };

            if let Some(identity) = update {
                if let Some(target) = find_block_mut(document, &client_id) {
                    identity.write(&mut target.attributes);
                    changed += 1;
                }
            }
        }
        changed
    }
}
