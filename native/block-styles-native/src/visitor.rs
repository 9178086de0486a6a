use crate::block::Block;

/// The BlockVisitor trait defines the traversal of a document's block tree.
///
/// Rules:
/// 1. Pre-order: a block is visited before its inner blocks.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call `walk_*` functions to continue traversal unless pruning is intended.
pub trait BlockVisitor<'a> {
    fn visit_blocks(&mut self, blocks: &'a [Block]) {
        walk_blocks(self, blocks);
    }

    fn visit_block(&mut self, block: &'a Block) {
        walk_block(self, block);
    }
}

pub fn walk_blocks<'a, V: BlockVisitor<'a> + ?Sized>(visitor: &mut V, blocks: &'a [Block]) {
    for block in blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<'a, V: BlockVisitor<'a> + ?Sized>(visitor: &mut V, block: &'a Block) {
    visitor.visit_blocks(&block.inner_blocks);
}

struct Flatten<'a> {
    out: Vec<&'a Block>,
}

impl<'a> BlockVisitor<'a> for Flatten<'a> {
    fn visit_block(&mut self, block: &'a Block) {
        self.out.push(block);
        walk_block(self, block);
    }
}

/// Every block of the tree, inner blocks included, in document order.
pub fn flatten(blocks: &[Block]) -> Vec<&Block> {
    let mut flatten = Flatten { out: Vec::new() };
    flatten.visit_blocks(blocks);
    flatten.out
}

pub fn find_block_mut<'b>(blocks: &'b mut [Block], client_id: &str) -> Option<&'b mut Block> {
    for block in blocks.iter_mut() {
        if block.client_id == client_id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.inner_blocks, client_id) {
            return Some(found);
        }
    }
    None
}
