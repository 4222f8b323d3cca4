//! Per-chunk lists of block edits.

use std::collections::{BTreeMap, BTreeSet};

use crate::block::ScarifBlock;
use crate::position::{BlockPosition, ChunkPosition};

/// One edited block at an absolute position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDiffEntry {
    pub position: BlockPosition,
    pub block: ScarifBlock,
}

impl BlockDiffEntry {
    pub fn new(position: BlockPosition, block: ScarifBlock) -> Self {
        Self { position, block }
    }
}

/// Block edits grouped by chunk column.
///
/// Entries inside a chunk keep their insertion order. Edits to the same
/// position are all kept; later ones do not replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffMap {
    chunks: BTreeMap<ChunkPosition, Vec<BlockDiffEntry>>,
}

impl DiffMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edit to `chunk`, creating the chunk's list on first use.
    pub fn append(&mut self, chunk: ChunkPosition, position: BlockPosition, block: ScarifBlock) {
        self.chunks
            .entry(chunk)
            .or_default()
            .push(BlockDiffEntry::new(position, block));
    }

    /// Make sure `chunk` has a list, even if nothing is ever appended to it.
    pub(crate) fn ensure_chunk(&mut self, chunk: ChunkPosition) {
        self.chunks.entry(chunk).or_default();
    }

    pub fn get(&self, chunk: &ChunkPosition) -> Option<&[BlockDiffEntry]> {
        self.chunks.get(chunk).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkPosition, &[BlockDiffEntry])> {
        self.chunks.iter().map(|(pos, entries)| (pos, entries.as_slice()))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total number of entries across all chunks.
    pub fn entry_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Every block id used by at least one entry.
    pub fn referenced_ids(&self) -> BTreeSet<i16> {
        self.chunks
            .values()
            .flatten()
            .map(|entry| entry.block.id())
            .collect()
    }
}
