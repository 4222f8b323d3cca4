//! World and chunk coordinates.

use std::fmt;

use serde::Serialize;

/// Width of a chunk column along x and z.
pub const CHUNK_WIDTH: i32 = 16;

/// Absolute block coordinate in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk column containing this block.
    pub fn chunk(&self) -> ChunkPosition {
        ChunkPosition::new(
            self.x.div_euclid(CHUNK_WIDTH),
            self.z.div_euclid(CHUNK_WIDTH),
        )
    }

    /// Offset of this block inside its chunk column, each in `[0, 15]`.
    pub fn local_xz(&self) -> (u8, u8) {
        (
            self.x.rem_euclid(CHUNK_WIDTH) as u8,
            self.z.rem_euclid(CHUNK_WIDTH) as u8,
        )
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Chunk column coordinate (block coordinate divided by 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World position of the block at local `(lx, y, lz)` inside this chunk.
    ///
    /// Returns `None` when the chunk lies so far out that block coordinates overflow `i32`.
    pub fn block_at(&self, lx: u8, y: i32, lz: u8) -> Option<BlockPosition> {
        let x = self.x.checked_mul(CHUNK_WIDTH)?.checked_add(lx as i32)?;
        let z = self.z.checked_mul(CHUNK_WIDTH)?.checked_add(lz as i32)?;
        Some(BlockPosition::new(x, y, z))
    }

    /// Smallest block x covered by this chunk. Saturates at the edges of `i32`.
    pub fn min_block_x(&self) -> i32 {
        self.x.saturating_mul(CHUNK_WIDTH)
    }

    /// Smallest block z covered by this chunk. Saturates at the edges of `i32`.
    pub fn min_block_z(&self) -> i32 {
        self.z.saturating_mul(CHUNK_WIDTH)
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.z)
    }
}
