//! Axis-aligned block bounds used to pick which edits to keep.

use crate::position::{BlockPosition, ChunkPosition, CHUNK_WIDTH};

/// Inclusive block bounds, or no bounds at all.
///
/// An unbounded filter contains everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkBounds {
    range: Option<(BlockPosition, BlockPosition)>,
}

impl ChunkBounds {
    /// Bounds that exclude nothing.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(min: BlockPosition, max: BlockPosition) -> Self {
        Self {
            range: Some((min, max)),
        }
    }

    /// Parse `minX:minY:minZ:maxX:maxY:maxZ`.
    ///
    /// Anything that does not parse yields unbounded bounds.
    pub fn parse(text: Option<&str>) -> Self {
        text.and_then(parse_range)
            .map(|(min, max)| Self::new(min, max))
            .unwrap_or_default()
    }

    /// Whether real bounds were given.
    pub fn exists(&self) -> bool {
        self.range.is_some()
    }

    pub fn contains(&self, pos: BlockPosition) -> bool {
        let Some((min, max)) = self.range else {
            return true;
        };
        pos.x >= min.x
            && pos.x <= max.x
            && pos.y >= min.y
            && pos.y <= max.y
            && pos.z >= min.z
            && pos.z <= max.z
    }

    /// Cheap chunk-level test: could any block of `chunk` fall inside?
    pub fn coarse_contains(&self, chunk: ChunkPosition) -> bool {
        let Some((min, max)) = self.range else {
            return true;
        };
        let x0 = chunk.min_block_x() as i64;
        let z0 = chunk.min_block_z() as i64;
        let width = CHUNK_WIDTH as i64;
        x0 + width >= min.x as i64
            && x0 <= max.x as i64
            && z0 + width >= min.z as i64
            && z0 <= max.z as i64
    }
}

fn parse_range(text: &str) -> Option<(BlockPosition, BlockPosition)> {
    let parts: Vec<i32> = text
        .split(':')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [min_x, min_y, min_z, max_x, max_y, max_z] => Some((
            BlockPosition::new(min_x, min_y, min_z),
            BlockPosition::new(max_x, max_y, max_z),
        )),
        _ => None,
    }
}
