//! Block records: id, metadata nibble, and optional tile-entity data.

use bytes::{BufMut, Bytes, BytesMut};
use scarif_nbt::{NbtError, NbtRoot};
use serde::{Deserialize, Serialize};

/// Presence flags stored alongside each block on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockFlags(u8);

impl BlockFlags {
    pub const NONE: BlockFlags = BlockFlags(0);
    /// A metadata byte follows.
    pub const METADATA: BlockFlags = BlockFlags(0b01);
    /// A length-prefixed tile data blob follows.
    pub const NBT: BlockFlags = BlockFlags(0b10);

    /// Keep only the bits this format understands.
    pub fn from_bits(bits: u8) -> Self {
        BlockFlags(bits & (Self::METADATA.0 | Self::NBT.0))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: BlockFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for BlockFlags {
    type Output = BlockFlags;

    fn bitor(self, rhs: BlockFlags) -> BlockFlags {
        BlockFlags(self.0 | rhs.0)
    }
}

/// Serializer for the tree-structured data attached to tile entities.
///
/// The structure codec never looks inside the bytes; this is only used to
/// build a [`TileData`] from a tree and to read one back.
pub trait TileDataCodec {
    fn serialize(&self, root: &NbtRoot) -> Vec<u8>;
    fn deserialize(&self, data: &[u8]) -> Result<NbtRoot, NbtError>;
}

/// Which NBT byte order tile data is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    #[default]
    Java,
    Bedrock,
}

impl TileDataCodec for TileFormat {
    fn serialize(&self, root: &NbtRoot) -> Vec<u8> {
        let mut buf = BytesMut::new();
        match self {
            TileFormat::Java => scarif_nbt::write_nbt_be(&mut buf, root),
            TileFormat::Bedrock => scarif_nbt::write_nbt_le(&mut buf, root),
        }
        buf.to_vec()
    }

    fn deserialize(&self, data: &[u8]) -> Result<NbtRoot, NbtError> {
        match self {
            TileFormat::Java => scarif_nbt::from_slice_be(data),
            TileFormat::Bedrock => scarif_nbt::from_slice_le(data),
        }
    }
}

/// Opaque serialized tile-entity data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileData(Bytes);

impl TileData {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        TileData(data.into())
    }

    /// Serialize `root` with `codec` into a new blob.
    pub fn encode(root: &NbtRoot, codec: &impl TileDataCodec) -> Self {
        TileData(Bytes::from(codec.serialize(root)))
    }

    /// Parse the blob back into a tree with `codec`.
    pub fn decode(&self, codec: &impl TileDataCodec) -> Result<NbtRoot, NbtError> {
        codec.deserialize(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn write_to(&self, buf: &mut impl BufMut) {
        buf.put_i32_le(self.0.len() as i32);
        buf.put_slice(&self.0);
    }
}

/// A single block's identity as recorded in a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScarifBlock {
    id: i16,
    metadata: u8,
    tile_data: Option<TileData>,
}

impl ScarifBlock {
    pub fn new(id: i16, metadata: u8, tile_data: Option<TileData>) -> Self {
        Self {
            id,
            metadata,
            tile_data,
        }
    }

    /// A block with no metadata and no tile data.
    pub fn plain(id: i16) -> Self {
        Self::new(id, 0, None)
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn metadata(&self) -> u8 {
        self.metadata
    }

    pub fn tile_data(&self) -> Option<&TileData> {
        self.tile_data.as_ref()
    }

    /// Flags derived from the record's contents.
    pub fn flags(&self) -> BlockFlags {
        let mut flags = BlockFlags::NONE;
        if self.metadata != 0 {
            flags = flags | BlockFlags::METADATA;
        }
        if self.tile_data.is_some() {
            flags = flags | BlockFlags::NBT;
        }
        flags
    }
}
