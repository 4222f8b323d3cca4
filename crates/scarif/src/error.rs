//! Structure codec errors.

use std::io;

use scarif_nbt::NbtError;
use thiserror::Error;

use crate::position::{BlockPosition, ChunkPosition};

#[derive(Debug, Error)]
pub enum ScarifError {
    #[error("input is not a SCARIF structure")]
    BadMagic,

    #[error("unknown block id {id} in chunk {chunk}")]
    UnknownBlockId { id: i16, chunk: ChunkPosition },

    #[error("invalid tile data length: {len}")]
    InvalidBlobLength { len: i64 },

    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("unexpected end of data: need {needed} bytes, have {remaining}")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid UTF-8 in block name")]
    InvalidUtf8,

    #[error("block name for id {id} contains a NUL byte")]
    InvalidName { id: i16 },

    #[error("block {pos} cannot be stored in chunk {chunk}")]
    OutOfRange {
        pos: BlockPosition,
        chunk: ChunkPosition,
    },

    #[error("chunk {chunk} is outside the addressable world")]
    ChunkOutOfRange { chunk: ChunkPosition },

    #[error("duplicate block id {id} in translation table")]
    DuplicateId { id: i16 },

    #[error("malformed block mapping: {0}")]
    Mapping(String),

    #[error("unknown compression algorithm: {0}")]
    UnknownCompression(String),

    #[error("NBT error: {0}")]
    Nbt(#[from] NbtError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ScarifError {
    /// Whether this error means the data itself is malformed, as opposed to
    /// an I/O failure or a truncated stream.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ScarifError::BadMagic
                | ScarifError::UnknownBlockId { .. }
                | ScarifError::InvalidBlobLength { .. }
                | ScarifError::NegativeCount { .. }
                | ScarifError::InvalidUtf8
                | ScarifError::ChunkOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScarifError>;
