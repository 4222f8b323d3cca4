use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("NBT data ended early: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("root tag must be a compound (10), found type {0}")]
    RootNotCompound(u8),

    #[error("unknown NBT tag type {0}")]
    UnknownTagType(u8),

    #[error("NBT string is not valid UTF-8")]
    InvalidUtf8,

    #[error("NBT nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("negative NBT length {0}")]
    NegativeLength(i32),

    #[error("{0} bytes left over after root compound")]
    TrailingBytes(usize),
}
