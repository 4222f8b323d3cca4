//! SCARIF structure files: compact, compressed sets of block edits.
//!
//! A [`ScarifStructure`] holds edits grouped by chunk column and a
//! [`TranslationTable`] naming the block ids they use. Saving trims the table
//! to referenced ids and writes everything through a stream compressor;
//! loading reads it back and rejects edits whose id the file never named.

pub mod block;
pub mod bounds;
mod codec;
pub mod compression;
pub mod diff;
pub mod error;
pub mod position;
pub mod structure;
pub mod translation;

pub use block::{BlockFlags, ScarifBlock, TileData, TileDataCodec, TileFormat};
pub use bounds::ChunkBounds;
pub use compression::{CodecOptions, CompressionAlgorithm};
pub use diff::{BlockDiffEntry, DiffMap};
pub use error::{Result, ScarifError};
pub use position::{BlockPosition, ChunkPosition};
pub use structure::{ScarifStructure, FORMAT_VERSION, MAGIC};
pub use translation::TranslationTable;
