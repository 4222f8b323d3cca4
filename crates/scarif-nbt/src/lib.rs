//! NBT (Named Binary Tag) codec for tile-entity data and mapping files.
//!
//! Supports two byte orders:
//! - **Java (BE)**: Used by Java edition tooling. All numbers big-endian, string lengths u16_be.
//! - **Bedrock (LE)**: Used by Bedrock disk storage. All numbers little-endian, string lengths u16_le.

pub mod error;
mod io;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag, TagType};

use bytes::{Buf, BufMut};

/// Read Java (big-endian) NBT from a buffer.
pub fn read_nbt_be(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_root::<io::Java>(buf)
}

/// Write Java (big-endian) NBT to a buffer.
pub fn write_nbt_be(buf: &mut impl BufMut, root: &NbtRoot) {
    io::write_root::<io::Java>(buf, root)
}

/// Read Bedrock (little-endian) NBT from a buffer.
pub fn read_nbt_le(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_root::<io::Bedrock>(buf)
}

/// Write Bedrock (little-endian) NBT to a buffer.
pub fn write_nbt_le(buf: &mut impl BufMut, root: &NbtRoot) {
    io::write_root::<io::Bedrock>(buf, root)
}

/// Read exactly one big-endian root from `data`, rejecting leftover bytes.
pub fn from_slice_be(mut data: &[u8]) -> Result<NbtRoot, NbtError> {
    let root = read_nbt_be(&mut data)?;
    ensure_consumed(data)?;
    Ok(root)
}

/// Read exactly one little-endian root from `data`, rejecting leftover bytes.
pub fn from_slice_le(mut data: &[u8]) -> Result<NbtRoot, NbtError> {
    let root = read_nbt_le(&mut data)?;
    ensure_consumed(data)?;
    Ok(root)
}

fn ensure_consumed(rest: &[u8]) -> Result<(), NbtError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(NbtError::TrailingBytes(rest.len()))
    }
}
