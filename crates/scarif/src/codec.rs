//! Little-endian wire primitives for the structure format.

use bytes::{Buf, BufMut};

use crate::error::{Result, ScarifError};

pub(crate) fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        Err(ScarifError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn read_u8(buf: &mut impl Buf) -> Result<u8> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn read_i16(buf: &mut impl Buf) -> Result<i16> {
    ensure_remaining(buf, 2)?;
    Ok(buf.get_i16_le())
}

pub(crate) fn read_i32(buf: &mut impl Buf) -> Result<i32> {
    ensure_remaining(buf, 4)?;
    Ok(buf.get_i32_le())
}

/// Read an i32 element count, rejecting negative values.
pub(crate) fn read_count(buf: &mut impl Buf, what: &'static str) -> Result<usize> {
    let count = read_i32(buf)?;
    if count < 0 {
        return Err(ScarifError::NegativeCount { what, count });
    }
    Ok(count as usize)
}

/// Write UTF-8 bytes followed by a single 0x00.
pub(crate) fn write_cstring(buf: &mut impl BufMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

/// Read bytes up to (and consuming) a 0x00 terminator as UTF-8.
pub(crate) fn read_cstring(buf: &mut impl Buf) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        match read_u8(buf)? {
            0 => break,
            b => bytes.push(b),
        }
    }
    String::from_utf8(bytes).map_err(|_| ScarifError::InvalidUtf8)
}
