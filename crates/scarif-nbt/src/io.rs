//! Tag tree reader and writer, shared by both byte orders.

use bytes::{Buf, BufMut};

use crate::error::NbtError;
use crate::tag::{NbtCompound, NbtRoot, NbtTag, TagType};

/// Deepest list/compound nesting accepted on read.
pub(crate) const MAX_DEPTH: usize = 512;

/// Byte order of every multi-byte number, string lengths included.
pub(crate) trait ByteOrder {
    const LITTLE: bool;

    fn get_u16(buf: &mut impl Buf) -> u16 {
        if Self::LITTLE { buf.get_u16_le() } else { buf.get_u16() }
    }
    fn get_i16(buf: &mut impl Buf) -> i16 {
        if Self::LITTLE { buf.get_i16_le() } else { buf.get_i16() }
    }
    fn get_i32(buf: &mut impl Buf) -> i32 {
        if Self::LITTLE { buf.get_i32_le() } else { buf.get_i32() }
    }
    fn get_i64(buf: &mut impl Buf) -> i64 {
        if Self::LITTLE { buf.get_i64_le() } else { buf.get_i64() }
    }
    fn get_f32(buf: &mut impl Buf) -> f32 {
        if Self::LITTLE { buf.get_f32_le() } else { buf.get_f32() }
    }
    fn get_f64(buf: &mut impl Buf) -> f64 {
        if Self::LITTLE { buf.get_f64_le() } else { buf.get_f64() }
    }

    fn put_u16(buf: &mut impl BufMut, v: u16) {
        if Self::LITTLE { buf.put_u16_le(v) } else { buf.put_u16(v) }
    }
    fn put_i16(buf: &mut impl BufMut, v: i16) {
        if Self::LITTLE { buf.put_i16_le(v) } else { buf.put_i16(v) }
    }
    fn put_i32(buf: &mut impl BufMut, v: i32) {
        if Self::LITTLE { buf.put_i32_le(v) } else { buf.put_i32(v) }
    }
    fn put_i64(buf: &mut impl BufMut, v: i64) {
        if Self::LITTLE { buf.put_i64_le(v) } else { buf.put_i64(v) }
    }
    fn put_f32(buf: &mut impl BufMut, v: f32) {
        if Self::LITTLE { buf.put_f32_le(v) } else { buf.put_f32(v) }
    }
    fn put_f64(buf: &mut impl BufMut, v: f64) {
        if Self::LITTLE { buf.put_f64_le(v) } else { buf.put_f64(v) }
    }
}

/// Java edition files: big-endian.
pub(crate) struct Java;

impl ByteOrder for Java {
    const LITTLE: bool = false;
}

/// Bedrock disk storage: little-endian.
pub(crate) struct Bedrock;

impl ByteOrder for Bedrock {
    const LITTLE: bool = true;
}

// -----------------------------------------------------------------------
// Reading
// -----------------------------------------------------------------------

struct Reader<'a, B, O> {
    buf: &'a mut B,
    depth: usize,
    _order: std::marker::PhantomData<O>,
}

pub(crate) fn read_root<O: ByteOrder>(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    let mut reader = Reader::<_, O> {
        buf,
        depth: 0,
        _order: std::marker::PhantomData,
    };
    let id = reader.u8()?;
    if id != TagType::Compound as u8 {
        return Err(NbtError::RootNotCompound(id));
    }
    let name = reader.string()?;
    let compound = reader.compound()?;
    Ok(NbtRoot { name, compound })
}

impl<B: Buf, O: ByteOrder> Reader<'_, B, O> {
    fn need(&self, needed: usize) -> Result<(), NbtError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(NbtError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, NbtError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn length(&mut self) -> Result<usize, NbtError> {
        self.need(4)?;
        let len = O::get_i32(self.buf);
        usize::try_from(len).map_err(|_| NbtError::NegativeLength(len))
    }

    fn string(&mut self) -> Result<String, NbtError> {
        self.need(2)?;
        let len = O::get_u16(self.buf) as usize;
        self.need(len)?;
        let bytes = self.buf.copy_to_bytes(len);
        String::from_utf8(bytes.to_vec()).map_err(|_| NbtError::InvalidUtf8)
    }

    /// Read `len` fixed-width elements after checking they are all present.
    fn array<T>(
        &mut self,
        width: usize,
        read: impl Fn(&mut B) -> T,
    ) -> Result<Vec<T>, NbtError> {
        let len = self.length()?;
        self.need(len.saturating_mul(width))?;
        Ok((0..len).map(|_| read(self.buf)).collect())
    }

    fn enter(&mut self) -> Result<(), NbtError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(NbtError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn compound(&mut self) -> Result<NbtCompound, NbtError> {
        self.enter()?;
        let mut map = NbtCompound::new();
        loop {
            let ty = TagType::try_from(self.u8()?)?;
            if ty == TagType::End {
                break;
            }
            let name = self.string()?;
            let tag = self.payload(ty)?;
            map.insert(name, tag);
        }
        self.depth -= 1;
        Ok(map)
    }

    fn list(&mut self) -> Result<Vec<NbtTag>, NbtError> {
        let element = TagType::try_from(self.u8()?)?;
        let len = self.length()?;
        if element == TagType::End && len > 0 {
            return Err(NbtError::UnknownTagType(TagType::End as u8));
        }
        self.enter()?;
        // Every element takes at least one byte, so cap the reservation.
        let mut items = Vec::with_capacity(len.min(self.buf.remaining()));
        for _ in 0..len {
            items.push(self.payload(element)?);
        }
        self.depth -= 1;
        Ok(items)
    }

    fn payload(&mut self, ty: TagType) -> Result<NbtTag, NbtError> {
        let tag = match ty {
            TagType::End => return Err(NbtError::UnknownTagType(0)),
            TagType::Byte => {
                self.need(1)?;
                NbtTag::Byte(self.buf.get_i8())
            }
            TagType::Short => {
                self.need(2)?;
                NbtTag::Short(O::get_i16(self.buf))
            }
            TagType::Int => {
                self.need(4)?;
                NbtTag::Int(O::get_i32(self.buf))
            }
            TagType::Long => {
                self.need(8)?;
                NbtTag::Long(O::get_i64(self.buf))
            }
            TagType::Float => {
                self.need(4)?;
                NbtTag::Float(O::get_f32(self.buf))
            }
            TagType::Double => {
                self.need(8)?;
                NbtTag::Double(O::get_f64(self.buf))
            }
            TagType::String => NbtTag::String(self.string()?),
            TagType::ByteArray => NbtTag::ByteArray(self.array(1, |b| b.get_i8())?),
            TagType::IntArray => NbtTag::IntArray(self.array(4, |b| O::get_i32(b))?),
            TagType::LongArray => NbtTag::LongArray(self.array(8, |b| O::get_i64(b))?),
            TagType::List => NbtTag::List(self.list()?),
            TagType::Compound => NbtTag::Compound(self.compound()?),
        };
        Ok(tag)
    }
}

// -----------------------------------------------------------------------
// Writing
// -----------------------------------------------------------------------

pub(crate) fn write_root<O: ByteOrder>(buf: &mut impl BufMut, root: &NbtRoot) {
    buf.put_u8(TagType::Compound as u8);
    write_string::<O>(buf, &root.name);
    write_compound::<O>(buf, &root.compound);
}

fn write_compound<O: ByteOrder>(buf: &mut impl BufMut, compound: &NbtCompound) {
    for (name, tag) in compound {
        buf.put_u8(tag.tag_type() as u8);
        write_string::<O>(buf, name);
        write_payload::<O>(buf, tag);
    }
    buf.put_u8(TagType::End as u8);
}

fn write_payload<O: ByteOrder>(buf: &mut impl BufMut, tag: &NbtTag) {
    match tag {
        NbtTag::Byte(v) => buf.put_i8(*v),
        NbtTag::Short(v) => O::put_i16(buf, *v),
        NbtTag::Int(v) => O::put_i32(buf, *v),
        NbtTag::Long(v) => O::put_i64(buf, *v),
        NbtTag::Float(v) => O::put_f32(buf, *v),
        NbtTag::Double(v) => O::put_f64(buf, *v),
        NbtTag::String(s) => write_string::<O>(buf, s),
        NbtTag::ByteArray(values) => {
            O::put_i32(buf, values.len() as i32);
            values.iter().for_each(|&v| buf.put_i8(v));
        }
        NbtTag::IntArray(values) => {
            O::put_i32(buf, values.len() as i32);
            values.iter().for_each(|&v| O::put_i32(buf, v));
        }
        NbtTag::LongArray(values) => {
            O::put_i32(buf, values.len() as i32);
            values.iter().for_each(|&v| O::put_i64(buf, v));
        }
        NbtTag::List(items) => {
            let element = items.first().map_or(TagType::End, NbtTag::tag_type);
            debug_assert!(
                items.iter().all(|item| item.tag_type() == element),
                "mixed element types in NBT list"
            );
            buf.put_u8(element as u8);
            O::put_i32(buf, items.len() as i32);
            items.iter().for_each(|item| write_payload::<O>(buf, item));
        }
        NbtTag::Compound(compound) => write_compound::<O>(buf, compound),
    }
}

/// Strings longer than `u16::MAX` bytes are cut at the last char boundary that fits.
fn write_string<O: ByteOrder>(buf: &mut impl BufMut, s: &str) {
    let mut end = s.len().min(u16::MAX as usize);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    O::put_u16(buf, end as u16);
    buf.put_slice(&s.as_bytes()[..end]);
}
