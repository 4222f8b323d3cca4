//! NBT tag types.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::NbtError;

/// Named children of a compound, kept sorted so output bytes are stable.
pub type NbtCompound = BTreeMap<String, NbtTag>;

/// Wire id of each tag kind. `End` closes a compound and types an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TryFrom<u8> for TagType {
    type Error = NbtError;

    fn try_from(id: u8) -> Result<Self, NbtError> {
        Ok(match id {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }
}

/// The outermost compound of an NBT document, with its (usually empty) name.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtRoot {
    pub name: String,
    pub compound: NbtCompound,
}

impl NbtRoot {
    pub fn new(name: impl Into<String>, compound: NbtCompound) -> Self {
        Self {
            name: name.into(),
            compound,
        }
    }

    /// Look up a direct child of the root compound.
    pub fn get(&self, key: &str) -> Option<&NbtTag> {
        self.compound.get(key)
    }
}

/// Any NBT payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    /// Every element must have the same tag type; the first one names the list type.
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtTag {
    pub fn tag_type(&self) -> TagType {
        match self {
            NbtTag::Byte(_) => TagType::Byte,
            NbtTag::Short(_) => TagType::Short,
            NbtTag::Int(_) => TagType::Int,
            NbtTag::Long(_) => TagType::Long,
            NbtTag::Float(_) => TagType::Float,
            NbtTag::Double(_) => TagType::Double,
            NbtTag::ByteArray(_) => TagType::ByteArray,
            NbtTag::String(_) => TagType::String,
            NbtTag::List(_) => TagType::List,
            NbtTag::Compound(_) => TagType::Compound,
            NbtTag::IntArray(_) => TagType::IntArray,
            NbtTag::LongArray(_) => TagType::LongArray,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NbtTag]> {
        match self {
            NbtTag::List(v) => Some(v),
            _ => None,
        }
    }
}

/// SNBT-style rendering, used when printing tile data.
impl fmt::Display for NbtTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtTag::Byte(v) => write!(f, "{v}b"),
            NbtTag::Short(v) => write!(f, "{v}s"),
            NbtTag::Int(v) => write!(f, "{v}"),
            NbtTag::Long(v) => write!(f, "{v}L"),
            NbtTag::Float(v) => write!(f, "{v}f"),
            NbtTag::Double(v) => write!(f, "{v}d"),
            NbtTag::String(v) => write!(f, "{v:?}"),
            NbtTag::ByteArray(v) => write_seq(f, "B; ", v.iter().map(|b| format!("{b}b"))),
            NbtTag::IntArray(v) => write_seq(f, "I; ", v.iter().map(i32::to_string)),
            NbtTag::LongArray(v) => write_seq(f, "L; ", v.iter().map(|l| format!("{l}L"))),
            NbtTag::List(v) => write_seq(f, "", v.iter().map(NbtTag::to_string)),
            NbtTag::Compound(v) => write_compound(f, v),
        }
    }
}

impl fmt::Display for NbtRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: ", self.name)?;
        write_compound(f, &self.compound)
    }
}

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    items: impl Iterator<Item = String>,
) -> fmt::Result {
    write!(f, "[{prefix}")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&item)?;
    }
    f.write_str("]")
}

fn write_compound(f: &mut fmt::Formatter<'_>, compound: &NbtCompound) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, tag)) in compound.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {tag}")?;
    }
    f.write_str("}")
}
