//! Block id -> name translation table.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use scarif_nbt::{NbtRoot, NbtTag};
use tracing::{debug, warn};

use crate::error::{Result, ScarifError};

/// Leading bytes of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Maps the numeric block ids used in a structure to portable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: BTreeMap<i16, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. Fails if `id` is already mapped.
    pub fn add(&mut self, id: i16, name: impl Into<String>) -> Result<()> {
        if self.entries.contains_key(&id) {
            return Err(ScarifError::DuplicateId { id });
        }
        self.entries.insert(id, name.into());
        Ok(())
    }

    /// Add a mapping unless `id` is already mapped. Returns whether it was added.
    pub fn insert_first(&mut self, id: i16, name: impl Into<String>) -> bool {
        match self.entries.entry(id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(name.into());
                true
            }
        }
    }

    pub fn get(&self, id: i16) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: i16) -> bool {
        self.entries.contains_key(&id)
    }

    /// Drop every entry whose id is not in `referenced`. Returns how many were removed.
    pub fn prune(&mut self, referenced: &BTreeSet<i16>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| referenced.contains(id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Build a table from a mapping tree: a `map` list of `{k: String, v: Int}` compounds.
    ///
    /// A repeated id keeps the first name seen.
    pub fn from_nbt(root: &NbtRoot) -> Result<Self> {
        let list = root
            .get("map")
            .and_then(NbtTag::as_list)
            .ok_or_else(|| ScarifError::Mapping("missing `map` list".into()))?;

        let mut table = Self::new();
        for (index, tag) in list.iter().enumerate() {
            let entry = tag
                .as_compound()
                .ok_or_else(|| ScarifError::Mapping(format!("entry {index} is not a compound")))?;
            let name = entry
                .get("k")
                .and_then(NbtTag::as_string)
                .ok_or_else(|| ScarifError::Mapping(format!("entry {index} has no string `k`")))?;
            let id = entry
                .get("v")
                .and_then(NbtTag::as_int)
                .ok_or_else(|| ScarifError::Mapping(format!("entry {index} has no int `v`")))?;

            // Ids are stored as ints but only the low 16 bits are meaningful.
            let id = id as i16;
            if !table.insert_first(id, name) {
                warn!(id, name, "duplicate id in block mapping, keeping first");
            }
        }
        Ok(table)
    }

    /// Load a mapping file (gzip-compressed or raw Java NBT).
    pub fn load_nbt(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        let data = if raw.starts_with(&GZIP_MAGIC) {
            let mut out = Vec::new();
            GzDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
            out
        } else {
            raw
        };

        let root = scarif_nbt::read_nbt_be(&mut data.as_slice())?;
        let table = Self::from_nbt(&root)?;
        debug!(path = %path.display(), entries = table.len(), "loaded block mapping");
        Ok(table)
    }
}

impl From<BTreeMap<i16, String>> for TranslationTable {
    fn from(entries: BTreeMap<i16, String>) -> Self {
        Self { entries }
    }
}

impl<S: Into<String>> FromIterator<(i16, S)> for TranslationTable {
    /// Collect pairs, keeping the first name for a repeated id.
    fn from_iter<I: IntoIterator<Item = (i16, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (id, name) in iter {
            table.insert_first(id, name);
        }
        table
    }
}
