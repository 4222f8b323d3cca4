//! SCARIF structure files: header, block name table, and per-chunk edits.
//!
//! Layout after decompression (all integers little-endian):
//!
//! ```text
//! "SCRF" | version:i32 | chunk_count:i32 | name_count:i32
//! name_count  x { id:i16 | name:utf8 | 0x00 }
//! chunk_count x { cx:i32 | cz:i32 | entry_count:i32
//!     entry_count x { xz:u8 | y:u8 | id:i16 | flags:u8
//!                     [metadata:u8] [len:i32 | tile:len bytes] } }
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::block::{BlockFlags, ScarifBlock, TileData};
use crate::bounds::ChunkBounds;
use crate::codec::{
    ensure_remaining, read_count, read_cstring, read_i16, read_i32, read_u8, write_cstring,
};
use crate::compression::{CodecOptions, CompressWriter, DecompressReader};
use crate::diff::DiffMap;
use crate::error::{Result, ScarifError};
use crate::position::{BlockPosition, ChunkPosition};
use crate::translation::TranslationTable;

/// File marker.
pub const MAGIC: &[u8; 4] = b"SCRF";

/// Format version written by this crate.
pub const FORMAT_VERSION: i32 = 1;

/// Highest y a block can be stored at; y is a single unsigned byte on disk.
pub const MAX_Y: i32 = 255;

/// A set of block edits plus the names their ids refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScarifStructure {
    pub version: i32,
    pub translations: TranslationTable,
    pub diffs: DiffMap,
}

impl ScarifStructure {
    /// An empty structure using `translations` for block names.
    pub fn new(translations: TranslationTable) -> Self {
        Self {
            version: FORMAT_VERSION,
            translations,
            diffs: DiffMap::new(),
        }
    }

    /// Record an edit at `pos`, which belongs to `chunk`.
    pub fn add(&mut self, chunk: ChunkPosition, pos: BlockPosition, block: ScarifBlock) {
        self.diffs.append(chunk, pos, block);
    }

    pub fn chunk_count(&self) -> usize {
        self.diffs.chunk_count()
    }

    pub fn block_count(&self) -> usize {
        self.diffs.entry_count()
    }

    /// Remove table entries that no edit refers to. Returns how many were removed.
    pub fn trim_mappings(&mut self) -> usize {
        let referenced = self.diffs.referenced_ids();
        let before = self.translations.len();
        let removed = self.translations.prune(&referenced);
        debug!(before, after = self.translations.len(), "trimmed block mappings");
        removed
    }

    /// A copy holding only the edits inside `bounds`. Chunks left empty are dropped.
    ///
    /// The translation table is copied whole; saving the result trims it.
    pub fn filtered(&self, bounds: &ChunkBounds) -> Self {
        let mut out = Self {
            version: self.version,
            translations: self.translations.clone(),
            diffs: DiffMap::new(),
        };
        for (chunk, entries) in self.diffs.iter() {
            if !bounds.coarse_contains(*chunk) {
                continue;
            }
            for entry in entries.iter().filter(|e| bounds.contains(e.position)) {
                out.add(*chunk, entry.position, entry.block.clone());
            }
        }
        out
    }

    /// Check that every edit can be written: ids are mapped, positions fit
    /// their chunk and the y byte, and tile data has a valid length.
    pub fn validate(&self) -> Result<()> {
        for (id, name) in self.translations.iter() {
            if name.as_bytes().contains(&0) {
                return Err(ScarifError::InvalidName { id });
            }
        }
        for (chunk, entries) in self.diffs.iter() {
            for entry in entries {
                let pos = entry.position;
                if pos.chunk() != *chunk || !(0..=MAX_Y).contains(&pos.y) {
                    return Err(ScarifError::OutOfRange { pos, chunk: *chunk });
                }
                let id = entry.block.id();
                if !self.translations.contains(id) {
                    return Err(ScarifError::UnknownBlockId { id, chunk: *chunk });
                }
                if let Some(tile) = entry.block.tile_data() {
                    if tile.is_empty() || tile.len() > i32::MAX as usize {
                        return Err(ScarifError::InvalidBlobLength {
                            len: tile.len() as i64,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// Validate, then write the uncompressed payload for this structure as it
    /// stands. The table is not trimmed; [`ScarifStructure::write_to`] does that.
    ///
    /// Nothing is written when validation fails.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        self.validate()?;
        self.encode_unchecked(buf);
        Ok(())
    }

    fn encode_unchecked(&self, buf: &mut impl BufMut) {
        buf.put_slice(MAGIC);
        buf.put_i32_le(self.version);
        buf.put_i32_le(self.diffs.chunk_count() as i32);
        buf.put_i32_le(self.translations.len() as i32);

        for (id, name) in self.translations.iter() {
            buf.put_i16_le(id);
            write_cstring(buf, name);
        }

        for (chunk, entries) in self.diffs.iter() {
            buf.put_i32_le(chunk.x);
            buf.put_i32_le(chunk.z);
            buf.put_i32_le(entries.len() as i32);

            for entry in entries {
                let (lx, lz) = entry.position.local_xz();
                buf.put_u8((lx << 4) | lz);
                buf.put_u8(entry.position.y as u8);

                let block = &entry.block;
                let flags = block.flags();
                buf.put_i16_le(block.id());
                buf.put_u8(flags.bits());
                if flags.contains(BlockFlags::METADATA) {
                    buf.put_u8(block.metadata());
                }
                if let Some(tile) = block.tile_data() {
                    tile.write_to(buf);
                }
            }
        }
    }

    /// Validate, trim the translation table, then write the compressed file
    /// to `writer`. Returns the writer once the compressor is finished.
    ///
    /// Trimming happens in place, so the caller's table loses unused ids.
    pub fn write_to<W: Write>(&mut self, writer: W, opts: &CodecOptions) -> Result<W> {
        self.validate()?;
        self.trim_mappings();

        let mut payload = BytesMut::new();
        self.encode_unchecked(&mut payload);

        let mut compressor = CompressWriter::new(writer, opts.compression, opts.level);
        compressor.write_all(&payload)?;
        let writer = compressor.finish()?;

        debug!(
            chunks = self.chunk_count(),
            blocks = self.block_count(),
            names = self.translations.len(),
            payload_bytes = payload.len(),
            compression = %opts.compression,
            "encoded structure"
        );
        Ok(writer)
    }

    /// Save to `path` with default options.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path, &CodecOptions::default())
    }

    /// Save to `path`. The file is written next to the destination under a
    /// temporary name and renamed over it only once complete.
    pub fn save_with(&mut self, path: impl AsRef<Path>, opts: &CodecOptions) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let writer = self.write_to(BufWriter::new(tmp.as_file_mut()), opts)?;
            writer.into_inner().map_err(io::Error::from)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        debug!(path = %path.display(), "saved structure");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Decode an uncompressed payload.
    ///
    /// The marker is checked before anything else is read.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < MAGIC.len() {
            return Err(ScarifError::BadMagic);
        }
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(ScarifError::BadMagic);
        }
        Self::decode_body(buf)
    }

    /// Decode everything after the marker.
    fn decode_body(buf: &mut impl Buf) -> Result<Self> {
        let version = read_i32(buf)?;
        let chunk_count = read_count(buf, "chunk")?;
        let name_count = read_count(buf, "block name")?;

        let mut translations = TranslationTable::new();
        for _ in 0..name_count {
            let id = read_i16(buf)?;
            let name = read_cstring(buf)?;
            if !translations.insert_first(id, name) {
                warn!(id, "duplicate id in structure name table, keeping first");
            }
        }

        let mut diffs = DiffMap::new();
        for _ in 0..chunk_count {
            let chunk = ChunkPosition::new(read_i32(buf)?, read_i32(buf)?);
            let entry_count = read_count(buf, "block")?;
            // Keep the chunk even when it has no entries.
            diffs.ensure_chunk(chunk);

            for _ in 0..entry_count {
                let (pos, block) = decode_entry(buf, chunk)?;
                if !translations.contains(block.id()) {
                    return Err(ScarifError::UnknownBlockId {
                        id: block.id(),
                        chunk,
                    });
                }
                diffs.append(chunk, pos, block);
            }
        }

        debug!(
            version,
            chunks = diffs.chunk_count(),
            blocks = diffs.entry_count(),
            names = translations.len(),
            "decoded structure"
        );
        Ok(Self {
            version,
            translations,
            diffs,
        })
    }

    /// Read a compressed structure from `reader`.
    ///
    /// A stream that does not start with the marker fails before the body is read.
    pub fn read_from<R: Read>(reader: R, opts: &CodecOptions) -> Result<Self> {
        let mut input = DecompressReader::new(reader, opts.compression);

        let mut magic = [0u8; 4];
        match input.read_exact(&mut magic) {
            Ok(()) => {}
            // Input the decompressor cannot frame is not a structure either.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::InvalidInput
                        | io::ErrorKind::InvalidData
                ) =>
            {
                return Err(ScarifError::BadMagic)
            }
            Err(e) => return Err(e.into()),
        }
        if &magic != MAGIC {
            return Err(ScarifError::BadMagic);
        }

        let mut body = Vec::new();
        input.read_to_end(&mut body)?;
        Self::decode_body(&mut Bytes::from(body))
    }

    /// Load from `path` with default options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &CodecOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, opts: &CodecOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let structure = Self::read_from(BufReader::new(file), opts)?;
        debug!(path = %path.display(), "loaded structure");
        Ok(structure)
    }
}

fn decode_entry(buf: &mut impl Buf, chunk: ChunkPosition) -> Result<(BlockPosition, ScarifBlock)> {
    ensure_remaining(buf, 5)?;
    let xz = buf.get_u8();
    let y = buf.get_u8();
    let id = buf.get_i16_le();
    let flags = BlockFlags::from_bits(buf.get_u8());

    let metadata = if flags.contains(BlockFlags::METADATA) {
        read_u8(buf)?
    } else {
        0
    };

    let tile_data = if flags.contains(BlockFlags::NBT) {
        let len = read_i32(buf)?;
        if len <= 0 {
            return Err(ScarifError::InvalidBlobLength { len: len as i64 });
        }
        let len = len as usize;
        ensure_remaining(buf, len)?;
        Some(TileData::from_bytes(buf.copy_to_bytes(len)))
    } else {
        None
    };

    let pos = chunk
        .block_at(xz >> 4, y as i32, xz & 0x0F)
        .ok_or(ScarifError::ChunkOutOfRange { chunk })?;
    Ok((pos, ScarifBlock::new(id, metadata, tile_data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{TileDataCodec, TileFormat};
    use crate::compression::CompressionAlgorithm;
    use rand::Rng;
    use scarif_nbt::{NbtCompound, NbtRoot, NbtTag};

    fn table() -> TranslationTable {
        [
            (1, "minecraft:stone"),
            (2, "minecraft:grass"),
            (3, "minecraft:dirt"),
            (35, "minecraft:wool"),
            (54, "minecraft:chest"),
            (63, "minecraft:standing_sign"),
        ]
        .into_iter()
        .collect()
    }

    fn sign_tile(text: &str) -> TileData {
        let mut c = NbtCompound::new();
        c.insert("id".into(), NbtTag::String("Sign".into()));
        c.insert("Text1".into(), NbtTag::String(text.into()));
        TileData::encode(&NbtRoot::new("", c), &TileFormat::Java)
    }

    fn add_at(s: &mut ScarifStructure, pos: BlockPosition, block: ScarifBlock) {
        s.add(pos.chunk(), pos, block);
    }

    fn sample() -> ScarifStructure {
        let mut s = ScarifStructure::new(table());
        add_at(&mut s, BlockPosition::new(0, 64, 0), ScarifBlock::plain(1));
        add_at(&mut s, BlockPosition::new(5, 65, 9), ScarifBlock::new(35, 14, None));
        add_at(&mut s, BlockPosition::new(-1, 70, -1), ScarifBlock::plain(2));
        add_at(
            &mut s,
            BlockPosition::new(-17, 0, 33),
            ScarifBlock::new(63, 4, Some(sign_tile("hello"))),
        );
        add_at(&mut s, BlockPosition::new(-1, 71, -1), ScarifBlock::plain(1));
        s
    }

    fn to_bytes(s: &mut ScarifStructure, compression: CompressionAlgorithm) -> Vec<u8> {
        s.write_to(Vec::new(), &CodecOptions::with_compression(compression))
            .unwrap()
    }

    fn from_bytes(data: &[u8], compression: CompressionAlgorithm) -> Result<ScarifStructure> {
        ScarifStructure::read_from(data, &CodecOptions::with_compression(compression))
    }

    /// Uncompressed header + one name, ready for a hand-built chunk section.
    fn raw_header(chunk_count: i32, names: &[(i16, &str)]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_slice(MAGIC);
        buf.put_i32_le(FORMAT_VERSION);
        buf.put_i32_le(chunk_count);
        buf.put_i32_le(names.len() as i32);
        for (id, name) in names {
            buf.put_i16_le(*id);
            write_cstring(&mut buf, name);
        }
        buf
    }

    #[test]
    fn roundtrip_preserves_chunks_and_order() {
        let mut original = sample();
        let data = to_bytes(&mut original, CompressionAlgorithm::Gzip);
        let loaded = from_bytes(&data, CompressionAlgorithm::Gzip).unwrap();

        assert_eq!(loaded.version, FORMAT_VERSION);
        assert_eq!(loaded, original);

        let chunk = ChunkPosition::new(-1, -1);
        let ys: Vec<i32> = loaded
            .diffs
            .get(&chunk)
            .unwrap()
            .iter()
            .map(|e| e.position.y)
            .collect();
        assert_eq!(ys, vec![70, 71]);
    }

    #[test]
    fn roundtrip_every_compression() {
        for compression in [
            CompressionAlgorithm::Zlib,
            CompressionAlgorithm::Gzip,
            CompressionAlgorithm::Snappy,
            CompressionAlgorithm::None,
        ] {
            let mut original = sample();
            let data = to_bytes(&mut original, compression);
            assert_eq!(from_bytes(&data, compression).unwrap(), original, "{compression}");
        }
    }

    #[test]
    fn tile_data_survives_byte_for_byte() {
        let mut original = sample();
        let data = to_bytes(&mut original, CompressionAlgorithm::Gzip);
        let loaded = from_bytes(&data, CompressionAlgorithm::Gzip).unwrap();

        let entry = &loaded.diffs.get(&ChunkPosition::new(-2, 2)).unwrap()[0];
        let tile = entry.block.tile_data().unwrap();
        assert_eq!(tile, &sign_tile("hello"));
        let root = TileFormat::Java.deserialize(tile.as_bytes()).unwrap();
        assert_eq!(root.get("Text1").and_then(NbtTag::as_string), Some("hello"));
        assert_eq!(entry.block.metadata(), 4);
    }

    #[test]
    fn local_coordinates_roundtrip() {
        let chunk = ChunkPosition::new(3, -7);
        let pos = BlockPosition::new(chunk.x * 16 + 5, 64, chunk.z * 16 + 9);
        let mut s = ScarifStructure::new(table());
        s.add(chunk, pos, ScarifBlock::plain(1));

        let data = to_bytes(&mut s, CompressionAlgorithm::None);
        let loaded = from_bytes(&data, CompressionAlgorithm::None).unwrap();
        assert_eq!(loaded.diffs.get(&chunk).unwrap()[0].position, pos);
    }

    #[test]
    fn packed_entry_layout() {
        let chunk = ChunkPosition::new(1, 0);
        let mut s = ScarifStructure::new(table());
        s.add(chunk, BlockPosition::new(21, 200, 9), ScarifBlock::new(35, 14, None));

        let data = to_bytes(&mut s, CompressionAlgorithm::None);
        let mut expected = raw_header(1, &[(35, "minecraft:wool")]);
        expected.put_i32_le(1);
        expected.put_i32_le(0);
        expected.put_i32_le(1);
        expected.put_slice(&[0x59, 200, 35, 0, 0b01, 14]);
        assert_eq!(data, expected.to_vec());
    }

    #[test]
    fn save_prunes_table_before_header() {
        let mut s = sample();
        let data = to_bytes(&mut s, CompressionAlgorithm::None);

        let ids: Vec<i16> = s.translations.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 35, 63]);

        // Header name count matches the entries actually written.
        let name_count = i32::from_le_bytes(data[12..16].try_into().unwrap());
        assert_eq!(name_count, 4);
        let loaded = from_bytes(&data, CompressionAlgorithm::None).unwrap();
        assert_eq!(loaded.translations, s.translations);
        assert!(!loaded.translations.contains(54));
    }

    #[test]
    fn clone_before_save_keeps_full_table() {
        let mut s = sample();
        let full = s.translations.clone();
        to_bytes(&mut s, CompressionAlgorithm::None);
        assert_eq!(full.len(), 6);
        assert_eq!(s.translations.len(), 4);
    }

    #[test]
    fn empty_structure_roundtrip() {
        let mut s = ScarifStructure::new(table());
        let data = to_bytes(&mut s, CompressionAlgorithm::Gzip);
        let loaded = from_bytes(&data, CompressionAlgorithm::Gzip).unwrap();
        assert!(loaded.diffs.is_empty());
        assert!(loaded.translations.is_empty());
    }

    #[test]
    fn bad_magic_stops_after_four_bytes() {
        let mut data = raw_header(0, &[]);
        data[..4].copy_from_slice(b"NOPE");
        let mut buf = data.freeze();
        let total = buf.len();
        assert!(matches!(
            ScarifStructure::decode(&mut buf),
            Err(ScarifError::BadMagic)
        ));
        assert_eq!(buf.remaining(), total - 4);
    }

    #[test]
    fn bad_magic_from_stream() {
        let err = from_bytes(b"PK\x03\x04rest-of-a-zip", CompressionAlgorithm::None).unwrap_err();
        assert!(matches!(err, ScarifError::BadMagic));
        assert!(err.is_format_error());
    }

    #[test]
    fn non_gzip_input_is_bad_magic() {
        let err = from_bytes(b"hello this is not a structure", CompressionAlgorithm::Gzip)
            .unwrap_err();
        assert!(matches!(err, ScarifError::BadMagic), "{err}");
        assert!(err.is_format_error());
    }

    #[test]
    fn encode_rejects_y_above_byte_range() {
        let mut s = ScarifStructure::new(table());
        let pos = BlockPosition::new(3, 300, 4);
        s.add(pos.chunk(), pos, ScarifBlock::plain(1));
        let mut buf = BytesMut::new();
        assert!(matches!(
            s.encode(&mut buf),
            Err(ScarifError::OutOfRange { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_unmapped_id() {
        let mut s = ScarifStructure::new(table());
        let pos = BlockPosition::new(3, 64, 4);
        s.add(pos.chunk(), pos, ScarifBlock::plain(9));
        let mut buf = BytesMut::new();
        assert!(matches!(
            s.encode(&mut buf),
            Err(ScarifError::UnknownBlockId { id: 9, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_then_decode() {
        let s = sample();
        let mut buf = BytesMut::new();
        s.encode(&mut buf).unwrap();
        assert_eq!(ScarifStructure::decode(&mut buf.freeze()).unwrap(), s);
    }

    #[test]
    fn short_stream_is_bad_magic() {
        assert!(matches!(
            from_bytes(b"SC", CompressionAlgorithm::None),
            Err(ScarifError::BadMagic)
        ));
        assert!(matches!(
            ScarifStructure::decode(&mut &b""[..]),
            Err(ScarifError::BadMagic)
        ));
    }

    #[test]
    fn unknown_id_aborts_load() {
        let mut data = raw_header(1, &[(1, "minecraft:stone")]);
        data.put_i32_le(0);
        data.put_i32_le(0);
        data.put_i32_le(2);
        data.put_slice(&[0x00, 10, 1, 0, 0]);
        data.put_slice(&[0x11, 10, 99, 0, 0]);

        let err = ScarifStructure::decode(&mut data.freeze()).unwrap_err();
        assert!(matches!(
            err,
            ScarifError::UnknownBlockId { id: 99, chunk } if chunk == ChunkPosition::new(0, 0)
        ));
        assert!(err.is_format_error());
    }

    #[test]
    fn duplicate_name_id_keeps_first() {
        let mut data = raw_header(
            1,
            &[(1, "minecraft:stone"), (1, "minecraft:granite"), (2, "minecraft:grass")],
        );
        data.put_i32_le(0);
        data.put_i32_le(0);
        data.put_i32_le(1);
        data.put_slice(&[0x00, 10, 1, 0, 0]);

        let s = ScarifStructure::decode(&mut data.freeze()).unwrap();
        assert_eq!(s.translations.len(), 2);
        assert_eq!(s.translations.get(1), Some("minecraft:stone"));
    }

    #[test]
    fn zero_length_tile_rejected() {
        let mut data = raw_header(1, &[(54, "minecraft:chest")]);
        data.put_i32_le(0);
        data.put_i32_le(0);
        data.put_i32_le(1);
        data.put_slice(&[0x00, 10, 54, 0, 0b10]);
        data.put_i32_le(0);

        let err = ScarifStructure::decode(&mut data.freeze()).unwrap_err();
        assert!(matches!(err, ScarifError::InvalidBlobLength { len: 0 }));
        assert!(err.is_format_error());
    }

    #[test]
    fn negative_length_tile_rejected() {
        let mut data = raw_header(1, &[(54, "minecraft:chest")]);
        data.put_i32_le(0);
        data.put_i32_le(0);
        data.put_i32_le(1);
        data.put_slice(&[0x00, 10, 54, 0, 0b11, 2]);
        data.put_i32_le(-8);

        assert!(matches!(
            ScarifStructure::decode(&mut data.freeze()),
            Err(ScarifError::InvalidBlobLength { len: -8 })
        ));
    }

    #[test]
    fn truncated_body_is_eof() {
        let mut s = sample();
        let data = to_bytes(&mut s, CompressionAlgorithm::None);
        let err = from_bytes(&data[..data.len() - 3], CompressionAlgorithm::None).unwrap_err();
        assert!(matches!(err, ScarifError::UnexpectedEof { .. }));
        assert!(!err.is_format_error());
    }

    #[test]
    fn negative_chunk_count_rejected() {
        let data = raw_header(-1, &[]);
        assert!(matches!(
            ScarifStructure::decode(&mut data.freeze()),
            Err(ScarifError::NegativeCount { what: "chunk", count: -1 })
        ));
    }

    #[test]
    fn empty_chunk_is_kept() {
        let mut data = raw_header(1, &[]);
        data.put_i32_le(4);
        data.put_i32_le(-4);
        data.put_i32_le(0);
        let s = ScarifStructure::decode(&mut data.freeze()).unwrap();
        assert_eq!(s.chunk_count(), 1);
        assert_eq!(s.diffs.get(&ChunkPosition::new(4, -4)), Some(&[][..]));
    }

    #[test]
    fn flags_without_payload_bits_ignore_unknown() {
        let mut data = raw_header(1, &[(1, "minecraft:stone")]);
        data.put_i32_le(0);
        data.put_i32_le(0);
        data.put_i32_le(1);
        data.put_slice(&[0x00, 10, 1, 0, 0b1000_0000]);
        let s = ScarifStructure::decode(&mut data.freeze()).unwrap();
        assert_eq!(s.block_count(), 1);
    }

    #[test]
    fn save_rejects_out_of_range_y() {
        let mut s = ScarifStructure::new(table());
        add_at(&mut s, BlockPosition::new(0, 256, 0), ScarifBlock::plain(1));
        let err = s.write_to(Vec::new(), &CodecOptions::default()).unwrap_err();
        assert!(matches!(err, ScarifError::OutOfRange { .. }));

        let mut s = ScarifStructure::new(table());
        add_at(&mut s, BlockPosition::new(0, -1, 0), ScarifBlock::plain(1));
        assert!(s.write_to(Vec::new(), &CodecOptions::default()).is_err());
        // A failed save leaves the table alone.
        assert_eq!(s.translations.len(), 6);
    }

    #[test]
    fn save_rejects_position_outside_chunk() {
        let mut s = ScarifStructure::new(table());
        s.add(ChunkPosition::new(0, 0), BlockPosition::new(16, 10, 0), ScarifBlock::plain(1));
        assert!(matches!(
            s.write_to(Vec::new(), &CodecOptions::default()),
            Err(ScarifError::OutOfRange { .. })
        ));
    }

    #[test]
    fn save_rejects_unmapped_id() {
        let mut s = ScarifStructure::new(table());
        add_at(&mut s, BlockPosition::new(0, 10, 0), ScarifBlock::plain(500));
        assert!(matches!(
            s.write_to(Vec::new(), &CodecOptions::default()),
            Err(ScarifError::UnknownBlockId { id: 500, .. })
        ));
    }

    #[test]
    fn save_rejects_empty_tile_and_nul_names() {
        let mut s = ScarifStructure::new(table());
        let empty = TileData::from_bytes(Vec::<u8>::new());
        add_at(&mut s, BlockPosition::new(0, 10, 0), ScarifBlock::new(54, 0, Some(empty)));
        assert!(matches!(
            s.write_to(Vec::new(), &CodecOptions::default()),
            Err(ScarifError::InvalidBlobLength { len: 0 })
        ));

        let mut names = TranslationTable::new();
        names.add(1, "bad\0name").unwrap();
        let mut s = ScarifStructure::new(names);
        add_at(&mut s, BlockPosition::new(0, 10, 0), ScarifBlock::plain(1));
        assert!(matches!(
            s.write_to(Vec::new(), &CodecOptions::default()),
            Err(ScarifError::InvalidName { id: 1 })
        ));
    }

    #[test]
    fn filtered_keeps_entries_in_bounds() {
        let s = sample();
        let bounds = ChunkBounds::new(BlockPosition::new(-5, 0, -5), BlockPosition::new(10, 255, 10));
        let filtered = s.filtered(&bounds);

        assert_eq!(filtered.block_count(), 4);
        assert!(filtered.diffs.get(&ChunkPosition::new(-2, 2)).is_none());
        assert_eq!(filtered.translations, s.translations);

        let unbounded = s.filtered(&ChunkBounds::unbounded());
        assert_eq!(unbounded, s);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.scrf");

        let mut s = sample();
        s.save(&path).unwrap();
        let loaded = ScarifStructure::load(&path).unwrap();
        assert_eq!(loaded, s);

        // Only the destination is left behind.
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn failed_save_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.scrf");
        std::fs::write(&path, b"previous contents").unwrap();

        let mut s = ScarifStructure::new(table());
        add_at(&mut s, BlockPosition::new(0, 300, 0), ScarifBlock::plain(1));
        assert!(s.save(&path).is_err());

        assert_eq!(std::fs::read(&path).unwrap(), b"previous contents");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_with_matching_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snappy.scrf");
        let opts = CodecOptions::with_compression(CompressionAlgorithm::Snappy);

        let mut s = sample();
        s.save_with(&path, &opts).unwrap();
        assert_eq!(ScarifStructure::load_with(&path, &opts).unwrap(), s);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScarifStructure::load(dir.path().join("nope.scrf")).unwrap_err();
        assert!(matches!(err, ScarifError::Io(_)));
    }

    #[test]
    fn random_structures_roundtrip() {
        let mut rng = rand::thread_rng();
        let names: TranslationTable = (0..64i16).map(|id| (id, format!("test:block_{id}"))).collect();

        for _ in 0..20 {
            let mut s = ScarifStructure::new(names.clone());
            for _ in 0..rng.gen_range(0..200) {
                let pos = BlockPosition::new(
                    rng.gen_range(-4096..4096),
                    rng.gen_range(0..=MAX_Y),
                    rng.gen_range(-4096..4096),
                );
                let tile = if rng.gen_bool(0.1) {
                    let len = rng.gen_range(1..64);
                    Some(TileData::from_bytes((0..len).map(|_| rng.gen()).collect::<Vec<u8>>()))
                } else {
                    None
                };
                let block = ScarifBlock::new(rng.gen_range(0..64), rng.gen(), tile);
                add_at(&mut s, pos, block);
            }

            let data = to_bytes(&mut s, CompressionAlgorithm::Zlib);
            let loaded = from_bytes(&data, CompressionAlgorithm::Zlib).unwrap();
            assert_eq!(loaded, s);
            assert_eq!(loaded.translations.len(), s.diffs.referenced_ids().len());
        }
    }
}
