//! Text and JSON reports for the CLI subcommands.

use std::fmt::Write as _;

use scarif::{ScarifStructure, TileDataCodec, TileFormat, TranslationTable};
use serde::Serialize;

/// One-paragraph summary of a structure.
pub fn info_report(structure: &ScarifStructure) -> String {
    let tiles = structure
        .diffs
        .iter()
        .flat_map(|(_, entries)| entries)
        .filter(|e| e.block.tile_data().is_some())
        .count();

    let mut out = String::new();
    let _ = writeln!(out, "version:      {}", structure.version);
    let _ = writeln!(out, "chunks:       {}", structure.chunk_count());
    let _ = writeln!(out, "blocks:       {}", structure.block_count());
    let _ = writeln!(out, "tile entities: {tiles}");
    let _ = writeln!(out, "block names:  {}", structure.translations.len());
    out
}

/// Every id and name in a translation table, one per line.
pub fn mapping_report(table: &TranslationTable) -> String {
    let mut out = String::new();
    for (id, name) in table.iter() {
        let _ = writeln!(out, "{id:>5}  {name}");
    }
    out
}

/// Every chunk and entry, human readable.
pub fn dump_text(structure: &ScarifStructure, tiles: TileFormat) -> String {
    let mut out = String::new();
    for (chunk, entries) in structure.diffs.iter() {
        let _ = writeln!(out, "chunk {chunk}: {} blocks", entries.len());
        for entry in entries {
            let block = &entry.block;
            let name = structure.translations.get(block.id()).unwrap_or("?");
            let _ = write!(
                out,
                "  {} {name} (id {}, meta {})",
                entry.position,
                block.id(),
                block.metadata()
            );
            if let Some(tile) = block.tile_data() {
                match tiles.deserialize(tile.as_bytes()) {
                    Ok(root) => {
                        let _ = write!(out, " tile {root}");
                    }
                    Err(_) => {
                        let _ = write!(out, " tile <{} bytes>", tile.len());
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct DumpChunk<'a> {
    x: i32,
    z: i32,
    blocks: Vec<DumpBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct DumpBlock<'a> {
    x: i32,
    y: i32,
    z: i32,
    id: i16,
    name: Option<&'a str>,
    metadata: u8,
    tile_bytes: Option<usize>,
}

/// Every chunk and entry as a JSON array.
pub fn dump_json(structure: &ScarifStructure) -> serde_json::Result<String> {
    let chunks: Vec<DumpChunk<'_>> = structure
        .diffs
        .iter()
        .map(|(chunk, entries)| DumpChunk {
            x: chunk.x,
            z: chunk.z,
            blocks: entries
                .iter()
                .map(|entry| DumpBlock {
                    x: entry.position.x,
                    y: entry.position.y,
                    z: entry.position.z,
                    id: entry.block.id(),
                    name: structure.translations.get(entry.block.id()),
                    metadata: entry.block.metadata(),
                    tile_bytes: entry.block.tile_data().map(|t| t.len()),
                })
                .collect(),
        })
        .collect();
    serde_json::to_string_pretty(&chunks)
}
