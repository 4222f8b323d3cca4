//! Stream compression wrapped around a whole structure file.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::ScarifError;

/// Compression algorithms a structure file may be wrapped in.
///
/// The file does not record which one was used; reader and writer must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Raw deflate.
    Zlib,
    #[default]
    Gzip,
    /// Snappy frame format.
    Snappy,
    None,
}

impl CompressionAlgorithm {
    pub fn from_name(name: &str) -> Result<Self, ScarifError> {
        match name.to_ascii_lowercase().as_str() {
            "zlib" | "deflate" => Ok(Self::Zlib),
            "gzip" | "gz" => Ok(Self::Gzip),
            "snappy" => Ok(Self::Snappy),
            "none" => Ok(Self::None),
            _ => Err(ScarifError::UnknownCompression(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::None => "none",
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = ScarifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings shared by save and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    pub compression: CompressionAlgorithm,
    /// Compression level, 0-9. Ignored by snappy and none.
    pub level: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::default(),
            level: 6,
        }
    }
}

impl CodecOptions {
    pub fn with_compression(compression: CompressionAlgorithm) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }
}

/// A writer that compresses everything written through it.
///
/// [`CompressWriter::finish`] must be called to flush trailing frames.
pub enum CompressWriter<W: Write> {
    Zlib(DeflateEncoder<W>),
    Gzip(GzEncoder<W>),
    Snappy(snap::write::FrameEncoder<W>),
    None(W),
}

impl<W: Write> CompressWriter<W> {
    pub fn new(inner: W, algorithm: CompressionAlgorithm, level: u32) -> Self {
        let level = Compression::new(level.min(9));
        match algorithm {
            CompressionAlgorithm::Zlib => Self::Zlib(DeflateEncoder::new(inner, level)),
            CompressionAlgorithm::Gzip => Self::Gzip(GzEncoder::new(inner, level)),
            CompressionAlgorithm::Snappy => Self::Snappy(snap::write::FrameEncoder::new(inner)),
            CompressionAlgorithm::None => Self::None(inner),
        }
    }

    /// Write any buffered output and hand back the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Zlib(encoder) => encoder.finish(),
            Self::Gzip(encoder) => encoder.finish(),
            Self::Snappy(encoder) => encoder
                .into_inner()
                .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string())),
            Self::None(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
        }
    }
}

impl<W: Write> Write for CompressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Zlib(encoder) => encoder.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
            Self::Snappy(encoder) => encoder.write(buf),
            Self::None(inner) => inner.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Zlib(encoder) => encoder.flush(),
            Self::Gzip(encoder) => encoder.flush(),
            Self::Snappy(encoder) => encoder.flush(),
            Self::None(inner) => inner.flush(),
        }
    }
}

/// A reader that decompresses its inner stream.
pub enum DecompressReader<R: Read> {
    Zlib(DeflateDecoder<R>),
    Gzip(GzDecoder<R>),
    Snappy(snap::read::FrameDecoder<R>),
    None(R),
}

impl<R: Read> DecompressReader<R> {
    pub fn new(inner: R, algorithm: CompressionAlgorithm) -> Self {
        match algorithm {
            CompressionAlgorithm::Zlib => Self::Zlib(DeflateDecoder::new(inner)),
            CompressionAlgorithm::Gzip => Self::Gzip(GzDecoder::new(inner)),
            CompressionAlgorithm::Snappy => Self::Snappy(snap::read::FrameDecoder::new(inner)),
            CompressionAlgorithm::None => Self::None(inner),
        }
    }
}

impl<R: Read> Read for DecompressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Zlib(decoder) => decoder.read(buf),
            Self::Gzip(decoder) => decoder.read(buf),
            Self::Snappy(decoder) => decoder.read(buf),
            Self::None(inner) => inner.read(buf),
        }
    }
}
