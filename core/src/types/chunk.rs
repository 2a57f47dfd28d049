//! Terrain chunk types and their wire decoding.
//!
//! The server transmits terrain as fixed-size chunks, each one a pair of
//! flat row-major byte arrays (tile type codes and per-tile variants),
//! zlib-compressed and bincode-encoded as one unit.

use std::io::Read;

use bincode::{Decode, Encode};
use flate2::read::ZlibDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic terrain kind, mapped from the raw on-wire type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Grass,
    Dirt,
    DirtRoad,
    Sea,
    Beach,
    Sand,
    HotSpringWater,
    Quarry,
    Asphalt,
    Forest,
    Tundra,
    Alpine,
    TundraGrass,
}

/// Fixed code-to-kind lookup. Order is part of the wire format.
const TILE_TYPE_TABLE: [TileType; 13] = [
    TileType::Grass,
    TileType::Dirt,
    TileType::DirtRoad,
    TileType::Sea,
    TileType::Beach,
    TileType::Sand,
    TileType::HotSpringWater,
    TileType::Quarry,
    TileType::Asphalt,
    TileType::Forest,
    TileType::Tundra,
    TileType::Alpine,
    TileType::TundraGrass,
];

impl TileType {
    /// Maps a raw wire code to a tile kind. Unknown codes yield `None` and
    /// the tile is treated as not yet loaded.
    pub fn from_code(code: u8) -> Option<TileType> {
        TILE_TYPE_TABLE.get(code as usize).copied()
    }

    pub fn to_code(self) -> u8 {
        TILE_TYPE_TABLE
            .iter()
            .position(|t| *t == self)
            .unwrap_or(0) as u8
    }

    /// Any kind of water. Drives the partially-submerged sprite split.
    pub fn is_water(self) -> bool {
        matches!(self, TileType::Sea | TileType::HotSpringWater)
    }

    pub fn is_sea_water(self) -> bool {
        matches!(self, TileType::Sea)
    }
}

/// One decoded terrain chunk. Replaced wholesale on update.
#[derive(Clone, Debug, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct TileChunk {
    pub chunk_x: i32,
    pub chunk_y: i32,
    pub chunk_size: u32,
    pub tile_types: Vec<u8>,
    pub variants: Vec<u8>,
}

impl TileChunk {
    /// Number of tiles a well-formed chunk of this size carries.
    pub fn expected_len(&self) -> usize {
        (self.chunk_size as usize) * (self.chunk_size as usize)
    }

    /// Checks the structural invariants of a decoded chunk.
    pub fn validate(&self) -> Result<(), ChunkDecodeError> {
        if self.chunk_size == 0 {
            return Err(ChunkDecodeError::ZeroChunkSize);
        }
        let expected = self.expected_len();
        if self.tile_types.len() != expected || self.variants.len() != expected {
            return Err(ChunkDecodeError::LengthMismatch {
                types: self.tile_types.len(),
                variants: self.variants.len(),
                expected,
            });
        }
        Ok(())
    }

    /// Tile kind and variant at a local offset, row-major. `None` when the
    /// offset is out of range or the type code is unknown.
    pub fn tile_at_local(&self, local_x: u32, local_y: u32) -> Option<(TileType, u8)> {
        if local_x >= self.chunk_size || local_y >= self.chunk_size {
            return None;
        }
        let idx = (local_y * self.chunk_size + local_x) as usize;
        let kind = TileType::from_code(*self.tile_types.get(idx)?)?;
        let variant = *self.variants.get(idx)?;
        Some((kind, variant))
    }
}

#[derive(Debug, Error)]
pub enum ChunkDecodeError {
    #[error("zlib inflate failed: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("chunk payload malformed: {0}")]
    Payload(#[from] bincode::error::DecodeError),
    #[error("chunk declares a size of zero")]
    ZeroChunkSize,
    #[error("tile arrays hold {types}/{variants} entries, expected {expected}")]
    LengthMismatch {
        types: usize,
        variants: usize,
        expected: usize,
    },
}

/// Decodes one compressed chunk payload: zlib inflate, then bincode.
///
/// The result is validated; a malformed chunk never reaches the tile cache.
pub fn decode_chunk_payload(payload: &[u8]) -> Result<TileChunk, ChunkDecodeError> {
    let mut raw = Vec::new();
    ZlibDecoder::new(payload).read_to_end(&mut raw)?;

    let (chunk, _len): (TileChunk, usize) =
        bincode::decode_from_slice(&raw, bincode::config::standard())?;
    chunk.validate()?;
    Ok(chunk)
}

/// Encodes a chunk into its wire form. The server side of the format; kept
/// here so tests and tools can fabricate payloads.
pub fn encode_chunk_payload(chunk: &TileChunk) -> Result<Vec<u8>, bincode::error::EncodeError> {
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    let raw = bincode::encode_to_vec(chunk, bincode::config::standard())?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    let _ = encoder.write_all(&raw);
    Ok(encoder.finish().unwrap_or_default())
}
