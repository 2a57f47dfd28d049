//! Incremental spatial tile cache.
//!
//! Chunks arrive from the network as whole units and live in a sparse map;
//! the cache answers "which tiles are in this window" by decoding local
//! offsets out of the owning chunks. A chunk that has not arrived yet simply
//! contributes no tiles - absence means "not loaded", never an error.

use std::collections::BTreeMap;

use tide_core::types::{ChunkDecodeError, TileChunk, TileCoord, TileType, WorldPosition, WorldRect};

/// Decoded per-tile view handed to the drawing collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileInfo {
    pub kind: TileType,
    pub variant: u8,
}

#[derive(Default)]
pub struct TileCache {
    chunks: BTreeMap<(i32, i32), TileChunk>,
    revision: u64,
}

impl TileCache {
    pub fn new() -> Self {
        TileCache::default()
    }

    /// Inserts or replaces a chunk wholesale. Malformed chunks are rejected
    /// before they can poison window queries.
    pub fn upsert_chunk(&mut self, chunk: TileChunk) -> Result<(), ChunkDecodeError> {
        chunk.validate()?;
        self.chunks.insert((chunk.chunk_x, chunk.chunk_y), chunk);
        self.revision += 1;
        Ok(())
    }

    pub fn remove_chunk(&mut self, chunk_x: i32, chunk_y: i32) -> bool {
        let removed = self.chunks.remove(&(chunk_x, chunk_y)).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bumped on every mutation; window memoization keys on it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Kind and variant of a single tile, or `None` when its chunk has not
    /// arrived (or the type code is unknown).
    pub fn tile_at(&self, coord: TileCoord) -> Option<TileInfo> {
        let chunk = self.chunks.get(&coord.chunk())?;
        let (lx, ly) = coord.local_in_chunk();
        let (kind, variant) = chunk.tile_at_local(lx, ly)?;
        Some(TileInfo { kind, variant })
    }

    /// All loaded tiles inside `window`, expanded by `edge_buffer` tiles on
    /// every side.
    pub fn tiles_in(&self, window: &WorldRect, edge_buffer: i32) -> BTreeMap<TileCoord, TileInfo> {
        let mut out = BTreeMap::new();
        let (min, max) = window.tile_bounds();
        for ty in (min.y - edge_buffer)..=(max.y + edge_buffer) {
            for tx in (min.x - edge_buffer)..=(max.x + edge_buffer) {
                let coord = TileCoord::new(tx, ty);
                if let Some(info) = self.tile_at(coord) {
                    out.insert(coord, info);
                }
            }
        }
        out
    }

    /// Releases every chunk. Session teardown.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.revision += 1;
    }
}

/// The frame-resident, memoized window over the tile cache.
///
/// Recomputing the window on every sub-pixel camera move would dwarf the
/// actual draw cost, so the query is keyed on the coarse camera tile
/// coordinate plus the cache revision and only re-runs when either moves
/// far enough.
pub struct TerrainWindow {
    tiles: BTreeMap<TileCoord, TileInfo>,
    key: Option<(TileCoord, u64)>,
}

impl TerrainWindow {
    pub fn new() -> Self {
        TerrainWindow {
            tiles: BTreeMap::new(),
            key: None,
        }
    }

    /// Refreshes the window if the camera moved more than
    /// `recompute_threshold_tiles` since the last computation or the cache
    /// changed underneath it. Returns `true` when a recompute happened.
    pub fn refresh(
        &mut self,
        cache: &TileCache,
        window: &WorldRect,
        camera_focus: WorldPosition,
        edge_buffer: i32,
        recompute_threshold_tiles: i32,
    ) -> bool {
        let camera_tile = camera_focus.tile();
        if let Some((last_tile, last_revision)) = self.key {
            let moved = (camera_tile.x - last_tile.x)
                .abs()
                .max((camera_tile.y - last_tile.y).abs());
            if last_revision == cache.revision() && moved <= recompute_threshold_tiles {
                return false;
            }
        }

        self.tiles = cache.tiles_in(window, edge_buffer);
        self.key = Some((camera_tile, cache.revision()));
        true
    }

    pub fn tiles(&self) -> &BTreeMap<TileCoord, TileInfo> {
        &self.tiles
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.key = None;
    }
}

impl Default for TerrainWindow {
    fn default() -> Self {
        TerrainWindow::new()
    }
}
