//! World-space positions, tile coordinates, and axis-aligned rectangles.
//!
//! World units are pixels; the server owns all authoritative positions and
//! the render core only derives from them.

use serde::{Deserialize, Serialize};

use crate::constants::{CHUNK_SIZE_TILES, TILE_SIZE_PX};

/// An authoritative or predicted location in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
}

impl WorldPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        WorldPosition { x, y }
    }

    /// `false` for NaN or infinite components. Malformed positions are
    /// skipped by the frame pipeline, never rendered.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The tile this position falls on.
    pub fn tile(&self) -> TileCoord {
        TileCoord {
            x: (self.x / TILE_SIZE_PX as f64).floor() as i32,
            y: (self.y / TILE_SIZE_PX as f64).floor() as i32,
        }
    }

    /// Linear interpolation toward `other`. `t` outside `[0, 1]`
    /// extrapolates along the same line.
    pub fn lerp(self, other: WorldPosition, t: f64) -> WorldPosition {
        WorldPosition {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Integer tile coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    /// Coordinate of the chunk owning this tile.
    pub fn chunk(&self) -> (i32, i32) {
        (
            self.x.div_euclid(CHUNK_SIZE_TILES as i32),
            self.y.div_euclid(CHUNK_SIZE_TILES as i32),
        )
    }

    /// Offset of this tile inside its owning chunk, row-major.
    pub fn local_in_chunk(&self) -> (u32, u32) {
        (
            self.x.rem_euclid(CHUNK_SIZE_TILES as i32) as u32,
            self.y.rem_euclid(CHUNK_SIZE_TILES as i32) as u32,
        )
    }
}

/// Axis-aligned world-space rectangle, `min` inclusive / `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldRect {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        WorldRect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle of `width` x `height` centered on `center`.
    pub fn centered_on(center: WorldPosition, width: f64, height: f64) -> Self {
        WorldRect {
            min_x: center.x - width / 2.0,
            min_y: center.y - height / 2.0,
            max_x: center.x + width / 2.0,
            max_y: center.y + height / 2.0,
        }
    }

    /// The same rectangle grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        WorldRect {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains(&self, pos: WorldPosition) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.y >= self.min_y && pos.y < self.max_y
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Inclusive range of tile coordinates touched by this rectangle.
    pub fn tile_bounds(&self) -> (TileCoord, TileCoord) {
        let min = WorldPosition::new(self.min_x, self.min_y).tile();
        // max is exclusive: a rectangle ending exactly on a tile boundary
        // does not touch the next row/column.
        let max = TileCoord {
            x: (self.max_x / TILE_SIZE_PX as f64).ceil() as i32 - 1,
            y: (self.max_y / TILE_SIZE_PX as f64).ceil() as i32 - 1,
        };
        (min, max)
    }
}
