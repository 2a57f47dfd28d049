//! Constants module - world geometry, movement, and render-tuning defaults
//! shared between the render core and its tests.

use bitflags::bitflags;

// =============================================================================
// World Geometry
// =============================================================================

/// Side length of one terrain tile in world units (pixels).
pub const TILE_SIZE_PX: u32 = 48;

/// Side length of one terrain chunk in tiles. Chunks are transmitted and
/// cached as one unit.
pub const CHUNK_SIZE_TILES: u32 = 16;

/// World dimensions in tiles.
pub const WORLD_WIDTH_TILES: u32 = 1000;
pub const WORLD_HEIGHT_TILES: u32 = 1000;

pub const WORLD_WIDTH_CHUNKS: u32 = WORLD_WIDTH_TILES.div_ceil(CHUNK_SIZE_TILES);
pub const WORLD_HEIGHT_CHUNKS: u32 = WORLD_HEIGHT_TILES.div_ceil(CHUNK_SIZE_TILES);

pub const WORLD_WIDTH_PX: f64 = (WORLD_WIDTH_TILES * TILE_SIZE_PX) as f64;
pub const WORLD_HEIGHT_PX: f64 = (WORLD_HEIGHT_TILES * TILE_SIZE_PX) as f64;

// =============================================================================
// Timing
// =============================================================================

/// Server simulation ticks per second.
pub const SERVER_TICKS_PER_SECOND: u32 = 20;

/// One client input command covers one input-sampling step of this length.
/// Matches the server tick so replayed input integrates identically.
pub const INPUT_STEP_MS: u64 = 1_000 / SERVER_TICKS_PER_SECOND as u64;

// =============================================================================
// Movement (server-authoritative values, mirrored for local prediction)
// =============================================================================

/// Base walking speed in world units per second.
pub const PLAYER_SPEED: f64 = 200.0;

/// Sprint speed factor.
pub const SPRINT_MULTIPLIER: f64 = 2.0;

/// Crouch speed factor.
pub const CROUCH_MULTIPLIER: f64 = 0.5;

/// Speed factor while standing in water.
pub const WATER_SPEED_PENALTY: f64 = 0.5;

// =============================================================================
// Render Tuning Defaults
// =============================================================================
// Defaults for the host-exposed knobs. The effective values live in the
// client's `RenderConfig`; these are only the fallbacks.

/// Extra margin around the viewport used for culling, to avoid pop-in at the
/// screen edges.
pub const DEFAULT_CULL_MARGIN_PX: f64 = 128.0;

/// How far in the past remote actors are rendered, so that two bracketing
/// network samples usually exist.
pub const DEFAULT_RENDER_DELAY_MS: u64 = 100;

/// Upper bound on linear extrapolation past the newest remote sample.
pub const DEFAULT_EXTRAPOLATION_CLAMP_MS: u64 = 250;

/// Capacity of each remote actor's interpolation ring.
pub const DEFAULT_INTERP_BUFFER_CAPACITY: usize = 4;

/// Extra ring of tiles fetched around the visible tile window.
pub const DEFAULT_TILE_EDGE_BUFFER: i32 = 2;

/// How far (in tiles) the camera must move before the terrain window is
/// recomputed.
pub const DEFAULT_CAMERA_RECOMPUTE_THRESHOLD_TILES: i32 = 1;

/// Default distance between a tall sprite's footprint anchor and its visible
/// foot line. Tuned per asset; override per kind via `RenderConfig`.
pub const DEFAULT_VISUAL_FOOT_OFFSET_PX: f64 = 170.0;

// =============================================================================
// Sprite Extents
// =============================================================================
// Nominal world-space sprite boxes used for culling. Anchors sit at the
// bottom-center of the box (the entity's foot line).

pub const ACTOR_SPRITE_W_PX: f64 = 96.0;
pub const ACTOR_SPRITE_H_PX: f64 = 128.0;

pub const ITEM_SPRITE_W_PX: f64 = 48.0;
pub const ITEM_SPRITE_H_PX: f64 = 48.0;

pub const PROJECTILE_SPRITE_W_PX: f64 = 32.0;
pub const PROJECTILE_SPRITE_H_PX: f64 = 32.0;

pub const DECORATION_SPRITE_W_PX: f64 = 64.0;
pub const DECORATION_SPRITE_H_PX: f64 = 64.0;

// =============================================================================
// Actor Flags
// =============================================================================

bitflags! {
    /// Transient state bits carried by player snapshots. The render core only
    /// reads these; the server owns them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct ActorFlags: u16 {
        /// Moving at sprint speed.
        const SPRINTING = 1 << 0;
        /// Crouched; moves at half speed.
        const CROUCHING = 1 << 1;
        /// Standing in a water tile; waterline crosses the sprite.
        const ON_WATER = 1 << 2;
        /// Fully submerged (snorkeling); rendered entirely below the
        /// water overlay.
        const SNORKELING = 1 << 3;
        /// Downed but not dead.
        const KNOCKED_OUT = 1 << 4;
        /// Carrying a lit torch.
        const TORCH_LIT = 1 << 5;
        /// Dead; corpse handling is a separate entity.
        const DEAD = 1 << 6;
    }
}

impl ActorFlags {
    /// Speed factor implied by the current movement-related flags.
    pub fn speed_multiplier(self) -> f64 {
        if self.contains(ActorFlags::KNOCKED_OUT) || self.contains(ActorFlags::DEAD) {
            return 0.0;
        }
        let mut factor = 1.0;
        if self.contains(ActorFlags::SPRINTING) {
            factor *= SPRINT_MULTIPLIER;
        }
        if self.contains(ActorFlags::CROUCHING) {
            factor *= CROUCH_MULTIPLIER;
        }
        if self.contains(ActorFlags::ON_WATER) {
            factor *= WATER_SPEED_PENALTY;
        }
        factor
    }
}
