//! Entity filter and classifier.
//!
//! Intersects the store against the culling window and tags every survivor
//! with the data the depth compositor needs: render plane, effective sort
//! key, and submersion state. Pure with respect to the stores it reads; the
//! candidate list is rebuilt from scratch every frame in stable id order so
//! identical state always yields identical output.

use tide_core::constants::{
    ActorFlags, ACTOR_SPRITE_H_PX, ACTOR_SPRITE_W_PX, DECORATION_SPRITE_H_PX,
    DECORATION_SPRITE_W_PX, ITEM_SPRITE_H_PX, ITEM_SPRITE_W_PX, PROJECTILE_SPRITE_H_PX,
    PROJECTILE_SPRITE_W_PX,
};
use tide_core::types::{
    DecorationKind, EntityId, RenderCategory, WorldPosition, WorldRect,
};

use crate::config::RenderConfig;
use crate::interpolation::RemoteInterpolator;
use crate::store::EntityStore;
use crate::tile_cache::TileCache;
use crate::visual_fx::VisualFxTable;

/// Which visual plane a candidate occupies. Everything airborne draws above
/// everything grounded, independent of Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderPlane {
    Ground,
    Air,
}

/// Which part of the sprite a candidate covers. `Bottom`/`Top` only appear
/// after the compositor splits a partially submerged actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpriteSlice {
    Bottom,
    Whole,
    Top,
}

/// Water submersion of an actor, decided at classification time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submersion {
    Dry,
    /// Waterline crosses the sprite; the compositor splits it.
    Partial,
    /// Fully under (snorkeling); drawn whole beneath the water overlay.
    Full,
}

/// One frame-local draw candidate. Never outlives the frame that built it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCandidate {
    pub id: EntityId,
    pub category: RenderCategory,
    pub plane: RenderPlane,
    /// Resolved draw position (foot anchor) for this frame.
    pub pos: WorldPosition,
    /// Effective depth key: foot Y for actors, anchor Y minus the
    /// visual-foot offset for tall sprites.
    pub sort_y: f64,
    pub slice: SpriteSlice,
    pub submersion: Submersion,
    /// Draw-time shake offset; never part of the depth key.
    pub jitter: (f32, f32),
}

/// Sprite box with the anchor at bottom-center.
fn anchored_extent(pos: WorldPosition, width: f64, height: f64) -> WorldRect {
    WorldRect {
        min_x: pos.x - width / 2.0,
        min_y: pos.y - height,
        max_x: pos.x + width / 2.0,
        max_y: pos.y,
    }
}

/// Builds the unsorted candidate list for one frame.
///
/// `predicted` is the local actor's predicted position; remote actors pull
/// their positions from the interpolator, falling back to the raw store
/// position when a buffer is starved. Malformed positions are skipped and
/// logged - one bad entity never costs the frame.
#[allow(clippy::too_many_arguments)]
pub fn build_candidates(
    store: &EntityStore,
    local_id: EntityId,
    predicted: WorldPosition,
    interp: &RemoteInterpolator,
    now_ms: u64,
    cull_rect: &WorldRect,
    tiles: &TileCache,
    config: &RenderConfig,
    fx: &VisualFxTable,
) -> Vec<RenderCandidate> {
    let mut out = Vec::new();

    for player in store.players() {
        let pos = if player.id == local_id {
            predicted
        } else {
            interp.sample(player.id, now_ms).unwrap_or(player.pos)
        };
        if !pos.is_finite() {
            log::warn!("skipping player {} with malformed position {pos:?}", player.id);
            continue;
        }
        if !anchored_extent(pos, ACTOR_SPRITE_W_PX, ACTOR_SPRITE_H_PX).intersects(cull_rect) {
            continue;
        }

        let submersion = if player.flags.contains(ActorFlags::SNORKELING) {
            Submersion::Full
        } else if player.flags.contains(ActorFlags::ON_WATER) {
            Submersion::Partial
        } else {
            Submersion::Dry
        };

        out.push(RenderCandidate {
            id: player.id,
            category: RenderCategory::Player,
            plane: RenderPlane::Ground,
            pos,
            sort_y: pos.y,
            slice: SpriteSlice::Whole,
            submersion,
            jitter: fx.offset(player.id, now_ms),
        });
    }

    for animal in store.animals() {
        let pos = interp.sample(animal.id, now_ms).unwrap_or(animal.pos);
        if !pos.is_finite() {
            log::warn!("skipping animal {} with malformed position {pos:?}", animal.id);
            continue;
        }
        if !anchored_extent(pos, ACTOR_SPRITE_W_PX, ACTOR_SPRITE_H_PX).intersects(cull_rect) {
            continue;
        }

        let plane = if animal.species.is_airborne() {
            RenderPlane::Air
        } else {
            RenderPlane::Ground
        };
        out.push(RenderCandidate {
            id: animal.id,
            category: RenderCategory::Animal,
            plane,
            pos,
            sort_y: pos.y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: fx.offset(animal.id, now_ms),
        });
    }

    for structure in store.structures() {
        let pos = structure.pos;
        if !pos.is_finite() {
            log::warn!(
                "skipping structure {} with malformed position {pos:?}",
                structure.id
            );
            continue;
        }
        let extent = anchored_extent(
            pos,
            structure.kind.visual_width_px(),
            structure.kind.visual_height_px(),
        );
        if !extent.intersects(cull_rect) {
            continue;
        }

        let sort_y = if structure.kind.is_tall() {
            pos.y - config.foot_offset_px(structure.kind.key_name())
        } else {
            pos.y
        };
        out.push(RenderCandidate {
            id: structure.id,
            category: RenderCategory::Structure,
            plane: RenderPlane::Ground,
            pos,
            sort_y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: fx.offset(structure.id, now_ms),
        });
    }

    for resource in store.resources() {
        let pos = resource.pos;
        if !pos.is_finite() {
            log::warn!(
                "skipping resource {} with malformed position {pos:?}",
                resource.id
            );
            continue;
        }
        let extent = anchored_extent(
            pos,
            resource.kind.visual_width_px(),
            resource.kind.visual_height_px(),
        );
        if !extent.intersects(cull_rect) {
            continue;
        }

        let sort_y = if resource.kind.is_tall() {
            pos.y - config.foot_offset_px(resource.kind.key_name())
        } else {
            pos.y
        };
        out.push(RenderCandidate {
            id: resource.id,
            category: RenderCategory::Resource,
            plane: RenderPlane::Ground,
            pos,
            sort_y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: fx.offset(resource.id, now_ms),
        });
    }

    for item in store.dropped_items() {
        let pos = item.pos;
        if !pos.is_finite() {
            log::warn!("skipping item {} with malformed position {pos:?}", item.id);
            continue;
        }
        if !anchored_extent(pos, ITEM_SPRITE_W_PX, ITEM_SPRITE_H_PX).intersects(cull_rect) {
            continue;
        }
        out.push(RenderCandidate {
            id: item.id,
            category: RenderCategory::DroppedItem,
            plane: RenderPlane::Ground,
            pos,
            sort_y: pos.y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: (0.0, 0.0),
        });
    }

    for projectile in store.projectiles() {
        let pos = projectile.pos;
        if !pos.is_finite() {
            log::warn!(
                "skipping projectile {} with malformed position {pos:?}",
                projectile.id
            );
            continue;
        }
        if !anchored_extent(pos, PROJECTILE_SPRITE_W_PX, PROJECTILE_SPRITE_H_PX)
            .intersects(cull_rect)
        {
            continue;
        }
        out.push(RenderCandidate {
            id: projectile.id,
            category: RenderCategory::Projectile,
            plane: RenderPlane::Air,
            pos,
            sort_y: pos.y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: (0.0, 0.0),
        });
    }

    for deco in store.decorations() {
        let pos = deco.pos;
        if !pos.is_finite() {
            log::warn!("skipping decoration {} with malformed position {pos:?}", deco.id);
            continue;
        }
        if !anchored_extent(pos, DECORATION_SPRITE_W_PX, DECORATION_SPRITE_H_PX)
            .intersects(cull_rect)
        {
            continue;
        }

        // Grass that ends up under water is sunk, not drawn.
        if deco.kind == DecorationKind::Grass {
            if let Some(info) = tiles.tile_at(pos.tile()) {
                if info.kind.is_water() {
                    continue;
                }
            }
        }

        let plane = if deco.kind == DecorationKind::Cloud {
            RenderPlane::Air
        } else {
            RenderPlane::Ground
        };
        out.push(RenderCandidate {
            id: deco.id,
            category: RenderCategory::Decoration,
            plane,
            pos,
            sort_y: pos.y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: (0.0, 0.0),
        });
    }

    out
}
