//! Entity model - the tagged union of everything the server streams to the
//! client, one variant per render category.
//!
//! Entities are created on first sighting in a snapshot, updated on every
//! subsequent one, and dropped when they disappear from the store. The
//! render core never mutates them.

use serde::{Deserialize, Serialize};

use crate::constants::ActorFlags;
use crate::types::position::WorldPosition;

/// Stable server-assigned identity, unique across all categories.
pub type EntityId = u64;

/// Facing direction of an actor sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Render category tag, fixed at classification time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderCategory {
    Player,
    Animal,
    Structure,
    Resource,
    DroppedItem,
    Projectile,
    Decoration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub username: String,
    pub health: f32,
    pub direction: Direction,
    pub flags: ActorFlags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimalSpecies {
    Hare,
    Fox,
    Crab,
    Boar,
    Crow,
    Tern,
}

impl AnimalSpecies {
    /// Birds occupy the air plane and always draw above grounded entities.
    pub fn is_airborne(self) -> bool {
        matches!(self, AnimalSpecies::Crow | AnimalSpecies::Tern)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimalEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub species: AnimalSpecies,
    pub health: f32,
    pub direction: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Campfire,
    Furnace,
    WoodenStorageBox,
    Shelter,
    SleepingBag,
    Door,
    Lantern,
    RainCollector,
}

impl StructureKind {
    /// Tall kinds have sprites that extend well above their footprint
    /// anchor and need the visual-foot offset treatment in the depth sort.
    pub fn is_tall(self) -> bool {
        matches!(
            self,
            StructureKind::Furnace | StructureKind::Shelter | StructureKind::Door
        )
    }

    /// Height of the sprite above the footprint anchor, for culling.
    pub fn visual_height_px(self) -> f64 {
        match self {
            StructureKind::Campfire => 64.0,
            StructureKind::Furnace => 192.0,
            StructureKind::WoodenStorageBox => 64.0,
            StructureKind::Shelter => 240.0,
            StructureKind::SleepingBag => 32.0,
            StructureKind::Door => 192.0,
            StructureKind::Lantern => 80.0,
            StructureKind::RainCollector => 96.0,
        }
    }

    /// Footprint width, for culling.
    pub fn visual_width_px(self) -> f64 {
        match self {
            StructureKind::Shelter => 240.0,
            StructureKind::Furnace => 144.0,
            _ => 96.0,
        }
    }

    /// Stable key used by the configuration's foot-offset table.
    pub fn key_name(self) -> &'static str {
        match self {
            StructureKind::Campfire => "campfire",
            StructureKind::Furnace => "furnace",
            StructureKind::WoodenStorageBox => "wooden_storage_box",
            StructureKind::Shelter => "shelter",
            StructureKind::SleepingBag => "sleeping_bag",
            StructureKind::Door => "door",
            StructureKind::Lantern => "lantern",
            StructureKind::RainCollector => "rain_collector",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub kind: StructureKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Tree,
    Stone,
    Coral,
    Barrel,
}

impl ResourceKind {
    pub fn is_tall(self) -> bool {
        matches!(self, ResourceKind::Tree)
    }

    pub fn visual_height_px(self) -> f64 {
        match self {
            ResourceKind::Tree => 288.0,
            ResourceKind::Stone => 96.0,
            ResourceKind::Coral => 48.0,
            ResourceKind::Barrel => 80.0,
        }
    }

    pub fn visual_width_px(self) -> f64 {
        match self {
            ResourceKind::Tree => 192.0,
            ResourceKind::Stone => 112.0,
            ResourceKind::Coral => 64.0,
            ResourceKind::Barrel => 64.0,
        }
    }

    /// Stable key used by the configuration's foot-offset table.
    pub fn key_name(self) -> &'static str {
        match self {
            ResourceKind::Tree => "tree",
            ResourceKind::Stone => "stone",
            ResourceKind::Coral => "coral",
            ResourceKind::Barrel => "barrel",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub kind: ResourceKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroppedItemEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub item_name: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub item_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Grass,
    Cloud,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationEntity {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub kind: DecorationKind,
}

/// The full entity union. Each variant keeps its own id and position so a
/// snapshot can be applied without looking anything else up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Player(PlayerEntity),
    Animal(AnimalEntity),
    Structure(StructureEntity),
    Resource(ResourceEntity),
    DroppedItem(DroppedItemEntity),
    Projectile(ProjectileEntity),
    Decoration(DecorationEntity),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Player(e) => e.id,
            Entity::Animal(e) => e.id,
            Entity::Structure(e) => e.id,
            Entity::Resource(e) => e.id,
            Entity::DroppedItem(e) => e.id,
            Entity::Projectile(e) => e.id,
            Entity::Decoration(e) => e.id,
        }
    }

    pub fn position(&self) -> WorldPosition {
        match self {
            Entity::Player(e) => e.pos,
            Entity::Animal(e) => e.pos,
            Entity::Structure(e) => e.pos,
            Entity::Resource(e) => e.pos,
            Entity::DroppedItem(e) => e.pos,
            Entity::Projectile(e) => e.pos,
            Entity::Decoration(e) => e.pos,
        }
    }

    pub fn category(&self) -> RenderCategory {
        match self {
            Entity::Player(_) => RenderCategory::Player,
            Entity::Animal(_) => RenderCategory::Animal,
            Entity::Structure(_) => RenderCategory::Structure,
            Entity::Resource(_) => RenderCategory::Resource,
            Entity::DroppedItem(_) => RenderCategory::DroppedItem,
            Entity::Projectile(_) => RenderCategory::Projectile,
            Entity::Decoration(_) => RenderCategory::Decoration,
        }
    }

    /// `true` for entities on the air plane: projectiles, birds, clouds.
    pub fn is_airborne(&self) -> bool {
        match self {
            Entity::Projectile(_) => true,
            Entity::Animal(e) => e.species.is_airborne(),
            Entity::Decoration(e) => e.kind == DecorationKind::Cloud,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: EntityId, x: f64, y: f64) -> Entity {
        Entity::Player(PlayerEntity {
            id,
            pos: WorldPosition::new(x, y),
            username: "ida".to_string(),
            health: 100.0,
            direction: Direction::Down,
            flags: ActorFlags::empty(),
        })
    }

    #[test]
    fn id_and_position_come_from_the_variant() {
        let e = player(7, 12.0, 34.0);
        assert_eq!(e.id(), 7);
        assert_eq!(e.position(), WorldPosition::new(12.0, 34.0));
        assert_eq!(e.category(), RenderCategory::Player);
    }

    #[test]
    fn birds_and_projectiles_are_airborne() {
        let crow = Entity::Animal(AnimalEntity {
            id: 1,
            pos: WorldPosition::default(),
            species: AnimalSpecies::Crow,
            health: 10.0,
            direction: Direction::Left,
        });
        let boar = Entity::Animal(AnimalEntity {
            id: 2,
            pos: WorldPosition::default(),
            species: AnimalSpecies::Boar,
            health: 60.0,
            direction: Direction::Left,
        });
        let arrow = Entity::Projectile(ProjectileEntity {
            id: 3,
            pos: WorldPosition::default(),
            item_name: "bone-arrow".to_string(),
        });
        assert!(crow.is_airborne());
        assert!(!boar.is_airborne());
        assert!(arrow.is_airborne());
        assert!(!player(4, 0.0, 0.0).is_airborne());
    }

    #[test]
    fn tall_kinds_are_flagged() {
        assert!(StructureKind::Shelter.is_tall());
        assert!(!StructureKind::Campfire.is_tall());
        assert!(ResourceKind::Tree.is_tall());
        assert!(!ResourceKind::Stone.is_tall());
    }
}
