//! Entity store adapter.
//!
//! Wraps the per-category collections streamed by the server behind one
//! read interface for the frame pipeline. The store is only ever mutated by
//! the frame thread while draining the network hand-off channel, so a frame
//! always observes a single store generation.
//!
//! Collections are `BTreeMap`s so iteration order is stable across frames
//! for identical state - the candidate list depends on it for determinism.

use std::collections::BTreeMap;

use tide_core::types::{
    AnimalEntity, DecorationEntity, DroppedItemEntity, Entity, EntityId, PlayerEntity,
    ProjectileEntity, ResourceEntity, StructureEntity, WorldPosition,
};

#[derive(Default)]
pub struct EntityStore {
    players: BTreeMap<EntityId, PlayerEntity>,
    animals: BTreeMap<EntityId, AnimalEntity>,
    structures: BTreeMap<EntityId, StructureEntity>,
    resources: BTreeMap<EntityId, ResourceEntity>,
    dropped_items: BTreeMap<EntityId, DroppedItemEntity>,
    projectiles: BTreeMap<EntityId, ProjectileEntity>,
    decorations: BTreeMap<EntityId, DecorationEntity>,

    generation: u64,
    dirty: bool,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore::default()
    }

    /// Inserts or updates an entity. An id that changed category since its
    /// last snapshot is migrated, not duplicated.
    pub fn upsert(&mut self, entity: Entity) {
        let id = entity.id();
        self.remove_from_other_categories(id, &entity);
        match entity {
            Entity::Player(e) => {
                self.players.insert(id, e);
            }
            Entity::Animal(e) => {
                self.animals.insert(id, e);
            }
            Entity::Structure(e) => {
                self.structures.insert(id, e);
            }
            Entity::Resource(e) => {
                self.resources.insert(id, e);
            }
            Entity::DroppedItem(e) => {
                self.dropped_items.insert(id, e);
            }
            Entity::Projectile(e) => {
                self.projectiles.insert(id, e);
            }
            Entity::Decoration(e) => {
                self.decorations.insert(id, e);
            }
        }
        self.dirty = true;
    }

    /// Removes an id wherever it lives. Returns `true` if anything was
    /// actually removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let removed = self.players.remove(&id).is_some()
            | self.animals.remove(&id).is_some()
            | self.structures.remove(&id).is_some()
            | self.resources.remove(&id).is_some()
            | self.dropped_items.remove(&id).is_some()
            | self.projectiles.remove(&id).is_some()
            | self.decorations.remove(&id).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    fn remove_from_other_categories(&mut self, id: EntityId, incoming: &Entity) {
        if !matches!(incoming, Entity::Player(_)) {
            self.players.remove(&id);
        }
        if !matches!(incoming, Entity::Animal(_)) {
            self.animals.remove(&id);
        }
        if !matches!(incoming, Entity::Structure(_)) {
            self.structures.remove(&id);
        }
        if !matches!(incoming, Entity::Resource(_)) {
            self.resources.remove(&id);
        }
        if !matches!(incoming, Entity::DroppedItem(_)) {
            self.dropped_items.remove(&id);
        }
        if !matches!(incoming, Entity::Projectile(_)) {
            self.projectiles.remove(&id);
        }
        if !matches!(incoming, Entity::Decoration(_)) {
            self.decorations.remove(&id);
        }
    }

    /// Marks the end of one network drain. The generation only advances when
    /// something actually changed, so callers can memoize on it.
    pub fn commit_generation(&mut self) -> u64 {
        if self.dirty {
            self.generation += 1;
            self.dirty = false;
        }
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.players.len()
            + self.animals.len()
            + self.structures.len()
            + self.resources.len()
            + self.dropped_items.len()
            + self.projectiles.len()
            + self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.players.contains_key(&id)
            || self.animals.contains_key(&id)
            || self.structures.contains_key(&id)
            || self.resources.contains_key(&id)
            || self.dropped_items.contains_key(&id)
            || self.projectiles.contains_key(&id)
            || self.decorations.contains_key(&id)
    }

    /// Raw store position of an id, the fallback when interpolation has
    /// nothing better.
    pub fn position_of(&self, id: EntityId) -> Option<WorldPosition> {
        if let Some(e) = self.players.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.animals.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.structures.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.resources.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.dropped_items.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.projectiles.get(&id) {
            return Some(e.pos);
        }
        if let Some(e) = self.decorations.get(&id) {
            return Some(e.pos);
        }
        None
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerEntity> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerEntity> {
        self.players.values()
    }

    pub fn animals(&self) -> impl Iterator<Item = &AnimalEntity> {
        self.animals.values()
    }

    pub fn structures(&self) -> impl Iterator<Item = &StructureEntity> {
        self.structures.values()
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceEntity> {
        self.resources.values()
    }

    pub fn dropped_items(&self) -> impl Iterator<Item = &DroppedItemEntity> {
        self.dropped_items.values()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &ProjectileEntity> {
        self.projectiles.values()
    }

    pub fn decorations(&self) -> impl Iterator<Item = &DecorationEntity> {
        self.decorations.values()
    }

    /// Drops everything. Used at session teardown.
    pub fn clear(&mut self) {
        self.players.clear();
        self.animals.clear();
        self.structures.clear();
        self.resources.clear();
        self.dropped_items.clear();
        self.projectiles.clear();
        self.decorations.clear();
        self.dirty = true;
    }
}
