//! Data types module - the shared world model streamed from the server.

pub mod chunk;
pub mod entity;
pub mod event;
pub mod position;

// Re-export all types
pub use chunk::{
    decode_chunk_payload, encode_chunk_payload, ChunkDecodeError, TileChunk, TileType,
};
pub use entity::{
    AnimalEntity, AnimalSpecies, DecorationEntity, DecorationKind, Direction, DroppedItemEntity,
    Entity, EntityId, PlayerEntity, ProjectileEntity, RenderCategory, ResourceEntity, ResourceKind,
    StructureEntity, StructureKind,
};
pub use event::{InputCommand, MoveIntent, StoreEvent};
pub use position::{TileCoord, WorldPosition, WorldRect};
