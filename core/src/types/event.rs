//! Events crossing the two ingestion boundaries of the render core: the
//! store-event channel fed by the network receive thread, and the input
//! queue fed by the host's input handler.

use serde::{Deserialize, Serialize};

use crate::types::chunk::TileChunk;
use crate::types::entity::{Entity, EntityId};
use crate::types::position::WorldPosition;

/// One change notification from the network layer. Insert and update are the
/// same operation (upsert); removal carries only the id.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    EntityUpsert(Entity),
    EntityRemove(EntityId),
    /// Authoritative snapshot of the local actor, with the server-side time
    /// up to which input has been applied.
    LocalSnapshot {
        position: WorldPosition,
        effective_ms: u64,
    },
    /// A chunk already decoded by the transport layer.
    ChunkUpsert(TileChunk),
    /// A chunk still in its compressed wire form.
    ChunkPayload(Vec<u8>),
    ChunkRemove {
        chunk_x: i32,
        chunk_y: i32,
    },
}

/// Movement intent sampled from the host's input handler. Components are
/// -1, 0, or 1 per axis; diagonals are normalized during integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub dx: i8,
    pub dy: i8,
    pub sprinting: bool,
    pub crouching: bool,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// One sampled input step. Each command covers one fixed input-sampling
/// interval ([`crate::constants::INPUT_STEP_MS`]).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    pub intent: MoveIntent,
    pub timestamp_ms: u64,
}
