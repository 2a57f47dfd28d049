//! Frame driver.
//!
//! Once per display refresh the driver runs the whole pipeline:
//! `Idle -> Advancing -> Culling -> Sorting -> Ready -> Idle`. Advancing is
//! the only place network state crosses into the frame thread - the store
//! event channel is drained there, so every later stage reads one
//! consistent store generation. A frame always completes; per-entity
//! failures were already isolated upstream.

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tide_core::types::{
    decode_chunk_payload, Entity, EntityId, InputCommand, StoreEvent, TileCoord, WorldPosition,
};

use crate::classify::{build_candidates, RenderCandidate};
use crate::config::RenderConfig;
use crate::interpolation::RemoteInterpolator;
use crate::prediction::PredictionEngine;
use crate::store::EntityStore;
use crate::tile_cache::{TerrainWindow, TileCache, TileInfo};
use crate::viewport::Viewport;
use crate::visual_fx::VisualFxTable;
use crate::ysort::composite;

/// Pipeline stage, advanced once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Advancing,
    Culling,
    Sorting,
    Ready,
}

/// One completed frame, handed to the drawing collaborator.
#[derive(Clone, Debug)]
pub struct Frame {
    pub candidates: Vec<RenderCandidate>,
    pub viewport: Viewport,
    pub store_generation: u64,
    pub now_ms: u64,
}

pub struct FrameDriver {
    config: RenderConfig,
    local_id: EntityId,

    store: EntityStore,
    events: Receiver<StoreEvent>,
    inputs: VecDeque<InputCommand>,

    prediction: PredictionEngine,
    interp: RemoteInterpolator,
    viewport: Viewport,
    tiles: TileCache,
    terrain: TerrainWindow,
    fx: VisualFxTable,

    phase: FramePhase,
    in_tick: bool,
    torn_down: bool,
    dropped_ticks: u64,
}

impl FrameDriver {
    pub fn new(
        config: RenderConfig,
        local_id: EntityId,
        screen_width: f64,
        screen_height: f64,
        events: Receiver<StoreEvent>,
    ) -> Self {
        let interp = RemoteInterpolator::new(&config);
        FrameDriver {
            config,
            local_id,
            store: EntityStore::new(),
            events,
            inputs: VecDeque::new(),
            prediction: PredictionEngine::new(WorldPosition::default()),
            interp,
            viewport: Viewport::new(screen_width, screen_height),
            tiles: TileCache::new(),
            terrain: TerrainWindow::new(),
            fx: VisualFxTable::new(),
            phase: FramePhase::Idle,
            in_tick: false,
            torn_down: false,
            dropped_ticks: 0,
        }
    }

    /// Creates the single-writer/single-reader hand-off channel the network
    /// thread feeds.
    pub fn channel() -> (Sender<StoreEvent>, Receiver<StoreEvent>) {
        mpsc::channel()
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn prediction(&self) -> &PredictionEngine {
        &self.prediction
    }

    /// The memoized tile window of the latest frame.
    pub fn terrain(&self) -> &BTreeMap<TileCoord, TileInfo> {
        self.terrain.tiles()
    }

    /// Hit-shake hook for the (external) combat event consumer.
    pub fn visual_fx_mut(&mut self) -> &mut VisualFxTable {
        &mut self.fx
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Queues one sampled input step from the host's input handler.
    pub fn push_input(&mut self, cmd: InputCommand) {
        self.inputs.push_back(cmd);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    /// Runs one full frame. Returns `None` after teardown, or when a stale
    /// tick arrives while a frame is already mid-pipeline (dropped, never
    /// queued).
    pub fn tick(&mut self, now_ms: u64) -> Option<Frame> {
        if self.torn_down {
            return None;
        }
        if self.in_tick {
            self.dropped_ticks += 1;
            log::warn!("frame tick at {now_ms} arrived mid-pipeline; dropping it as stale");
            return None;
        }
        self.in_tick = true;

        self.phase = FramePhase::Advancing;
        self.advance(now_ms);

        self.phase = FramePhase::Culling;
        self.viewport.recenter(self.prediction.predicted_position());
        let cull_rect = self.viewport.cull_rect(self.config.cull_margin_px);
        self.terrain.refresh(
            &self.tiles,
            &self.viewport.visible_rect(),
            self.viewport.center(),
            self.config.tile_edge_buffer,
            self.config.camera_recompute_threshold_tiles,
        );
        let candidates = build_candidates(
            &self.store,
            self.local_id,
            self.prediction.predicted_position(),
            &self.interp,
            now_ms,
            &cull_rect,
            &self.tiles,
            &self.config,
            &self.fx,
        );

        self.phase = FramePhase::Sorting;
        let ordered = composite(candidates);

        self.phase = FramePhase::Ready;
        let frame = Frame {
            candidates: ordered,
            viewport: self.viewport,
            store_generation: self.store.generation(),
            now_ms,
        };

        self.phase = FramePhase::Idle;
        self.in_tick = false;
        Some(frame)
    }

    /// Stops the driver for good and releases everything it holds. No tick
    /// runs after this.
    pub fn shutdown(&mut self) {
        self.torn_down = true;
        self.phase = FramePhase::Idle;
        self.store.clear();
        self.interp.clear();
        self.tiles.clear();
        self.terrain.clear();
        self.fx.clear();
        self.inputs.clear();
    }

    /// Drains the network hand-off and the input queue; the one place the
    /// stores mutate.
    fn advance(&mut self, now_ms: u64) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply_event(event, now_ms),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::trace!("store event channel disconnected; rendering last known state");
                    break;
                }
            }
        }
        self.store.commit_generation();

        while let Some(cmd) = self.inputs.pop_front() {
            self.prediction.apply_input(cmd);
        }

        if let Some(local) = self.store.player(self.local_id) {
            self.prediction
                .set_on_water(local.flags.contains(tide_core::constants::ActorFlags::ON_WATER));
        }

        self.interp.retain_known(&self.store);
        self.fx.retain_known(&self.store);
        self.fx.prune_expired(now_ms);
    }

    fn apply_event(&mut self, event: StoreEvent, now_ms: u64) {
        match event {
            StoreEvent::EntityUpsert(entity) => {
                self.record_remote_sample(&entity, now_ms);
                self.store.upsert(entity);
            }
            StoreEvent::EntityRemove(id) => {
                self.store.remove(id);
            }
            StoreEvent::LocalSnapshot {
                position,
                effective_ms,
            } => {
                self.prediction.reconcile(position, effective_ms);
            }
            StoreEvent::ChunkUpsert(chunk) => {
                let coord = (chunk.chunk_x, chunk.chunk_y);
                if let Err(e) = self.tiles.upsert_chunk(chunk) {
                    log::warn!("rejecting malformed chunk {coord:?}: {e}");
                }
            }
            StoreEvent::ChunkPayload(payload) => match decode_chunk_payload(&payload) {
                Ok(chunk) => {
                    let coord = (chunk.chunk_x, chunk.chunk_y);
                    if let Err(e) = self.tiles.upsert_chunk(chunk) {
                        log::warn!("rejecting malformed chunk {coord:?}: {e}");
                    }
                }
                Err(e) => log::error!("undecodable chunk payload dropped: {e}"),
            },
            StoreEvent::ChunkRemove { chunk_x, chunk_y } => {
                self.tiles.remove_chunk(chunk_x, chunk_y);
            }
        }
    }

    /// Remote players and animals feed the interpolation buffers; the local
    /// actor is predicted instead and never interpolated.
    fn record_remote_sample(&mut self, entity: &Entity, now_ms: u64) {
        match entity {
            Entity::Player(p) if p.id != self.local_id => {
                self.interp.record_sample(p.id, p.pos, now_ms);
            }
            Entity::Animal(a) => {
                self.interp.record_sample(a.id, a.pos, now_ms);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tide_core::constants::ActorFlags;
    use tide_core::types::{Direction, MoveIntent, PlayerEntity};

    fn local_player(id: EntityId, x: f64, y: f64) -> StoreEvent {
        StoreEvent::EntityUpsert(Entity::Player(PlayerEntity {
            id,
            pos: WorldPosition::new(x, y),
            username: "local".to_string(),
            health: 100.0,
            direction: Direction::Down,
            flags: ActorFlags::empty(),
        }))
    }

    fn driver_with_channel() -> (FrameDriver, Sender<StoreEvent>) {
        let (tx, rx) = FrameDriver::channel();
        let driver = FrameDriver::new(RenderConfig::default(), 1, 800.0, 600.0, rx);
        (driver, tx)
    }

    #[test]
    fn tick_runs_the_full_pipeline_and_returns_to_idle() {
        let (mut driver, tx) = driver_with_channel();
        tx.send(local_player(1, 1000.0, 1000.0)).unwrap();
        tx.send(StoreEvent::LocalSnapshot {
            position: WorldPosition::new(1000.0, 1000.0),
            effective_ms: 0,
        })
        .unwrap();

        let frame = driver.tick(16).unwrap();
        assert_eq!(driver.phase(), FramePhase::Idle);
        assert_eq!(frame.candidates.len(), 1);
        assert_eq!(frame.viewport.center(), WorldPosition::new(1000.0, 1000.0));
    }

    #[test]
    fn frame_reads_one_store_generation() {
        let (mut driver, tx) = driver_with_channel();
        tx.send(local_player(1, 0.0, 0.0)).unwrap();
        let first = driver.tick(16).unwrap();

        tx.send(local_player(2, 10.0, 10.0)).unwrap();
        tx.send(local_player(3, 20.0, 20.0)).unwrap();
        let second = driver.tick(32).unwrap();

        assert_eq!(first.store_generation + 1, second.store_generation);
        assert_eq!(second.candidates.len(), 3);
    }

    #[test]
    fn input_moves_the_camera_before_the_server_answers() {
        let (mut driver, tx) = driver_with_channel();
        tx.send(StoreEvent::LocalSnapshot {
            position: WorldPosition::new(0.0, 0.0),
            effective_ms: 0,
        })
        .unwrap();
        driver.tick(16);

        driver.push_input(InputCommand {
            intent: MoveIntent {
                dx: 1,
                dy: 0,
                sprinting: false,
                crouching: false,
            },
            timestamp_ms: 20,
        });
        let frame = driver.tick(32).unwrap();
        assert_eq!(frame.viewport.center(), WorldPosition::new(10.0, 0.0));
    }

    #[test]
    fn teardown_stops_ticks_and_releases_state() {
        let (mut driver, tx) = driver_with_channel();
        tx.send(local_player(1, 0.0, 0.0)).unwrap();
        driver.tick(16);

        driver.shutdown();
        assert!(driver.tick(32).is_none());
        assert!(driver.store().is_empty());
        assert!(driver.terrain().is_empty());
    }

    #[test]
    fn events_arriving_mid_session_do_not_block_the_frame() {
        let (mut driver, tx) = driver_with_channel();
        drop(tx);
        // Channel disconnected: the driver still renders the empty world.
        let frame = driver.tick(16).unwrap();
        assert!(frame.candidates.is_empty());
    }
}
