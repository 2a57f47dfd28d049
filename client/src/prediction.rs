//! Client-side prediction for the local actor.
//!
//! Input is applied to the predicted position the moment it is sampled and
//! kept in a pending queue. When the server confirms a position, everything
//! it has already seen is dropped and the still-unacknowledged remainder is
//! replayed on top of the confirmed position, so a correction only ever
//! covers the in-flight window of input.

use std::collections::VecDeque;

use tide_core::constants::{ActorFlags, INPUT_STEP_MS, PLAYER_SPEED};
use tide_core::types::{InputCommand, MoveIntent, WorldPosition};

/// Upper bound on queued inputs during a server stall. Beyond this the
/// oldest inputs are dropped; the next snapshot resynchronizes anyway.
const MAX_PENDING_INPUTS: usize = 256;

pub struct PredictionEngine {
    server_position: WorldPosition,
    predicted_position: WorldPosition,
    pending_inputs: VecDeque<InputCommand>,
    on_water: bool,
}

impl PredictionEngine {
    pub fn new(initial: WorldPosition) -> Self {
        PredictionEngine {
            server_position: initial,
            predicted_position: initial,
            pending_inputs: VecDeque::new(),
            on_water: false,
        }
    }

    pub fn predicted_position(&self) -> WorldPosition {
        self.predicted_position
    }

    pub fn server_position(&self) -> WorldPosition {
        self.server_position
    }

    pub fn pending_len(&self) -> usize {
        self.pending_inputs.len()
    }

    /// Mirrors the local actor's water flag from the latest snapshot so
    /// predicted movement uses the same speed penalty the server will.
    pub fn set_on_water(&mut self, on_water: bool) {
        self.on_water = on_water;
    }

    /// Applies one sampled input step immediately and queues it for replay.
    pub fn apply_input(&mut self, cmd: InputCommand) {
        if self.pending_inputs.len() >= MAX_PENDING_INPUTS {
            log::warn!(
                "input queue full ({MAX_PENDING_INPUTS}); dropping oldest unacknowledged input"
            );
            self.pending_inputs.pop_front();
        }
        self.predicted_position = self.integrate(self.predicted_position, &cmd.intent);
        self.pending_inputs.push_back(cmd);
    }

    /// Accepts an authoritative snapshot: rebases on the server position,
    /// discards inputs the server has already applied, and replays the rest.
    ///
    /// With nothing pending this reduces to `predicted == server`.
    pub fn reconcile(&mut self, server_position: WorldPosition, effective_ms: u64) {
        if !server_position.is_finite() {
            log::warn!("ignoring malformed local snapshot position {server_position:?}");
            return;
        }

        self.server_position = server_position;
        while let Some(front) = self.pending_inputs.front() {
            if front.timestamp_ms <= effective_ms {
                self.pending_inputs.pop_front();
            } else {
                break;
            }
        }

        let mut replayed = server_position;
        for cmd in &self.pending_inputs {
            replayed = Self::integrate_with(replayed, &cmd.intent, self.on_water);
        }
        self.predicted_position = replayed;
    }

    /// Drops all pending input and snaps to the server position. Used when
    /// the session resets (death, teleport).
    pub fn reset(&mut self, position: WorldPosition) {
        self.server_position = position;
        self.predicted_position = position;
        self.pending_inputs.clear();
    }

    fn integrate(&self, from: WorldPosition, intent: &MoveIntent) -> WorldPosition {
        Self::integrate_with(from, intent, self.on_water)
    }

    /// One input step of movement: fixed step length, diagonal normalized,
    /// speed scaled exactly the way the server scales it.
    fn integrate_with(from: WorldPosition, intent: &MoveIntent, on_water: bool) -> WorldPosition {
        if intent.is_idle() {
            return from;
        }

        let mut flags = ActorFlags::empty();
        flags.set(ActorFlags::SPRINTING, intent.sprinting);
        flags.set(ActorFlags::CROUCHING, intent.crouching);
        flags.set(ActorFlags::ON_WATER, on_water);

        let speed = PLAYER_SPEED * flags.speed_multiplier();
        let step_s = INPUT_STEP_MS as f64 / 1_000.0;

        let (dx, dy) = (intent.dx as f64, intent.dy as f64);
        let len = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = (dx / len, dy / len);

        WorldPosition {
            x: from.x + nx * speed * step_s,
            y: from.y + ny * speed * step_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_right(t: u64) -> InputCommand {
        InputCommand {
            intent: MoveIntent {
                dx: 1,
                dy: 0,
                sprinting: false,
                crouching: false,
            },
            timestamp_ms: t,
        }
    }

    #[test]
    fn input_moves_the_predicted_position_immediately() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        engine.apply_input(step_right(100));
        // 200 px/s over one 50 ms step.
        assert_eq!(engine.predicted_position(), WorldPosition::new(10.0, 0.0));
        assert_eq!(engine.server_position(), WorldPosition::new(0.0, 0.0));
    }

    #[test]
    fn reconcile_with_nothing_pending_is_idempotent() {
        let mut engine = PredictionEngine::new(WorldPosition::new(5.0, 5.0));
        engine.reconcile(WorldPosition::new(8.0, 8.0), 1_000);
        assert_eq!(engine.predicted_position(), WorldPosition::new(8.0, 8.0));
        assert_eq!(engine.pending_len(), 0);
    }

    #[test]
    fn partial_ack_replays_the_unacknowledged_tail_without_a_snap() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        engine.apply_input(step_right(100));
        engine.apply_input(step_right(150));
        assert_eq!(engine.predicted_position(), WorldPosition::new(20.0, 0.0));

        // Server confirms the first input only.
        engine.reconcile(WorldPosition::new(10.0, 0.0), 100);
        assert_eq!(engine.pending_len(), 1);
        assert_eq!(engine.predicted_position(), WorldPosition::new(20.0, 0.0));

        // Then the second.
        engine.reconcile(WorldPosition::new(20.0, 0.0), 150);
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(engine.predicted_position(), WorldPosition::new(20.0, 0.0));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        engine.apply_input(InputCommand {
            intent: MoveIntent {
                dx: 1,
                dy: 1,
                sprinting: false,
                crouching: false,
            },
            timestamp_ms: 100,
        });
        let pos = engine.predicted_position();
        let expected = 10.0 / 2.0_f64.sqrt();
        assert!((pos.x - expected).abs() < 1e-9);
        assert!((pos.y - expected).abs() < 1e-9);
    }

    #[test]
    fn sprint_and_water_scale_the_step() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        engine.set_on_water(true);
        engine.apply_input(InputCommand {
            intent: MoveIntent {
                dx: 1,
                dy: 0,
                sprinting: true,
                crouching: false,
            },
            timestamp_ms: 100,
        });
        // Sprint doubles, water halves: net one plain step.
        assert_eq!(engine.predicted_position(), WorldPosition::new(10.0, 0.0));
    }

    #[test]
    fn malformed_snapshot_is_ignored() {
        let mut engine = PredictionEngine::new(WorldPosition::new(3.0, 4.0));
        engine.reconcile(WorldPosition::new(f64::NAN, 0.0), 500);
        assert_eq!(engine.predicted_position(), WorldPosition::new(3.0, 4.0));
        assert_eq!(engine.server_position(), WorldPosition::new(3.0, 4.0));
    }

    #[test]
    fn queue_is_bounded_under_a_server_stall() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        for i in 0..(MAX_PENDING_INPUTS as u64 + 50) {
            engine.apply_input(step_right(i * 50));
        }
        assert_eq!(engine.pending_len(), MAX_PENDING_INPUTS);
    }

    #[test]
    fn reset_drops_everything() {
        let mut engine = PredictionEngine::new(WorldPosition::new(0.0, 0.0));
        engine.apply_input(step_right(100));
        engine.reset(WorldPosition::new(500.0, 500.0));
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(engine.predicted_position(), WorldPosition::new(500.0, 500.0));
    }
}
