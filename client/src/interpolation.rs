//! Interpolation of remote actors (other players and animals).
//!
//! There is no access to remote input, so remote motion is reconstructed
//! from the snapshot history instead: render slightly in the past and slide
//! between the two samples bracketing the render time. Past the newest
//! sample, extrapolate linearly for a bounded window and then hold.

use std::collections::BTreeMap;

use tide_core::sample_ring::{PositionSample, SampleRing};
use tide_core::types::{EntityId, WorldPosition};

use crate::config::RenderConfig;
use crate::store::EntityStore;

pub struct RemoteInterpolator {
    buffers: BTreeMap<EntityId, SampleRing>,
    render_delay_ms: u64,
    extrapolation_clamp_ms: u64,
    capacity: usize,
}

impl RemoteInterpolator {
    pub fn new(config: &RenderConfig) -> Self {
        RemoteInterpolator {
            buffers: BTreeMap::new(),
            render_delay_ms: config.render_delay_ms,
            extrapolation_clamp_ms: config.extrapolation_clamp_ms,
            capacity: config.interp_buffer_capacity.max(1),
        }
    }

    /// Number of actors currently tracked.
    pub fn tracked(&self) -> usize {
        self.buffers.len()
    }

    /// Records one snapshot position for an actor, creating its buffer on
    /// first sighting. Malformed positions leave the buffer untouched.
    pub fn record_sample(&mut self, id: EntityId, pos: WorldPosition, received_at_ms: u64) {
        if !pos.is_finite() {
            log::warn!("skipping malformed snapshot position for actor {id}: {pos:?}");
            return;
        }
        let ring = self
            .buffers
            .entry(id)
            .or_insert_with(|| SampleRing::new(self.capacity));
        if !ring.push(PositionSample {
            pos,
            received_at_ms,
        }) {
            log::debug!("dropping out-of-order sample for actor {id} at {received_at_ms}");
        }
    }

    /// Render-time position of an actor: the buffer sampled at
    /// `now - render_delay`, linearly interpolated. `None` means the buffer
    /// is empty (starved) and the caller should fall back to the raw store
    /// position.
    pub fn sample(&self, id: EntityId, now_ms: u64) -> Option<WorldPosition> {
        let ring = self.buffers.get(&id)?;
        let target = now_ms.saturating_sub(self.render_delay_ms);

        match ring.bracket(target) {
            (Some(before), Some(after)) => {
                let span = after.received_at_ms - before.received_at_ms;
                if span == 0 {
                    return Some(before.pos);
                }
                let t = (target - before.received_at_ms) as f64 / span as f64;
                Some(before.pos.lerp(after.pos, t))
            }
            // Render time is older than everything held: hold the oldest.
            (None, Some(after)) => Some(after.pos),
            // Render time is past the newest sample: extrapolate, bounded.
            (Some(newest), None) => Some(self.extrapolate(ring, newest, target)),
            (None, None) => None,
        }
    }

    fn extrapolate(
        &self,
        ring: &SampleRing,
        newest: &PositionSample,
        target: u64,
    ) -> WorldPosition {
        let mut prev: Option<&PositionSample> = None;
        for sample in ring.iter() {
            if sample.received_at_ms < newest.received_at_ms {
                prev = Some(sample);
            }
        }
        let Some(prev) = prev else {
            return newest.pos;
        };

        let span = newest.received_at_ms - prev.received_at_ms;
        if span == 0 {
            return newest.pos;
        }

        let ahead = (target - newest.received_at_ms).min(self.extrapolation_clamp_ms);
        let t = 1.0 + ahead as f64 / span as f64;
        prev.pos.lerp(newest.pos, t)
    }

    /// Drops buffers for actors no longer present in the store.
    pub fn retain_known(&mut self, store: &EntityStore) {
        self.buffers.retain(|id, _| store.contains(*id));
    }

    /// Releases every buffer. Session teardown.
    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
