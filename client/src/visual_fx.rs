//! Transient per-entity visual effects.
//!
//! Client-only state (hit shakes) lives in a side table keyed by entity id,
//! never on the entities themselves, and is evicted the moment an id leaves
//! the store. Offsets produced here are draw-time only - they never feed
//! the depth sort.

use std::collections::BTreeMap;

use rand::Rng;

use tide_core::types::EntityId;

use crate::store::EntityStore;

#[derive(Clone, Copy, Debug)]
struct ShakeFx {
    started_at_ms: u64,
    duration_ms: u64,
    amplitude_px: f32,
}

#[derive(Default)]
pub struct VisualFxTable {
    shakes: BTreeMap<EntityId, ShakeFx>,
}

impl VisualFxTable {
    pub fn new() -> Self {
        VisualFxTable::default()
    }

    pub fn len(&self) -> usize {
        self.shakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shakes.is_empty()
    }

    /// Starts (or restarts) a hit shake on an entity.
    pub fn trigger_shake(&mut self, id: EntityId, now_ms: u64, duration_ms: u64, amplitude_px: f32) {
        self.shakes.insert(
            id,
            ShakeFx {
                started_at_ms: now_ms,
                duration_ms,
                amplitude_px,
            },
        );
    }

    /// Draw-time jitter for an entity: random within the shake amplitude,
    /// decaying linearly over the shake's duration. Zero when no shake is
    /// active.
    pub fn offset(&self, id: EntityId, now_ms: u64) -> (f32, f32) {
        let Some(fx) = self.shakes.get(&id) else {
            return (0.0, 0.0);
        };

        let elapsed = now_ms.saturating_sub(fx.started_at_ms);
        if elapsed >= fx.duration_ms {
            return (0.0, 0.0);
        }

        let remaining = 1.0 - (elapsed as f32 / fx.duration_ms as f32);
        let reach = fx.amplitude_px * remaining;
        let mut rng = rand::thread_rng();
        (
            rng.gen_range(-reach..=reach),
            rng.gen_range(-reach..=reach),
        )
    }

    /// Drops shakes that have run out.
    pub fn prune_expired(&mut self, now_ms: u64) {
        self.shakes
            .retain(|_, fx| now_ms.saturating_sub(fx.started_at_ms) < fx.duration_ms);
    }

    /// Drops shakes for ids no longer present in the store.
    pub fn retain_known(&mut self, store: &EntityStore) {
        self.shakes.retain(|id, _| store.contains(*id));
    }

    pub fn clear(&mut self) {
        self.shakes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_shake_means_no_offset() {
        let fx = VisualFxTable::new();
        assert_eq!(fx.offset(1, 1_000), (0.0, 0.0));
    }

    #[test]
    fn offset_stays_within_the_decaying_amplitude() {
        let mut fx = VisualFxTable::new();
        fx.trigger_shake(1, 1_000, 400, 8.0);

        // Halfway through, the reach has decayed to half the amplitude.
        for _ in 0..50 {
            let (dx, dy) = fx.offset(1, 1_200);
            assert!(dx.abs() <= 4.0);
            assert!(dy.abs() <= 4.0);
        }
    }

    #[test]
    fn expired_shake_is_silent_and_prunable() {
        let mut fx = VisualFxTable::new();
        fx.trigger_shake(1, 1_000, 400, 8.0);
        assert_eq!(fx.offset(1, 2_000), (0.0, 0.0));

        fx.prune_expired(2_000);
        assert!(fx.is_empty());
    }

    #[test]
    fn eviction_follows_the_store() {
        let mut fx = VisualFxTable::new();
        fx.trigger_shake(9, 1_000, 400, 8.0);

        let store = EntityStore::new();
        fx.retain_known(&store);
        assert!(fx.is_empty());
    }
}
