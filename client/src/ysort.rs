//! Depth compositor.
//!
//! Produces the single strict back-to-front order the drawing collaborator
//! consumes. The comparator is a lexicographic chain - render plane, the
//! category-pair override for co-anchored candidates, the effective sort
//! key, then deterministic tie-breaks - which keeps it a strict weak
//! ordering by construction. The tall-sprite special case is already folded
//! into each candidate's `sort_y` at classification time.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tide_core::types::RenderCategory;

use crate::classify::{RenderCandidate, SpriteSlice, Submersion};

/// Directional overrides between co-anchored candidates (equal sort key).
/// `Less` means the first category draws behind the second. A dropped item
/// sitting on a structure always draws on top of it.
fn pair_override(a: RenderCategory, b: RenderCategory) -> Option<Ordering> {
    match (a, b) {
        (RenderCategory::Structure, RenderCategory::DroppedItem) => Some(Ordering::Less),
        (RenderCategory::DroppedItem, RenderCategory::Structure) => Some(Ordering::Greater),
        _ => None,
    }
}

/// Fixed fallback rank so ties at one depth resolve the same way every
/// frame.
fn category_rank(category: RenderCategory) -> u8 {
    match category {
        RenderCategory::Decoration => 0,
        RenderCategory::Structure => 1,
        RenderCategory::Resource => 2,
        RenderCategory::DroppedItem => 3,
        RenderCategory::Animal => 4,
        RenderCategory::Player => 5,
        RenderCategory::Projectile => 6,
    }
}

fn slice_rank(slice: SpriteSlice) -> u8 {
    match slice {
        SpriteSlice::Bottom => 0,
        SpriteSlice::Whole => 1,
        SpriteSlice::Top => 2,
    }
}

/// The depth comparator. `Less` draws first (further back).
pub fn depth_cmp(a: &RenderCandidate, b: &RenderCandidate) -> Ordering {
    // Airborne entities draw above every grounded one, whatever their Y.
    let plane = a.plane.cmp(&b.plane);
    if plane != Ordering::Equal {
        return plane;
    }

    // Overrides win before any numeric comparison.
    if a.sort_y == b.sort_y {
        if let Some(ord) = pair_override(a.category, b.category) {
            return ord;
        }
    }

    a.sort_y
        .total_cmp(&b.sort_y)
        .then_with(|| category_rank(a.category).cmp(&category_rank(b.category)))
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| slice_rank(a.slice).cmp(&slice_rank(b.slice)))
}

/// Splits a partially submerged actor into its below-waterline and
/// above-waterline slices. Both share the original sort key so they
/// interleave with neighbors at the same depth, while the ambient water
/// overlay pass is drawn between the two.
fn split_submerged(candidates: Vec<RenderCandidate>) -> Vec<RenderCandidate> {
    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.submersion == Submersion::Partial {
            let mut bottom = candidate.clone();
            bottom.slice = SpriteSlice::Bottom;
            let mut top = candidate;
            top.slice = SpriteSlice::Top;
            out.push(bottom);
            out.push(top);
        } else {
            out.push(candidate);
        }
    }
    out
}

/// Orders the candidate list for drawing.
///
/// Duplicate ids are a caller bug; the first occurrence wins and the rest
/// are dropped. An empty input is a valid frame.
pub fn composite(candidates: Vec<RenderCandidate>) -> Vec<RenderCandidate> {
    let mut seen: BTreeSet<u64> = BTreeSet::new();
    let mut deduped = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(candidate.id) {
            deduped.push(candidate);
        } else {
            log::warn!("duplicate candidate id {} dropped before sort", candidate.id);
        }
    }

    let mut out = split_submerged(deduped);
    out.sort_by(depth_cmp);

    #[cfg(debug_assertions)]
    for window in out.windows(2) {
        debug_assert!(
            depth_cmp(&window[0], &window[1]) != Ordering::Greater,
            "depth comparator produced an inconsistent order"
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RenderPlane;
    use tide_core::types::{EntityId, WorldPosition};

    fn candidate(id: EntityId, category: RenderCategory, sort_y: f64) -> RenderCandidate {
        RenderCandidate {
            id,
            category,
            plane: RenderPlane::Ground,
            pos: WorldPosition::new(0.0, sort_y),
            sort_y,
            slice: SpriteSlice::Whole,
            submersion: Submersion::Dry,
            jitter: (0.0, 0.0),
        }
    }

    fn airborne(id: EntityId, sort_y: f64) -> RenderCandidate {
        let mut c = candidate(id, RenderCategory::Projectile, sort_y);
        c.plane = RenderPlane::Air;
        c
    }

    fn submerged(id: EntityId, sort_y: f64) -> RenderCandidate {
        let mut c = candidate(id, RenderCategory::Player, sort_y);
        c.submersion = Submersion::Partial;
        c
    }

    #[test]
    fn empty_input_is_a_valid_frame() {
        assert!(composite(Vec::new()).is_empty());
    }

    #[test]
    fn orders_back_to_front_by_sort_key() {
        let out = composite(vec![
            candidate(1, RenderCategory::Player, 300.0),
            candidate(2, RenderCategory::Player, 100.0),
            candidate(3, RenderCategory::Player, 200.0),
        ]);
        let ids: Vec<EntityId> = out.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn actor_south_of_the_visual_foot_line_draws_in_front() {
        // Structure anchored at Y=500 with a 170 px foot offset carries an
        // effective key of 330 out of classification.
        let structure = candidate(10, RenderCategory::Structure, 330.0);
        let in_front = candidate(11, RenderCategory::Player, 331.0);
        let behind = candidate(12, RenderCategory::Player, 320.0);

        let out = composite(vec![in_front.clone(), structure.clone(), behind.clone()]);
        let pos = |id: EntityId| out.iter().position(|c| c.id == id).unwrap();
        assert!(pos(12) < pos(10), "actor north of the foot line draws behind");
        assert!(pos(10) < pos(11), "actor south of the foot line draws in front");
    }

    #[test]
    fn airborne_always_draws_after_grounded() {
        let out = composite(vec![
            airborne(1, 10.0),
            candidate(2, RenderCategory::Player, 900.0),
            airborne(3, 5.0),
            candidate(4, RenderCategory::Structure, 950.0),
        ]);
        let planes: Vec<RenderPlane> = out.iter().map(|c| c.plane).collect();
        assert_eq!(
            planes,
            vec![
                RenderPlane::Ground,
                RenderPlane::Ground,
                RenderPlane::Air,
                RenderPlane::Air
            ]
        );
    }

    #[test]
    fn dropped_item_draws_above_the_structure_it_sits_on() {
        let item = candidate(5, RenderCategory::DroppedItem, 400.0);
        let structure = candidate(2, RenderCategory::Structure, 400.0);
        // Id order alone would put 2 first anyway; reverse the ids to prove
        // the pair override is doing the work.
        let item_low_id = candidate(1, RenderCategory::DroppedItem, 400.0);
        let structure_high_id = candidate(9, RenderCategory::Structure, 400.0);

        let out = composite(vec![item, structure, item_low_id, structure_high_id]);
        let pos = |id: EntityId| out.iter().position(|c| c.id == id).unwrap();
        assert!(pos(2) < pos(5));
        assert!(pos(9) < pos(1));
    }

    #[test]
    fn partially_submerged_actor_splits_into_two_slices_sharing_a_key() {
        let out = composite(vec![submerged(1, 250.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].slice, SpriteSlice::Bottom);
        assert_eq!(out[1].slice, SpriteSlice::Top);
        assert_eq!(out[0].sort_y, out[1].sort_y);
        assert_eq!(out[0].id, out[1].id);
    }

    #[test]
    fn fully_submerged_actor_stays_whole() {
        let mut snorkeler = candidate(1, RenderCategory::Player, 250.0);
        snorkeler.submersion = Submersion::Full;
        let out = composite(vec![snorkeler]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slice, SpriteSlice::Whole);
    }

    #[test]
    fn neighbors_at_the_same_depth_interleave_between_the_slices_consistently() {
        let out = composite(vec![
            submerged(2, 250.0),
            candidate(1, RenderCategory::Player, 250.0),
        ]);
        // Same key, id tie-break: whole actor 1, then both slices of 2.
        let order: Vec<(EntityId, SpriteSlice)> = out.iter().map(|c| (c.id, c.slice)).collect();
        assert_eq!(
            order,
            vec![
                (1, SpriteSlice::Whole),
                (2, SpriteSlice::Bottom),
                (2, SpriteSlice::Top)
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_dropped_keeping_the_first() {
        let out = composite(vec![
            candidate(1, RenderCategory::Player, 100.0),
            candidate(1, RenderCategory::Player, 900.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sort_y, 100.0);
    }

    #[test]
    fn comparator_is_irreflexive_and_antisymmetric() {
        let samples = vec![
            candidate(1, RenderCategory::Player, 100.0),
            candidate(2, RenderCategory::Structure, 100.0),
            candidate(3, RenderCategory::DroppedItem, 100.0),
            airborne(4, 50.0),
            submerged(5, 100.0),
        ];
        for a in &samples {
            assert_eq!(depth_cmp(a, a), Ordering::Equal);
            for b in &samples {
                assert_eq!(depth_cmp(a, b), depth_cmp(b, a).reverse());
            }
        }
    }

    #[test]
    fn comparator_is_transitive_over_override_triples() {
        // Mixed categories, equal and unequal keys, both planes - every
        // triple must chain.
        let pool = vec![
            candidate(1, RenderCategory::Player, 100.0),
            candidate(2, RenderCategory::Structure, 100.0),
            candidate(3, RenderCategory::DroppedItem, 100.0),
            candidate(4, RenderCategory::Structure, 330.0),
            candidate(5, RenderCategory::Player, 331.0),
            candidate(6, RenderCategory::Player, 320.0),
            airborne(7, 10.0),
            airborne(8, 500.0),
            candidate(9, RenderCategory::Resource, 330.0),
        ];
        for a in &pool {
            for b in &pool {
                for c in &pool {
                    if depth_cmp(a, b) != Ordering::Greater
                        && depth_cmp(b, c) != Ordering::Greater
                    {
                        assert_ne!(
                            depth_cmp(a, c),
                            Ordering::Greater,
                            "triple ({}, {}, {}) breaks transitivity",
                            a.id,
                            b.id,
                            c.id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn output_is_deterministic_for_identical_input() {
        let input = vec![
            candidate(3, RenderCategory::Player, 100.0),
            candidate(1, RenderCategory::Structure, 100.0),
            candidate(2, RenderCategory::Resource, 100.0),
        ];
        let a = composite(input.clone());
        let b = composite(input);
        assert_eq!(a, b);
    }
}
