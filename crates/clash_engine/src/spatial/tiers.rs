//! Radius tiers
//!
//! A probe's query reach grows with the largest radius it may meet. A few
//! very large entities would otherwise widen every query and coarsen the
//! grid until the scan is quadratic again. Indexed entities are therefore
//! split by radius into a few tiers. Each tier is indexed on its own and
//! queried with its own largest radius.

use super::{build_index, IndexStats, NeighborIndex};
use crate::config::IndexKind;
use crate::types::EntitySet;

/// Quantile of the remaining radii taken as a tier's typical radius.
const TIER_QUANTILE: f64 = 0.9;

/// Radii above this multiple of the typical radius move to the next tier.
const TIER_SPREAD: f64 = 2.0;

/// The last tier takes every remaining entity.
const MAX_TIERS: usize = 4;

/// Splits `set` into tiers of insertion indices, smallest radii first.
///
/// Indices inside a tier are ascending. An empty set has no tiers.
pub fn radius_tiers(set: &EntitySet) -> Vec<Vec<usize>> {
    let entities = set.entities();
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by(|&i, &j| entities[i].radius.total_cmp(&entities[j].radius).then(i.cmp(&j)));

    let mut tiers = Vec::new();
    let mut rest = order.as_slice();
    while !rest.is_empty() {
        let split = if tiers.len() + 1 == MAX_TIERS {
            rest.len()
        } else {
            let typical = entities[rest[((rest.len() - 1) as f64 * TIER_QUANTILE) as usize]].radius;
            let limit = typical * TIER_SPREAD;
            rest.partition_point(|&i| entities[i].radius <= limit)
        };

        let mut tier = rest[..split].to_vec();
        tier.sort_unstable();
        tiers.push(tier);
        rest = &rest[split..];
    }
    tiers
}

/// Largest radius of the first tier: the radius most entities stay under.
pub fn bulk_radius(set: &EntitySet) -> f64 {
    radius_tiers(set)
        .first()
        .map(|tier| max_radius_of(set, tier))
        .unwrap_or(0.0)
}

fn max_radius_of(set: &EntitySet, members: &[usize]) -> f64 {
    let entities = set.entities();
    members.iter().map(|&i| entities[i].radius).fold(0.0, f64::max)
}

/// One radius tier and its index.
pub struct RadiusTier {
    max_radius: f64,
    index: Box<dyn NeighborIndex>,
}

impl RadiusTier {
    /// Largest radius held by this tier.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Index over this tier's entities.
    pub fn index(&self) -> &dyn NeighborIndex {
        self.index.as_ref()
    }
}

/// Per-tier indexes over one entity set.
pub struct TieredIndex {
    kind: IndexKind,
    tiers: Vec<RadiusTier>,
}

impl TieredIndex {
    /// Builds one `kind` index per radius tier of `set`.
    ///
    /// `reach_for(max_radius)` is the query half-width a tier's grid is
    /// sized for. Wider queries remain correct, only slower.
    pub fn build(kind: IndexKind, set: &EntitySet, reach_for: impl Fn(f64) -> f64) -> Self {
        let entities = set.entities();
        let tiers = radius_tiers(set)
            .into_iter()
            .map(|members| {
                let max_radius = max_radius_of(set, &members);
                let index = build_index(kind, members.iter().map(move |&i| &entities[i]), reach_for(max_radius));
                RadiusTier { max_radius, index }
            })
            .collect();

        Self { kind, tiers }
    }

    /// Tiers in ascending radius order.
    pub fn tiers(&self) -> &[RadiusTier] {
        &self.tiers
    }

    /// Combined statistics; `cell_size` is that of the first tier.
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            kind: self.kind,
            ..IndexStats::default()
        };
        for (i, tier) in self.tiers.iter().enumerate() {
            let tier_stats = tier.index.stats();
            stats.entities += tier_stats.entities;
            stats.buckets += tier_stats.buckets;
            if i == 0 {
                stats.cell_size = tier_stats.cell_size;
            }
        }
        stats
    }
}
