//! Clash scanner
//!
//! Streams the probe set through a [`NeighborIndex`] built over the other
//! set and emits every cross pair that satisfies the clash predicate.
//!
//! Each probe entity queries every radius tier of the index with a reach
//! derived from its own radius, the tier's largest radius and the
//! threshold. Candidates outside the reach cube along any axis are rejected
//! before the distance is computed. The reach carries a small slack so
//! that neither the index query nor that check rejects a pair the exact
//! predicate would accept.

use crate::config::{ClashConvention, ParallelConfig};
use crate::spatial::TieredIndex;
use crate::types::{Entity, EntitySet};
use rayon::prelude::*;
use tracing::trace;

/// Relative slack added to every query reach.
const REACH_SLACK: f64 = 1e-9;

/// One raw finding, in probe/indexed roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPair {
    /// Insertion index in the probe set
    pub probe: usize,
    /// Insertion index in the indexed set
    pub indexed: usize,
    /// Euclidean distance between the two centres
    pub dist: f64,
}

/// The clash test applied to every candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClashPredicate {
    /// Distance convention
    pub convention: ClashConvention,
    /// Caller-supplied threshold (finite)
    pub threshold: f64,
    /// Skip pairs whose explicit labels are equal
    pub skip_matching_labels: bool,
}

impl ClashPredicate {
    /// Largest centre distance at which entities with these radii clash.
    pub fn horizon(&self, radius_a: f64, radius_b: f64) -> f64 {
        self.convention.effective_threshold(self.threshold, radius_a, radius_b)
    }

    /// Query half-width covering `horizon` plus rounding slack.
    ///
    /// Returns `None` when no pair with these radii can clash.
    pub fn reach(&self, radius_a: f64, radius_b: f64) -> Option<f64> {
        let horizon = self.horizon(radius_a, radius_b);
        if horizon.is_nan() || horizon < 0.0 {
            return None;
        }
        let scale = horizon + self.threshold.abs() + (radius_a + radius_b);
        Some(horizon + scale * REACH_SLACK)
    }

    fn labels_match(&self, probe: &Entity, other: &Entity) -> bool {
        self.skip_matching_labels
            && matches!((&probe.id.label, &other.id.label), (Some(a), Some(b)) if a == b)
    }
}

/// Output of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Findings in probe order, then index visit order
    pub pairs: Vec<RawPair>,
    /// Candidates handed out by the index
    pub candidates_examined: usize,
    /// Whether the scan ran on the rayon pool
    pub parallel: bool,
}

/// Scans `probe` against `index`, which must have been built over `indexed`.
pub fn scan(
    probe: &EntitySet,
    indexed: &EntitySet,
    index: &TieredIndex,
    predicate: &ClashPredicate,
    parallel: &ParallelConfig,
) -> ScanOutput {
    let use_pool = parallel.enabled
        && parallel.chunk_size > 0
        && probe.len() >= parallel.min_probe_entities
        && probe.len() > parallel.chunk_size;

    if !use_pool {
        let mut pairs = Vec::new();
        let candidates_examined: usize = probe
            .iter()
            .map(|entity| scan_probe(entity, indexed, index, predicate, &mut pairs))
            .sum();
        return ScanOutput {
            pairs,
            candidates_examined,
            parallel: false,
        };
    }

    // rayon keeps chunk order on collect, so concatenation reproduces the
    // sequential emission order.
    let chunks: Vec<(Vec<RawPair>, usize)> = probe
        .entities()
        .par_chunks(parallel.chunk_size)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            let mut pairs = Vec::new();
            let examined: usize = chunk
                .iter()
                .map(|entity| scan_probe(entity, indexed, index, predicate, &mut pairs))
                .sum();
            trace!(chunk = chunk_idx, pairs = pairs.len(), examined, "scanned probe chunk");
            (pairs, examined)
        })
        .collect();

    let mut output = ScanOutput {
        pairs: Vec::with_capacity(chunks.iter().map(|(p, _)| p.len()).sum()),
        candidates_examined: 0,
        parallel: true,
    };
    for (pairs, examined) in chunks {
        output.pairs.extend(pairs);
        output.candidates_examined += examined;
    }
    output
}

/// Scans one probe entity; returns the number of candidates examined.
fn scan_probe(
    entity: &Entity,
    indexed: &EntitySet,
    index: &TieredIndex,
    predicate: &ClashPredicate,
    out: &mut Vec<RawPair>,
) -> usize {
    let others = indexed.entities();
    let center = entity.position;
    let mut examined = 0;

    for tier in index.tiers() {
        let reach = match predicate.reach(entity.radius, tier.max_radius()) {
            Some(reach) => reach,
            None => continue,
        };

        tier.index().for_each_candidate(center, reach, &mut |j| {
            examined += 1;
            let other = &others[j];
            if predicate.labels_match(entity, other) {
                return;
            }

            let p = other.position;
            if (p.x - center.x).abs() > reach || (p.y - center.y).abs() > reach || (p.z - center.z).abs() > reach {
                return;
            }

            let dist = center.distance(p);
            if predicate
                .convention
                .is_clash(dist, predicate.threshold, entity.radius, other.radius)
            {
                out.push(RawPair {
                    probe: entity.id.index,
                    indexed: j,
                    dist,
                });
            }
        });
    }

    examined
}
