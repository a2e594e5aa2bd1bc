//! Clash results
//!
//! [`ClashResult`] is the fixed-shape record handed back to callers and
//! [`ClashResultSequence`] the fully materialized, ordered collection of
//! them. [`build_results`] turns raw scanner output into that sequence.
//!
//! ## Ordering
//!
//! Results are sorted by ascending `dist` using the IEEE total order, ties
//! broken by the A insertion index and then the B insertion index. The
//! order is total, so identical inputs always produce identical sequences
//! regardless of scan parallelism or index backend.

use crate::config::ClashConvention;
use crate::scanner::RawPair;
use crate::types::{EntityId, EntitySet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// One reported clash between an entity of A and an entity of B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashResult {
    /// Entity from set A
    pub a: EntityId,
    /// Entity from set B
    pub b: EntityId,
    /// Euclidean distance between the two centres
    pub dist: f64,
    /// Threshold supplied by the caller
    pub threshold: f64,
    /// Largest centre distance that would still have clashed for this pair
    pub effective_threshold: f64,
    /// `dist - (r_a + r_b)`; negative when the surfaces overlap
    pub separation: f64,
}

impl ClashResult {
    /// Identifier pair `(a, b)`.
    pub fn ids(&self) -> (&EntityId, &EntityId) {
        (&self.a, &self.b)
    }

    /// Whether the two surfaces interpenetrate.
    pub fn is_overlap(&self) -> bool {
        self.separation < 0.0
    }

    fn order(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.a.index.cmp(&other.a.index))
            .then(self.b.index.cmp(&other.b.index))
    }
}

impl fmt::Display for ClashResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {} dist={}", self.a, self.b, self.dist)
    }
}

/// Ordered, fully materialized clash results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClashResultSequence {
    results: Vec<ClashResult>,
}

impl ClashResultSequence {
    /// An empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no clashes were found.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result at a position in the order.
    pub fn get(&self, index: usize) -> Option<&ClashResult> {
        self.results.get(index)
    }

    /// Iterates results in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ClashResult> {
        self.results.iter()
    }

    /// Results as a slice.
    pub fn as_slice(&self) -> &[ClashResult] {
        &self.results
    }

    /// Consumes the sequence into its vector.
    pub fn into_vec(self) -> Vec<ClashResult> {
        self.results
    }

    /// Identifier pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&EntityId, &EntityId)> + '_ {
        self.results.iter().map(ClashResult::ids)
    }

    /// Distances in order.
    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.results.iter().map(|r| r.dist)
    }
}

impl std::ops::Index<usize> for ClashResultSequence {
    type Output = ClashResult;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl<'a> IntoIterator for &'a ClashResultSequence {
    type Item = &'a ClashResult;
    type IntoIter = std::slice::Iter<'a, ClashResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for ClashResultSequence {
    type Item = ClashResult;
    type IntoIter = std::vec::IntoIter<ClashResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Roles of the two sets during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRole {
    /// A was probed against an index over B
    ProbeA,
    /// B was probed against an index over A
    ProbeB,
}

/// Materializes raw scanner output into the ordered result sequence.
///
/// Pairs are mapped back to (A, B) roles, duplicates of the same unordered
/// pair are dropped (first finding wins), and the total order is applied.
pub fn build_results(
    raw: Vec<RawPair>,
    role: ProbeRole,
    set_a: &EntitySet,
    set_b: &EntitySet,
    threshold: f64,
    convention: ClashConvention,
) -> ClashResultSequence {
    let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(raw.len());
    let mut results = Vec::with_capacity(raw.len());

    for pair in raw {
        let (ai, bi) = match role {
            ProbeRole::ProbeA => (pair.probe, pair.indexed),
            ProbeRole::ProbeB => (pair.indexed, pair.probe),
        };
        if !seen.insert((ai, bi)) {
            continue;
        }
        let (a, b) = match (set_a.get(ai), set_b.get(bi)) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };

        results.push(ClashResult {
            a: a.id.clone(),
            b: b.id.clone(),
            dist: pair.dist,
            threshold,
            effective_threshold: convention.effective_threshold(threshold, a.radius, b.radius),
            separation: pair.dist - (a.radius + b.radius),
        });
    }

    results.sort_by(ClashResult::order);
    ClashResultSequence { results }
}
