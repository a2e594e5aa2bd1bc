//! Clash engine
//!
//! Ties the pipeline together: validate the threshold, parse both inputs,
//! build a spatial index over one set, scan the other set through it, and
//! build the ordered result sequence. Every call owns all of its state, so
//! one [`ClashEngine`] can serve concurrent callers.

use crate::config::{ClashConfig, IndexSide};
use crate::error::ClashError;
use crate::parser::parse;
use crate::results::{build_results, ClashResultSequence, ProbeRole};
use crate::scanner::{scan, ClashPredicate};
use crate::spatial::{bulk_radius, TieredIndex};
use crate::types::{EntitySet, SetOrigin};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Statistics for one clash run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Set that was streamed through the index (None when the scan was skipped)
    pub probe_side: Option<SetOrigin>,
    /// Entities in the probe set
    pub probe_entities: usize,
    /// Entities in the indexed set
    pub indexed_entities: usize,
    /// Occupied grid cells or tree leaves
    pub occupied_cells: usize,
    /// Grid cell edge of the first radius tier (0 for the R*-tree or a
    /// skipped scan)
    pub cell_size: f64,
    /// Radius tiers the indexed set was split into
    pub radius_tiers: usize,
    /// Candidate pairs handed out by the index
    pub candidates_examined: usize,
    /// Clashes reported after deduplication
    pub clashes_found: usize,
    /// Whether the scan ran on the rayon pool
    pub parallel: bool,
}

/// Results of a clash run plus how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct ClashReport {
    /// Ordered clash results
    pub results: ClashResultSequence,
    /// Scan statistics
    pub stats: ScanStats,
}

/// Configured clash detector.
#[derive(Debug, Clone, Default)]
pub struct ClashEngine {
    config: ClashConfig,
}

impl ClashEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: ClashConfig) -> Result<Self, ClashError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &ClashConfig {
        &self.config
    }

    /// Parses both inputs and reports every clash between them.
    pub fn detect(&self, set_a: &str, set_b: &str, threshold: f64) -> Result<ClashReport, ClashError> {
        check_threshold(threshold)?;
        let a = parse(set_a, SetOrigin::A)?;
        let b = parse(set_b, SetOrigin::B)?;
        self.detect_sets(&a, &b, threshold)
    }

    /// Reports every clash between two already parsed sets.
    pub fn detect_sets(
        &self,
        set_a: &EntitySet,
        set_b: &EntitySet,
        threshold: f64,
    ) -> Result<ClashReport, ClashError> {
        check_threshold(threshold)?;

        let predicate = ClashPredicate {
            convention: self.config.convention,
            threshold,
            skip_matching_labels: self.config.skip_matching_labels,
        };

        let mut stats = ScanStats::default();
        if set_a.is_empty() || set_b.is_empty() {
            debug!(a = set_a.len(), b = set_b.len(), "empty input set, nothing to scan");
            return Ok(ClashReport {
                results: ClashResultSequence::empty(),
                stats,
            });
        }

        let index_a = match self.config.index_side {
            IndexSide::A => true,
            IndexSide::B => false,
            IndexSide::Larger => set_a.len() > set_b.len(),
        };
        let (probe, indexed, role) = if index_a {
            (set_b, set_a, ProbeRole::ProbeB)
        } else {
            (set_a, set_b, ProbeRole::ProbeA)
        };
        stats.probe_entities = probe.len();
        stats.indexed_entities = indexed.len();

        let reach = match predicate.reach(probe.max_radius(), indexed.max_radius()) {
            Some(reach) => reach,
            None => {
                debug!(
                    threshold,
                    horizon = predicate.horizon(probe.max_radius(), indexed.max_radius()),
                    "clash horizon is negative, no pair can clash"
                );
                return Ok(ClashReport {
                    results: ClashResultSequence::empty(),
                    stats,
                });
            }
        };

        // Cells are sized for the probes most entities look like; larger
        // probes issue wider queries.
        let probe_radius = bulk_radius(probe);
        let index = TieredIndex::build(self.config.index, indexed, |tier_radius| {
            predicate.reach(probe_radius, tier_radius).unwrap_or(0.0)
        });
        let index_stats = index.stats();
        debug!(
            kind = ?index_stats.kind,
            indexed = %indexed.origin(),
            entities = index_stats.entities,
            buckets = index_stats.buckets,
            cell_size = index_stats.cell_size,
            tiers = index.tiers().len(),
            max_reach = reach,
            "built spatial index"
        );

        let output = scan(probe, indexed, &index, &predicate, &self.config.parallel);
        let results = build_results(output.pairs, role, set_a, set_b, threshold, self.config.convention);

        stats.probe_side = Some(probe.origin());
        stats.occupied_cells = index_stats.buckets;
        stats.cell_size = index_stats.cell_size;
        stats.radius_tiers = index.tiers().len();
        stats.candidates_examined = output.candidates_examined;
        stats.clashes_found = results.len();
        stats.parallel = output.parallel;

        debug!(
            probe = %probe.origin(),
            probes = stats.probe_entities,
            candidates = stats.candidates_examined,
            clashes = stats.clashes_found,
            parallel = stats.parallel,
            "clash scan complete"
        );

        Ok(ClashReport { results, stats })
    }
}

fn check_threshold(threshold: f64) -> Result<(), ClashError> {
    if threshold.is_finite() {
        Ok(())
    } else {
        Err(ClashError::InvalidThreshold(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexKind;

    #[test]
    fn test_threshold_checked_before_parsing() {
        let engine = ClashEngine::default();
        let err = engine.detect("not a record", "", f64::NAN).expect_err("nan threshold");
        assert!(matches!(err, ClashError::InvalidThreshold(t) if t.is_nan()));
        let err = engine.detect("", "", f64::NEG_INFINITY).expect_err("infinite threshold");
        assert!(matches!(err, ClashError::InvalidThreshold(_)));
    }

    #[test]
    fn test_parse_error_names_set() {
        let engine = ClashEngine::default();
        let err = engine.detect("0 0 0", "0 0", 0.0).expect_err("B is malformed");
        assert!(matches!(err, ClashError::Parse { origin: SetOrigin::B, .. }));
    }

    #[test]
    fn test_index_side_selection() {
        let engine = ClashEngine::default();
        let report = engine
            .detect("0 0 0 1\n5 0 0 1\n", "0.5 0 0 1\n", 0.0)
            .expect("detect succeeds");
        assert_eq!(report.stats.probe_side, Some(SetOrigin::B));
        assert_eq!(report.stats.indexed_entities, 2);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].a.index, 0);

        let mut config = ClashConfig::default();
        config.index_side = IndexSide::B;
        config.index = IndexKind::RTree;
        let report = ClashEngine::new(config)
            .expect("valid config")
            .detect("0 0 0 1\n5 0 0 1\n", "0.5 0 0 1\n", 0.0)
            .expect("detect succeeds");
        assert_eq!(report.stats.probe_side, Some(SetOrigin::A));
        assert_eq!(report.stats.cell_size, 0.0);
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn test_negative_horizon_short_circuits() {
        let report = ClashEngine::default()
            .detect("0 0 0 0.5", "0 0 0 0.5", -2.0)
            .expect("detect succeeds");
        assert!(report.results.is_empty());
        assert_eq!(report.stats.probe_side, None);
        assert_eq!(report.stats.candidates_examined, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ClashConfig::default();
        config.parallel.chunk_size = 0;
        assert!(ClashEngine::new(config).is_err());
    }
}
