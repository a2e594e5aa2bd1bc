//! Clash Engine Configuration
//!
//! This module provides the configuration structures for a clash run: the
//! clash predicate convention, the spatial index backend, which set gets
//! indexed, and scanner parallelism.

use crate::error::ClashError;
use serde::{Deserialize, Serialize};

fn default_parallel_enabled() -> bool {
    true
}
fn default_min_probe_entities() -> usize {
    4096
}
fn default_chunk_size() -> usize {
    1024
}

/// How distance is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClashConvention {
    /// `dist - (r_a + r_b) <= threshold`: threshold measures the gap between
    /// surfaces. Threshold 0 flags touching or overlapping entities.
    #[default]
    SurfaceToSurface,
    /// `dist <= threshold`: radii are ignored.
    CenterToCenter,
}

impl ClashConvention {
    /// Largest centre distance at which two entities with the given radii
    /// still clash.
    pub fn effective_threshold(self, threshold: f64, radius_a: f64, radius_b: f64) -> f64 {
        match self {
            ClashConvention::SurfaceToSurface => threshold + (radius_a + radius_b),
            ClashConvention::CenterToCenter => threshold,
        }
    }

    /// The clash predicate itself.
    ///
    /// The comparison is inclusive: entities exactly at the clash horizon
    /// are reported.
    pub fn is_clash(self, dist: f64, threshold: f64, radius_a: f64, radius_b: f64) -> bool {
        match self {
            ClashConvention::SurfaceToSurface => dist - (radius_a + radius_b) <= threshold,
            ClashConvention::CenterToCenter => dist <= threshold,
        }
    }
}

/// Spatial index backend used for the broad phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Uniform hash grid sized to the clash horizon
    #[default]
    Grid,
    /// Bulk-loaded R*-tree
    #[serde(rename = "rtree")]
    RTree,
}

/// Which input set the spatial index is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSide {
    /// Index the larger set and probe with the smaller (A probes on ties)
    #[default]
    Larger,
    /// Always index set A
    A,
    /// Always index set B
    B,
}

/// Scanner parallelism settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Allow scanning probe chunks on the rayon pool
    #[serde(default = "default_parallel_enabled")]
    pub enabled: bool,
    /// Probe sets smaller than this are scanned sequentially
    #[serde(default = "default_min_probe_entities")]
    pub min_probe_entities: usize,
    /// Probe entities handed to each rayon task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_parallel_enabled(),
            min_probe_entities: default_min_probe_entities(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClashConfig {
    /// Clash predicate convention
    #[serde(default)]
    pub convention: ClashConvention,
    /// Spatial index backend
    #[serde(default)]
    pub index: IndexKind,
    /// Which set to index
    #[serde(default)]
    pub index_side: IndexSide,
    /// Skip pairs whose explicit labels are equal (same object in both sets)
    #[serde(default)]
    pub skip_matching_labels: bool,
    /// Scanner parallelism
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl ClashConfig {
    /// Configuration using the given convention and defaults elsewhere.
    pub fn with_convention(convention: ClashConvention) -> Self {
        Self {
            convention,
            ..Self::default()
        }
    }

    /// Configuration that never spawns rayon tasks.
    pub fn sequential() -> Self {
        let mut config = Self::default();
        config.parallel.enabled = false;
        config
    }

    /// Validates the configuration for consistency.
    pub fn validate(&self) -> Result<(), ClashError> {
        if self.parallel.chunk_size == 0 {
            return Err(ClashError::InvalidConfig(
                "parallel.chunk_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
