//! Spatial indexing for the clash broad phase
//!
//! This module provides the acceleration structures that let the scanner
//! find near neighbours without comparing every pair. Two backends share
//! the [`NeighborIndex`] interface:
//!
//! - [`UniformGrid`] - hash grid of cubic cells sized to the clash horizon
//! - [`EntityRTree`] - bulk-loaded R*-tree backed by `rstar`
//!
//! [`TieredIndex`] builds one of them per radius tier of the indexed set.
//! Both are built once over entities of one [`EntitySet`](crate::EntitySet),
//! are read-only afterwards, and answer cube queries: every indexed entity whose
//! position lies inside the axis-aligned cube of half-width `reach` around a
//! point is visited. Backends may visit extra entities; the scanner applies
//! the exact predicate.

mod grid;
mod rtree;
mod tiers;

pub use grid::{CellKey, UniformGrid};
pub use rtree::EntityRTree;
pub use tiers::{bulk_radius, radius_tiers, RadiusTier, TieredIndex};

use crate::config::IndexKind;
use crate::types::{Entity, Position};
use serde::{Deserialize, Serialize};

/// Read-only neighbour lookup over one entity set.
pub trait NeighborIndex: Sync {
    /// Number of indexed entities.
    fn len(&self) -> usize;

    /// Whether the index holds no entities.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `visit(index)` for each indexed entity that may lie within
    /// `reach` of `center` along every axis. `index` is the entity's
    /// insertion index in the indexed set.
    fn for_each_candidate(&self, center: Position, reach: f64, visit: &mut dyn FnMut(usize));

    /// Shape statistics for logging.
    fn stats(&self) -> IndexStats;
}

/// Shape statistics of a built index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Backend that produced these statistics
    pub kind: IndexKind,
    /// Entities held by the index
    pub entities: usize,
    /// Occupied grid cells (grid) or tree leaves (R*-tree)
    pub buckets: usize,
    /// Cell edge length (grid only; 0 for the R*-tree)
    pub cell_size: f64,
}

/// Builds the configured backend over `entities`.
///
/// `reach` is the typical query half-width the scanner will use; the grid
/// sizes its cells from it.
pub fn build_index<'a, I>(kind: IndexKind, entities: I, reach: f64) -> Box<dyn NeighborIndex>
where
    I: IntoIterator<Item = &'a Entity> + Clone,
{
    match kind {
        IndexKind::Grid => {
            let cell_size = UniformGrid::cell_size_for(entities.clone(), reach);
            Box::new(UniformGrid::build(entities, cell_size))
        }
        IndexKind::RTree => Box::new(EntityRTree::build(entities)),
    }
}
