//! R*-tree based spatial indexing
//!
//! This module provides a 3D index backed by the `rstar` crate, as an
//! alternative to the uniform grid for sets with very uneven density. The
//! tree is bulk loaded once and only ever queried afterwards.

use super::{IndexStats, NeighborIndex};
use crate::config::IndexKind;
use crate::types::{Entity, Position};
use rstar::{RTree, RTreeObject, AABB};

/// Entry stored inside the R-tree.
#[derive(Debug, Clone, PartialEq)]
struct SpatialEntry {
    index: usize,
    point: [f64; 3],
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Bulk-loaded R*-tree over one entity set
#[derive(Debug)]
pub struct EntityRTree {
    tree: RTree<SpatialEntry>,
}

impl EntityRTree {
    /// Builds the tree over `entities`, keyed by their insertion indices.
    pub fn build<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let entries: Vec<SpatialEntry> = entities
            .into_iter()
            .map(|entity| SpatialEntry {
                index: entity.id.index,
                point: entity.position.to_array(),
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl NeighborIndex for EntityRTree {
    fn len(&self) -> usize {
        self.tree.size()
    }

    fn for_each_candidate(&self, center: Position, reach: f64, visit: &mut dyn FnMut(usize)) {
        if reach.is_nan() || reach < 0.0 {
            return;
        }
        let lower = [center.x - reach, center.y - reach, center.z - reach];
        let upper = [center.x + reach, center.y + reach, center.z + reach];
        let envelope = AABB::from_corners(lower, upper);

        for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
            visit(entry.index);
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            kind: IndexKind::RTree,
            entities: self.tree.size(),
            buckets: self.tree.size(),
            cell_size: 0.0,
        }
    }
}
