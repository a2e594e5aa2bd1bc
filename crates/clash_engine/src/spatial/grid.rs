// Uniform hash grid for clash candidate lookup.
//
// Partitions space into cubic cells of edge `cell_size`, keyed by integer
// cell coordinates measured from the minimum corner of the indexed set's
// bounding box. Each entity is stored once, in the cell containing its
// centre. A cube query of half-width `reach <= cell_size` touches at most
// two cells per axis, i.e. a subset of the 3x3x3 neighbourhood of the
// query's own cell. Wider queries (probes with unusually large radii) walk
// the occupied cells instead once the key range holds more cells than
// are occupied.
//
// Cell coordinates come from `floor((v - origin) / cell)` computed in f64.
// Every step is monotone in `v` under IEEE rounding, so an entity whose
// coordinate lies inside [c - reach, c + reach] always lands in a cell
// between the cells of the two query bounds, even exactly on a boundary.

use super::{IndexStats, NeighborIndex};
use crate::config::IndexKind;
use crate::types::{Entity, Position};
use std::collections::HashMap;

/// Smallest cell edge, relative to the indexed set's extent.
///
/// Keeps cell coordinates of indexed entities within about a million per
/// axis when the clash horizon is zero or tiny.
const MIN_CELL_FRACTION: f64 = 1e-6;

/// Integer coordinates of a grid cell.
pub type CellKey = [i64; 3];

/// A uniform 3D grid for clash candidate queries.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f64,
    inv_cell_size: f64,
    origin: Position,
    cells: HashMap<CellKey, Vec<usize>>,
    /// Inclusive bounds of occupied cell keys; queries are clipped to them.
    key_min: CellKey,
    key_max: CellKey,
    len: usize,
}

impl UniformGrid {
    /// Picks a cell edge for queries of half-width up to `reach`.
    ///
    /// The edge is never smaller than `reach`, never smaller than a small
    /// fraction of the entities' extent, and always positive and finite.
    pub fn cell_size_for<'a>(entities: impl IntoIterator<Item = &'a Entity>, reach: f64) -> f64 {
        let (min, max) = bounds(entities);
        let extent = (max.x - min.x).max(max.y - min.y).max(max.z - min.z);
        let size = reach.max(extent * MIN_CELL_FRACTION);
        if size.is_finite() && size > 0.0 {
            size
        } else if size > 0.0 {
            f64::MAX
        } else {
            1.0
        }
    }

    /// Builds a grid over `entities` with cells of edge `cell_size`.
    ///
    /// Cells store each entity's insertion index, so a grid may cover any
    /// subset of a set. A non-positive or non-finite `cell_size` is replaced
    /// by the value [`cell_size_for`](Self::cell_size_for) would pick for a
    /// zero reach.
    pub fn build<'a, I>(entities: I, cell_size: f64) -> Self
    where
        I: IntoIterator<Item = &'a Entity> + Clone,
    {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            Self::cell_size_for(entities.clone(), 0.0)
        };
        let (origin, _) = bounds(entities.clone());

        let mut grid = Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            origin,
            cells: HashMap::new(),
            key_min: [i64::MAX; 3],
            key_max: [i64::MIN; 3],
            len: 0,
        };

        for entity in entities {
            grid.len += 1;
            let key = grid.cell_of(entity.position);
            for axis in 0..3 {
                grid.key_min[axis] = grid.key_min[axis].min(key[axis]);
                grid.key_max[axis] = grid.key_max[axis].max(key[axis]);
            }
            grid.cells.entry(key).or_default().push(entity.id.index);
        }

        grid
    }

    /// Cell containing a position.
    pub fn cell_of(&self, position: Position) -> CellKey {
        [
            self.axis_cell(position.x, self.origin.x),
            self.axis_cell(position.y, self.origin.y),
            self.axis_cell(position.z, self.origin.z),
        ]
    }

    /// Indices stored in one cell, in insertion order.
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn axis_cell(&self, value: f64, origin: f64) -> i64 {
        // `as` saturates, so far-away query points clamp instead of wrapping.
        ((value - origin) * self.inv_cell_size).floor() as i64
    }

    fn axis_range(&self, center: f64, origin: f64, reach: f64, axis: usize) -> (i64, i64) {
        let lo = self.axis_cell(center - reach, origin).max(self.key_min[axis]);
        let hi = self.axis_cell(center + reach, origin).min(self.key_max[axis]);
        (lo, hi)
    }
}

impl NeighborIndex for UniformGrid {
    fn len(&self) -> usize {
        self.len
    }

    fn for_each_candidate(&self, center: Position, reach: f64, visit: &mut dyn FnMut(usize)) {
        if self.cells.is_empty() || reach.is_nan() || reach < 0.0 {
            return;
        }

        let (x_lo, x_hi) = self.axis_range(center.x, self.origin.x, reach, 0);
        let (y_lo, y_hi) = self.axis_range(center.y, self.origin.y, reach, 1);
        let (z_lo, z_hi) = self.axis_range(center.z, self.origin.z, reach, 2);

        let span = |lo: i64, hi: i64| (i128::from(hi) - i128::from(lo) + 1).max(0) as u128;
        let volume = span(x_lo, x_hi)
            .saturating_mul(span(y_lo, y_hi))
            .saturating_mul(span(z_lo, z_hi));
        if volume == 0 {
            return;
        }

        if volume > self.cells.len() as u128 {
            for (key, indices) in &self.cells {
                let inside = (x_lo..=x_hi).contains(&key[0])
                    && (y_lo..=y_hi).contains(&key[1])
                    && (z_lo..=z_hi).contains(&key[2]);
                if inside {
                    for &index in indices {
                        visit(index);
                    }
                }
            }
            return;
        }

        for gx in x_lo..=x_hi {
            for gy in y_lo..=y_hi {
                for gz in z_lo..=z_hi {
                    if let Some(indices) = self.cells.get(&[gx, gy, gz]) {
                        for &index in indices {
                            visit(index);
                        }
                    }
                }
            }
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            kind: IndexKind::Grid,
            entities: self.len,
            buckets: self.cells.len(),
            cell_size: self.cell_size,
        }
    }
}

/// Bounding box of the entities' centres; both corners are the origin when
/// empty.
fn bounds<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> (Position, Position) {
    let mut iter = entities.into_iter();
    let first = match iter.next() {
        Some(entity) => entity.position,
        None => return (Position::new(0.0, 0.0, 0.0), Position::new(0.0, 0.0, 0.0)),
    };

    iter.fold((first, first), |(min, max), entity| {
        let p = entity.position;
        (
            Position::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Position::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::types::{EntitySet, SetOrigin};

    fn set(text: &str) -> EntitySet {
        parse(text, SetOrigin::B).expect("fixture should parse")
    }

    fn collect(grid: &UniformGrid, center: Position, reach: f64) -> Vec<usize> {
        let mut found = Vec::new();
        grid.for_each_candidate(center, reach, &mut |i| found.push(i));
        found.sort_unstable();
        found
    }

    #[test]
    fn test_each_entity_stored_once() {
        let entities = set("0 0 0\n0.5 0.5 0.5\n1 0 0\n2.5 0 0\n-3 4 5\n");
        let grid = UniformGrid::build(&entities, 1.0);

        let stored: usize = grid.cells.values().map(Vec::len).sum();
        assert_eq!(stored, entities.len());
        assert_eq!(grid.len(), 5);
        for entity in &entities {
            assert!(grid.cell(grid.cell_of(entity.position)).contains(&entity.id.index));
        }
    }

    #[test]
    fn test_neighbour_across_cell_boundary() {
        // Origin is the bbox minimum (0,0,0); 1.0 sits exactly on the
        // boundary between cells 0 and 1.
        let entities = set("0 0 0\n1 0 0\n2 0 0\n");
        let grid = UniformGrid::build(&entities, 1.0);
        assert_ne!(grid.cell_of(Position::new(0.999, 0.0, 0.0)), grid.cell_of(Position::new(1.0, 0.0, 0.0)));

        let found = collect(&grid, Position::new(0.999, 0.0, 0.0), 1.0);
        assert_eq!(found, vec![0, 1]);

        let found = collect(&grid, Position::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_query_outside_bounds_is_clipped() {
        let entities = set("0 0 0\n");
        let grid = UniformGrid::build(&entities, 1.0);
        assert!(collect(&grid, Position::new(1e300, -1e300, 0.0), 1.0).is_empty());
        assert_eq!(collect(&grid, Position::new(5.0, 5.0, 5.0), f64::INFINITY), vec![0]);
    }

    #[test]
    fn test_cell_size_for_degenerate_inputs() {
        let single = set("7 7 7\n");
        assert_eq!(UniformGrid::cell_size_for(&single, 0.0), 1.0);
        assert_eq!(UniformGrid::cell_size_for(&single, 2.5), 2.5);
        assert_eq!(UniformGrid::cell_size_for(&single, f64::INFINITY), f64::MAX);

        let spread = set("0 0 0\n1000000 0 0\n");
        assert!((UniformGrid::cell_size_for(&spread, 0.0) - 1.0).abs() < 1e-12);

        let empty = set("");
        let grid = UniformGrid::build(&empty, 0.0);
        assert!(grid.is_empty());
        assert!(collect(&grid, Position::new(0.0, 0.0, 0.0), 10.0).is_empty());
    }

    #[test]
    fn test_subset_keeps_insertion_indices() {
        let entities = set("0 0 0\n5 5 5\n0.5 0 0\n9 9 9\n");
        let subset = [1, 3].map(|i| &entities.entities()[i]);
        let grid = UniformGrid::build(subset, 1.0);

        assert_eq!(grid.len(), 2);
        assert_eq!(collect(&grid, Position::new(9.0, 9.0, 9.0), 0.5), vec![3]);
        assert_eq!(collect(&grid, Position::new(0.0, 0.0, 0.0), 20.0), vec![1, 3]);
    }

    #[test]
    fn test_wide_query_walks_occupied_cells() {
        // A million cells per axis between the two entities
        let entities = set("0 0 0\n1000000 1000000 1000000\n0.5 0.5 0.5\n");
        let grid = UniformGrid::build(&entities, 1.0);
        assert_eq!(grid.occupied_cells(), 2);

        assert_eq!(collect(&grid, Position::new(500000.0, 500000.0, 500000.0), 1e6), vec![0, 1, 2]);
        assert_eq!(collect(&grid, Position::new(0.0, 0.0, 0.0), 999998.0), vec![0, 2]);
    }

    #[test]
    fn test_negative_reach_visits_nothing() {
        let entities = set("0 0 0\n");
        let grid = UniformGrid::build(&entities, 1.0);
        assert!(collect(&grid, Position::new(0.0, 0.0, 0.0), -0.5).is_empty());
    }
}
