//! # Core Type Definitions
//!
//! This module contains the fundamental types shared by every stage of the
//! clash pipeline: positions, entity identifiers, entities and the ordered
//! sets produced by the parser.
//!
//! ## Key Types
//!
//! - [`Position`] - 3D position with double precision
//! - [`EntityId`] - Stable identifier (insertion index plus optional label)
//! - [`Entity`] - A positioned object with a non-negative radius
//! - [`EntitySet`] - Ordered, origin-tagged sequence of entities
//!
//! ## Design Principles
//!
//! - **Immutability**: Entities are never mutated after parsing
//! - **Precision**: All geometry is computed in `f64`
//! - **Determinism**: Insertion indices give every set a total order

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Geometry
// ============================================================================

/// Component range whose squares sum without overflow or loss to underflow.
const NORM_SAFE_MIN: f64 = 1e-150;
const NORM_SAFE_MAX: f64 = 1e150;

/// Represents a 3D position.
///
/// Uses double-precision floating point for all coordinates. Positions held
/// by an [`EntitySet`] are guaranteed finite by the parser.
///
/// # Examples
///
/// ```rust
/// use clash_engine::Position;
///
/// let origin = Position::new(0.0, 0.0, 0.0);
/// let p = Position::new(3.0, 4.0, 0.0);
/// assert_eq!(origin.distance(p), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Position {
    /// Creates a new position with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculates the Euclidean distance to another position.
    ///
    /// Components are rescaled by the largest one when their squares would
    /// overflow or underflow, so the result is accurate for every pair of
    /// finite positions. It is bitwise identical regardless of argument
    /// order.
    pub fn distance(&self, other: Position) -> f64 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        let largest = dx.max(dy).max(dz);

        if largest == 0.0 || largest.is_infinite() {
            return largest;
        }
        if (NORM_SAFE_MIN..=NORM_SAFE_MAX).contains(&largest) {
            return (dx * dx + dy * dy + dz * dz).sqrt();
        }

        let (x, y, z) = (dx / largest, dy / largest, dz / largest);
        largest * (x * x + y * y + z * z).sqrt()
    }

    /// Returns the coordinates as an array, as used by the R*-tree backend.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Which input an entity set was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOrigin {
    /// The first argument to `clash_detection`
    A,
    /// The second argument to `clash_detection`
    B,
}

impl fmt::Display for SetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOrigin::A => write!(f, "A"),
            SetOrigin::B => write!(f, "B"),
        }
    }
}

/// Identifier of an entity within its set.
///
/// `index` is the zero-based position of the record among the entities of
/// its set and is always unique. `label` is the optional name supplied by
/// the input; when present it is also unique within the set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    /// Zero-based insertion index
    pub index: usize,
    /// Optional label from the input record
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

impl EntityId {
    /// Creates an identifier with no label.
    pub fn indexed(index: usize) -> Self {
        Self { index, label: None }
    }

    /// Creates an identifier with a label.
    pub fn labeled(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: Some(label.into()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "#{}", self.index),
        }
    }
}

/// A positioned object with a radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, unique within the owning set
    pub id: EntityId,
    /// Centre position (always finite)
    pub position: Position,
    /// Radius (finite, non-negative; 0 when the input gave none)
    pub radius: f64,
}

impl Entity {
    /// Creates a new entity.
    pub fn new(id: EntityId, position: Position, radius: f64) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }
}

/// Ordered sequence of entities parsed from one input.
///
/// Entities appear in the order of their records in the source text and
/// `entities[i].id.index == i` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySet {
    origin: SetOrigin,
    entities: Vec<Entity>,
    max_radius: f64,
}

impl EntitySet {
    /// Creates an empty set.
    pub fn empty(origin: SetOrigin) -> Self {
        Self {
            origin,
            entities: Vec::new(),
            max_radius: 0.0,
        }
    }

    /// Appends an entity, assigning it the next insertion index.
    ///
    /// Only the parser and tests build sets; both guarantee finite
    /// geometry and unique labels before calling this.
    pub(crate) fn push(&mut self, label: Option<String>, position: Position, radius: f64) {
        let index = self.entities.len();
        self.max_radius = self.max_radius.max(radius);
        self.entities.push(Entity::new(EntityId { index, label }, position, radius));
    }

    /// Origin tag of this set.
    pub fn origin(&self) -> SetOrigin {
        self.origin
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the set has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entity at an insertion index.
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Iterates entities in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Largest radius in the set, or 0 for an empty set.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
