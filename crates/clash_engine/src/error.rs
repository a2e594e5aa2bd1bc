//! Error types for the clash engine.

use crate::types::SetOrigin;
use std::fmt;
use thiserror::Error;

/// Where in an input a faulty record was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 1-based line number in line-oriented input
    Line(usize),
    /// 0-based record index in a JSON block
    Record(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(line) => write!(f, "line {line}"),
            Location::Record(index) => write!(f, "record {index}"),
        }
    }
}

/// Errors surfaced by `clash_detection` and friends.
///
/// Every variant is fatal to the invocation that produced it; the engine
/// never returns partial results alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClashError {
    /// A record could not be decoded into the required fields.
    #[error("set {origin}, {location}: {message}")]
    Parse {
        origin: SetOrigin,
        location: Location,
        message: String,
    },

    /// The threshold was NaN or infinite.
    #[error("invalid threshold {0}: must be finite")]
    InvalidThreshold(f64),

    /// A record decoded but describes impossible geometry.
    #[error("set {origin}, {location}: invalid {field} {value}")]
    InvalidGeometry {
        origin: SetOrigin,
        location: Location,
        field: &'static str,
        value: f64,
    },

    /// The engine configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClashError {
    /// Location of the offending record, for parse and geometry errors.
    pub fn location(&self) -> Option<Location> {
        match self {
            ClashError::Parse { location, .. } | ClashError::InvalidGeometry { location, .. } => {
                Some(*location)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ClashError::Parse {
            origin: SetOrigin::B,
            location: Location::Line(7),
            message: "missing z coordinate".to_string(),
        };
        assert_eq!(err.to_string(), "set B, line 7: missing z coordinate");
        assert_eq!(err.location(), Some(Location::Line(7)));

        let err = ClashError::InvalidGeometry {
            origin: SetOrigin::A,
            location: Location::Record(2),
            field: "radius",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "set A, record 2: invalid radius -1");

        assert_eq!(ClashError::InvalidThreshold(f64::NAN).location(), None);
    }
}
