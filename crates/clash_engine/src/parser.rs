//! Entity parser
//!
//! Turns raw text into an [`EntitySet`]. Two layouts are accepted:
//!
//! * **Line records**: one entity per line, `x y z [radius] [label...]`.
//!   Tokens are whitespace separated, or comma separated when the line
//!   contains a comma. Blank lines and `#` comments are skipped.
//! * **JSON block**: text whose first non-blank character is `[` is read as
//!   an array of `{ "position": [x, y, z], "radius": r, "id": "..." }`
//!   objects. `x`/`y`/`z` fields may replace `position`, `label` may replace
//!   `id`, and unknown fields are ignored.
//!
//! The fourth token of a line record is a radius when it parses as a
//! number, otherwise it begins the label.

use crate::error::{ClashError, Location};
use crate::types::{EntitySet, Position, SetOrigin};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const AXES: [&str; 3] = ["x", "y", "z"];

/// Parses one input into an entity set.
///
/// Empty input, or input holding only blank and comment lines, yields an
/// empty set. Any malformed record fails the whole parse.
pub fn parse(text: &str, origin: SetOrigin) -> Result<EntitySet, ClashError> {
    let set = if text.trim_start().starts_with('[') {
        parse_json_block(text, origin)?
    } else {
        parse_lines(text, origin)?
    };

    debug!(
        origin = %origin,
        entities = set.len(),
        max_radius = set.max_radius(),
        "parsed entity set"
    );
    Ok(set)
}

/// Tracks labels already used in one set.
struct LabelRegistry {
    origin: SetOrigin,
    seen: HashMap<String, Location>,
}

impl LabelRegistry {
    fn new(origin: SetOrigin) -> Self {
        Self {
            origin,
            seen: HashMap::new(),
        }
    }

    fn claim(&mut self, label: &str, location: Location) -> Result<(), ClashError> {
        if let Some(first) = self.seen.get(label) {
            return Err(ClashError::Parse {
                origin: self.origin,
                location,
                message: format!("duplicate label '{label}' (first used at {first})"),
            });
        }
        self.seen.insert(label.to_string(), location);
        Ok(())
    }
}

// ============================================================================
// Line records
// ============================================================================

fn parse_lines(text: &str, origin: SetOrigin) -> Result<EntitySet, ClashError> {
    let mut set = EntitySet::empty(origin);
    let mut labels = LabelRegistry::new(origin);

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let location = Location::Line(i + 1);

        let tokens: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };

        let mut coords = [0.0; 3];
        for (axis, slot) in coords.iter_mut().enumerate() {
            let name = AXES[axis];
            let token = match tokens.get(axis) {
                Some(token) if !token.is_empty() => *token,
                _ => {
                    return Err(ClashError::Parse {
                        origin,
                        location,
                        message: format!("missing {name} coordinate"),
                    })
                }
            };
            *slot = parse_number(token, name, origin, location)?;
        }
        let position = checked_position(coords, origin, location)?;

        let rest: Vec<&str> = tokens[3..].iter().copied().filter(|t| !t.is_empty()).collect();
        let (radius, label_tokens) = match rest.split_first() {
            Some((first, tail)) => match first.parse::<f64>() {
                Ok(radius) => (radius, tail),
                Err(_) => (0.0, rest.as_slice()),
            },
            None => (0.0, rest.as_slice()),
        };
        let radius = checked_radius(radius, origin, location)?;

        let label = if label_tokens.is_empty() {
            None
        } else {
            let label = label_tokens.join(" ");
            labels.claim(&label, location)?;
            Some(label)
        };

        set.push(label, position, radius);
    }

    Ok(set)
}

fn parse_number(
    token: &str,
    field: &str,
    origin: SetOrigin,
    location: Location,
) -> Result<f64, ClashError> {
    token.parse::<f64>().map_err(|_| ClashError::Parse {
        origin,
        location,
        message: format!("{field} coordinate is not a number: '{token}'"),
    })
}

fn checked_position(
    coords: [f64; 3],
    origin: SetOrigin,
    location: Location,
) -> Result<Position, ClashError> {
    for (axis, value) in coords.iter().enumerate() {
        if !value.is_finite() {
            return Err(ClashError::InvalidGeometry {
                origin,
                location,
                field: AXES[axis],
                value: *value,
            });
        }
    }
    Ok(Position::new(coords[0], coords[1], coords[2]))
}

fn checked_radius(radius: f64, origin: SetOrigin, location: Location) -> Result<f64, ClashError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ClashError::InvalidGeometry {
            origin,
            location,
            field: "radius",
            value: radius,
        });
    }
    // Normalise -0.0 so it never leaks into sums or serialized output.
    Ok(radius + 0.0)
}

// ============================================================================
// JSON block
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonLabel {
    Text(String),
    Number(serde_json::Number),
}

impl JsonLabel {
    fn into_string(self) -> String {
        match self {
            JsonLabel::Text(text) => text,
            JsonLabel::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default, alias = "label")]
    id: Option<JsonLabel>,
    #[serde(default)]
    position: Option<[f64; 3]>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
    #[serde(default)]
    radius: Option<f64>,
}

fn parse_json_block(text: &str, origin: SetOrigin) -> Result<EntitySet, ClashError> {
    let records: Vec<JsonRecord> = serde_json::from_str(text).map_err(|e| ClashError::Parse {
        origin,
        location: Location::Line(e.line()),
        message: e.to_string(),
    })?;

    let mut set = EntitySet::empty(origin);
    let mut labels = LabelRegistry::new(origin);

    for (index, record) in records.into_iter().enumerate() {
        let location = Location::Record(index);

        let coords = match (record.position, record.x, record.y, record.z) {
            (Some(position), _, _, _) => position,
            (None, Some(x), Some(y), Some(z)) => [x, y, z],
            (None, x, y, _) => {
                let missing = if x.is_none() {
                    "x"
                } else if y.is_none() {
                    "y"
                } else {
                    "z"
                };
                return Err(ClashError::Parse {
                    origin,
                    location,
                    message: format!("missing {missing} coordinate"),
                });
            }
        };
        let position = checked_position(coords, origin, location)?;
        let radius = checked_radius(record.radius.unwrap_or(0.0), origin, location)?;

        let label = match record.id {
            Some(id) => {
                let label = id.into_string();
                labels.claim(&label, location)?;
                Some(label)
            }
            None => None,
        };

        set.push(label, position, radius);
    }

    Ok(set)
}
