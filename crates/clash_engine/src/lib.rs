//! # Clash Engine
//!
//! Finds every pair of entities, one from each of two input sets, whose
//! spatial separation violates a threshold. Inputs are plain text (one
//! `x y z [radius] [label]` record per line, or a JSON array), and the
//! output is a fully materialized, deterministically ordered sequence of
//! [`ClashResult`] records.
//!
//! ## Core Features
//!
//! - **Sub-quadratic broad phase**: one set is bucketed into a uniform grid
//!   sized to the clash horizon (or an R*-tree), the other is streamed
//!   through it
//! - **Exact boundaries**: the clash predicate is inclusive and the grid
//!   lookup is monotone under floating point rounding
//! - **Deterministic output**: results are sorted by distance with a total
//!   tie-break, independent of parallelism
//! - **Parallel scanning**: large probe sets are split across the rayon pool
//!
//! ## Clash predicate
//!
//! Under the default [`ClashConvention::SurfaceToSurface`], entities `a` and
//! `b` clash when
//!
//! ```text
//! dist(a, b) - (radius_a + radius_b) <= threshold
//! ```
//!
//! so a threshold of `0.0` reports touching or overlapping entities, a
//! positive threshold also reports gaps up to `threshold`, and a negative
//! threshold requires that much overlap. [`ClashConvention::CenterToCenter`]
//! ignores radii and tests `dist(a, b) <= threshold`.
//!
//! ## Quick Start Example
//!
//! ```rust
//! use clash_engine::clash_detection;
//!
//! let set_a = "0 0 0 1.0 column\n10 0 0 0.5 duct";
//! let set_b = "2 0 0 1.0 beam\n";
//!
//! let results = clash_detection(set_a, set_b, 0.0)?;
//! assert_eq!(results.len(), 1);
//! for result in &results {
//!     assert_eq!(result.dist, 2.0);
//!     assert_eq!(result.a.to_string(), "column");
//! }
//! # Ok::<(), clash_engine::ClashError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod results;
pub mod scanner;
pub mod spatial;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{ClashConfig, ClashConvention, IndexKind, IndexSide, ParallelConfig};
pub use engine::{ClashEngine, ClashReport, ScanStats};
pub use error::{ClashError, Location};
pub use parser::parse;
pub use results::{ClashResult, ClashResultSequence};
pub use types::{Entity, EntityId, EntitySet, Position, SetOrigin};

/// Reports every clash between the entities described by `set_a` and
/// `set_b` using the default configuration.
///
/// # Arguments
///
/// * `set_a` - Text describing the first entity set
/// * `set_b` - Text describing the second entity set
/// * `threshold` - Finite clash threshold, in the inputs' length units
///
/// # Returns
///
/// The ordered result sequence, which is empty when either set is empty or
/// nothing clashes. Fails with [`ClashError::InvalidThreshold`] before any
/// parsing when `threshold` is not finite, or with a parse/geometry error
/// naming the set and line of the first bad record.
pub fn clash_detection(
    set_a: &str,
    set_b: &str,
    threshold: f64,
) -> Result<ClashResultSequence, ClashError> {
    clash_detection_with_config(set_a, set_b, threshold, &ClashConfig::default())
}

/// Like [`clash_detection`], with an explicit configuration.
pub fn clash_detection_with_config(
    set_a: &str,
    set_b: &str,
    threshold: f64,
    config: &ClashConfig,
) -> Result<ClashResultSequence, ClashError> {
    let engine = ClashEngine::new(config.clone())?;
    Ok(engine.detect(set_a, set_b, threshold)?.results)
}
