//! This crate contains a high dynamic range histogram which counts
//! occurrences of values and reports on their distribution, with a fixed
//! memory footprint and a bounded relative error.
//!
//! Values are stored in buckets that each span a power of two, with every
//! bucket divided into linear sub-buckets. Small values are recorded exactly
//! (to within the lowest discernible value) while large values share a counter
//! with their neighbours, keeping the relative error within the configured
//! resolution. Recording is a few bit operations and an increment.
//!
//! * `Histogram` - the histogram, generic over the counter width
//! * `Config` - the bucket layout derived from a histogram's parameters
//! * `HistogramIter` - iteration by counter, linear or logarithmic steps, or
//!   percentile levels
//!
//! ```
//! use hdrhistogram::{Histogram, Resolution};
//!
//! let mut histogram: Histogram =
//!     Histogram::new(1, 3_600_000_000, Resolution::SignificantFigures(3)).unwrap();
//!
//! for value in 1..=1000 {
//!     histogram.record(value).unwrap();
//! }
//!
//! assert_eq!(histogram.value_at_percentile(50.0), Ok(500));
//! ```

pub mod iter;

mod bucket;
mod config;
mod counter;
mod errors;
mod index;
mod percentile;
mod standard;

pub use bucket::Bucket;
pub use config::{Config, GrowthPolicy, Parameters, Resolution};
pub use counter::Counter;
pub use errors::{BuildError, Error};
pub use iter::{HistogramIter, IterationValue};
pub use standard::{Builder, Histogram};
