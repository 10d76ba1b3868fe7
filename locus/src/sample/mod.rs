//! Positional samples and their smoothed estimate.
//!
//! The platform delivers [`RawSample`]s in batches. Each batch is reduced by
//! [`SampleAggregator`] into at most one [`LocationEstimate`], which becomes
//! the service's current location.

mod aggregator;
mod types;

pub use aggregator::{Aggregation, SampleAggregator};
pub use types::{Coordinate, LocationEstimate, RawSample};
