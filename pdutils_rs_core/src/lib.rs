//! Small helpers for tabular data.
//!
//! - [`df::join_within_range`]: join two tables when a scalar lies within an interval.
//! - [`df::pivot_events_to_snapshots`]: bucket timestamped events into fixed windows.
//! - [`toolkit::duration::parse_step`]: parse `NdNhNmNs` durations.
//! - [`toolkit::signature`] / [`toolkit::logger`]: call wrappers for runtime type
//!   checking and call logging.

pub mod df;
pub mod error;
pub mod logging;
pub mod toolkit;

pub use error::{PdError, Result};
