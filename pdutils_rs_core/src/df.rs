//! # df
//!
//! a tiny table module that mainly focuses on row-wise joins and temporal snapshots
//!
//! rows are identified by position, cells are dynamically typed [`Value`]s and every
//! operation returns a new [`Table`] instead of mutating its inputs.

mod value;

pub mod frame;
pub mod join;
pub mod snapshot;

pub use frame::Table;
pub use join::{join_within_range, join_within_range_with, Boundary, JoinHow, JoinOptions};
pub use snapshot::{
    pivot_events_to_snapshots, pivot_events_to_snapshots_with, Aggregation, FillPolicy,
    PivotOptions, Step, TimeInput, WindowClosure,
};
pub use value::{Value, ValueKind};

pub type ColumnsDtype = String;
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
