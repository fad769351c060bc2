//! # df/join
//!
//! range join: match every row of a *probe* table against the rows of a *range* table
//! whose `[low, high]` interval contains the probe value.
//!
//! the scan is a plain `O(|probe| x |range|)` nested loop. each probe row is independent
//! of the others, so the per-row scans can be spread over a rayon pool (see
//! [`JoinOptions::num_threads`]) without changing the output order.
//!
//! output layout:
//! - columns: range columns first (colliding names suffixed with `_y`), then probe columns
//! - rows: matches in probe-row order, then range-row order. unmatched probe rows (`left`)
//!   or unmatched range rows (`right`) are appended at the end with [`Value::Null`] in the
//!   columns of the other side.

use std::{collections::HashSet, fmt, str::FromStr};

use itertools::Itertools;
use ndarray::Array1;
use rayon::prelude::*;

use super::{Table, Value, ValueKind};
use crate::error::{PdError, Result};

const COLLISION_SUFFIX: &str = "_y";

/// inclusive (`[`, `]`) / exclusive (`(`, `)`) combination applied to the low and high bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// `[]`
    #[default]
    Closed,
    /// `()`
    Open,
    /// `[)`
    LeftClosed,
    /// `(]`
    RightClosed,
}

impl Boundary {
    pub fn low_inclusive(&self) -> bool {
        matches!(self, Boundary::Closed | Boundary::LeftClosed)
    }
    pub fn high_inclusive(&self) -> bool {
        matches!(self, Boundary::Closed | Boundary::RightClosed)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Closed => "[]",
            Boundary::Open => "()",
            Boundary::LeftClosed => "[)",
            Boundary::RightClosed => "(]",
        }
    }

    /// whether `value` lies within `(low, high)` under this boundary
    pub fn contains(&self, low: &Value, high: &Value, value: &Value) -> bool {
        let above_low = low.compare(value).is_some_and(|ord| {
            ord.is_lt() || (self.low_inclusive() && ord.is_eq())
        });
        above_low
            && high.compare(value).is_some_and(|ord| {
                ord.is_gt() || (self.high_inclusive() && ord.is_eq())
            })
    }
}

impl FromStr for Boundary {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "[]" => Ok(Boundary::Closed),
            "()" => Ok(Boundary::Open),
            "[)" => Ok(Boundary::LeftClosed),
            "(]" => Ok(Boundary::RightClosed),
            _ => Err(PdError::validation(format!(
                "unknown boundary `{s}`, expected one of '[]', '()', '[)', '(]'"
            ))),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinHow {
    #[default]
    Inner,
    Left,
    Right,
}

impl FromStr for JoinHow {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner" => Ok(JoinHow::Inner),
            "left" => Ok(JoinHow::Left),
            "right" => Ok(JoinHow::Right),
            _ => Err(PdError::validation(format!(
                "unknown join mode `{s}`, expected one of 'inner', 'left', 'right'"
            ))),
        }
    }
}

impl fmt::Display for JoinHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinHow::Inner => "inner",
            JoinHow::Left => "left",
            JoinHow::Right => "right",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// `<= 1` scans on the calling thread
    pub num_threads: usize,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self { num_threads: 1 }
    }
}

pub fn join_within_range(
    probe: &Table,
    range: &Table,
    probe_column: &str,
    range_low_column: &str,
    range_high_column: &str,
    boundary: Boundary,
    how: JoinHow,
) -> Result<Table> {
    join_within_range_with(
        probe,
        range,
        probe_column,
        range_low_column,
        range_high_column,
        boundary,
        how,
        &JoinOptions::default(),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn join_within_range_with(
    probe: &Table,
    range: &Table,
    probe_column: &str,
    range_low_column: &str,
    range_high_column: &str,
    boundary: Boundary,
    how: JoinHow,
    options: &JoinOptions,
) -> Result<Table> {
    let probe_idx = probe.require_columns(&[probe_column])?[0];
    let bound_indices = range.require_columns(&[range_low_column, range_high_column])?;
    let (low_idx, high_idx) = (bound_indices[0], bound_indices[1]);
    check_comparable(probe, probe_idx, range, &[low_idx, high_idx])?;

    // positions are unaffected by renaming, so the bound indices stay valid
    let range = suffix_collisions(probe, range)?;

    let matches = scan(probe, probe_idx, &range, low_idx, high_idx, boundary, options)?;

    let mut range_positions: Vec<Option<usize>> = Vec::new();
    let mut probe_positions: Vec<Option<usize>> = Vec::new();
    for (i, matched) in matches.iter().enumerate() {
        for &j in matched {
            range_positions.push(Some(j));
            probe_positions.push(Some(i));
        }
    }
    match how {
        JoinHow::Inner => {}
        JoinHow::Left => {
            for (i, _) in matches.iter().enumerate().filter(|(_, m)| m.is_empty()) {
                range_positions.push(None);
                probe_positions.push(Some(i));
            }
        }
        JoinHow::Right => {
            let mut seen = vec![false; range.nrows()];
            matches.iter().flatten().for_each(|&j| seen[j] = true);
            for (j, _) in seen.iter().enumerate().filter(|(_, s)| !**s) {
                range_positions.push(Some(j));
                probe_positions.push(None);
            }
        }
    }

    let joined = range
        .take_or_null(&range_positions)
        .hstack(&probe.take_or_null(&probe_positions))?;
    tracing::debug!(
        probe_rows = probe.nrows(),
        range_rows = range.nrows(),
        output_rows = joined.nrows(),
        %boundary,
        %how,
        "range join finished"
    );
    Ok(joined)
}

fn scan(
    probe: &Table,
    probe_idx: usize,
    range: &Table,
    low_idx: usize,
    high_idx: usize,
    boundary: Boundary,
    options: &JoinOptions,
) -> Result<Vec<Vec<usize>>> {
    let scan_row = |i: usize| -> Vec<usize> {
        let value = &probe.values[[i, probe_idx]];
        range
            .values
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| boundary.contains(&row[low_idx], &row[high_idx], value))
            .map(|(j, _)| j)
            .collect()
    };
    if options.num_threads <= 1 {
        return Ok((0..probe.nrows()).map(scan_row).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.num_threads)
        .build()?;
    Ok(pool.install(|| (0..probe.nrows()).into_par_iter().map(scan_row).collect()))
}

fn comparison_class(value: &Value) -> Option<ValueKind> {
    match value.kind() {
        ValueKind::Null => None,
        ValueKind::Int | ValueKind::Float => Some(ValueKind::Float),
        kind => Some(kind),
    }
}

fn check_comparable(
    probe: &Table,
    probe_idx: usize,
    range: &Table,
    bound_indices: &[usize],
) -> Result<()> {
    let probe_values = probe.values.column(probe_idx);
    let bound_values = bound_indices
        .iter()
        .flat_map(|&j| range.values.column(j).into_iter());
    let classes: HashSet<ValueKind> = probe_values
        .into_iter()
        .chain(bound_values)
        .filter_map(comparison_class)
        .collect();
    if classes.len() > 1 {
        return Err(PdError::validation(format!(
            "probe and range bound columns are not comparable, found kinds [{}]",
            classes.iter().map(ValueKind::to_string).sorted().join(", ")
        )));
    }
    Ok(())
}

/// suffix range columns that collide with probe columns with `_y` (repeatedly, if needed)
fn suffix_collisions(probe: &Table, range: &Table) -> Result<Table> {
    let probe_names: HashSet<&str> = probe.columns.iter().map(String::as_str).collect();
    let mut taken: HashSet<String> = probe
        .columns
        .iter()
        .chain(range.columns.iter())
        .cloned()
        .collect();
    let mut renamed = Vec::with_capacity(range.ncols());
    for name in range.columns.iter() {
        if !probe_names.contains(name.as_str()) {
            renamed.push(name.clone());
            continue;
        }
        let mut candidate = format!("{name}{COLLISION_SUFFIX}");
        while taken.contains(&candidate) {
            candidate.push_str(COLLISION_SUFFIX);
        }
        taken.insert(candidate.clone());
        renamed.push(candidate);
    }
    Table::new(Array1::from(renamed), range.values.clone())
}
