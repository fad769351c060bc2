//! # df/snapshot
//!
//! turn timestamped events into a grid of snapshots: one row per fixed-width time window,
//! one column per distinct grouping key, each cell holding the aggregate of the events
//! of that group inside that window.
//!
//! windows are generated from `start_time` by repeatedly adding `step` while the boundary
//! stays `<= end_time`, so `N` boundaries give `N - 1` windows and a trailing partial window
//! is dropped.
//!
//! by default ([`WindowClosure::Both`]) a window keeps events in `[start, end]`: an event
//! sitting exactly on a boundary is counted in both adjacent windows.
//! [`WindowClosure::Left`] switches to `[start, end)`.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt,
    str::FromStr,
    sync::Arc,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Itertools;
use ndarray::{Array1, Array2};

use super::{Table, Value, DEFAULT_TIME_FORMAT};
use crate::{
    error::{PdError, Result},
    toolkit::duration::parse_step,
};

type CustomAggregation = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// how the values of one group inside one window are reduced
///
/// nulls are dropped before reducing. a reduction yielding [`Value::Null`] leaves the
/// cell empty, so it takes part in filling.
#[derive(Clone)]
pub enum Aggregation {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    First,
    Last,
    Custom(CustomAggregation),
}

impl Aggregation {
    pub fn custom(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Aggregation::Custom(Arc::new(f))
    }

    fn requires_numeric(&self) -> bool {
        matches!(self, Aggregation::Sum | Aggregation::Mean)
    }

    /// reduce non-null `values`
    pub fn apply(&self, values: &[Value]) -> Value {
        match self {
            Aggregation::Sum => sum(values),
            Aggregation::Mean => {
                let floats = values.iter().filter_map(Value::as_f64).collect_vec();
                if floats.is_empty() {
                    Value::Null
                } else {
                    Value::Float(floats.iter().sum::<f64>() / floats.len() as f64)
                }
            }
            Aggregation::Min => values.iter().min().cloned().unwrap_or_default(),
            Aggregation::Max => values.iter().max().cloned().unwrap_or_default(),
            Aggregation::Count => Value::Int(values.len() as i64),
            Aggregation::First => values.first().cloned().unwrap_or_default(),
            Aggregation::Last => values.last().cloned().unwrap_or_default(),
            Aggregation::Custom(f) => f(values),
        }
    }
}

fn sum(values: &[Value]) -> Value {
    let all_ints = values.iter().all(|v| matches!(v, Value::Int(_)));
    if all_ints {
        let total = values.iter().try_fold(0i64, |acc, v| match v {
            Value::Int(x) => acc.checked_add(*x),
            _ => None,
        });
        if let Some(total) = total {
            return Value::Int(total);
        }
    }
    Value::Float(values.iter().filter_map(Value::as_f64).sum())
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregation::Sum => "Sum",
            Aggregation::Mean => "Mean",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
            Aggregation::Count => "Count",
            Aggregation::First => "First",
            Aggregation::Last => "Last",
            Aggregation::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

impl FromStr for Aggregation {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "count" => Ok(Aggregation::Count),
            "first" => Ok(Aggregation::First),
            "last" => Ok(Aggregation::Last),
            _ => Err(PdError::validation(format!("unknown aggregation `{s}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPolicy {
    Forward,
    Backward,
    #[default]
    None,
}

impl FromStr for FillPolicy {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ffill" | "pad" | "forward" => Ok(FillPolicy::Forward),
            "bfill" | "backfill" | "backward" => Ok(FillPolicy::Backward),
            "none" => Ok(FillPolicy::None),
            _ => Err(PdError::validation(format!("unknown fill policy `{s}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowClosure {
    /// `[start, end]`
    #[default]
    Both,
    /// `[start, end)`
    Left,
}

impl FromStr for WindowClosure {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "both" => Ok(WindowClosure::Both),
            "left" => Ok(WindowClosure::Left),
            _ => Err(PdError::validation(format!(
                "unknown window closure `{s}`, expected 'both' or 'left'"
            ))),
        }
    }
}

impl WindowClosure {
    fn contains(&self, start: NaiveDateTime, end: NaiveDateTime, t: NaiveDateTime) -> bool {
        match self {
            WindowClosure::Both => start <= t && t <= end,
            WindowClosure::Left => start <= t && t < end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    Time(NaiveDateTime),
    Text(String),
}

impl TimeInput {
    pub fn resolve(&self, format: &str) -> Result<NaiveDateTime> {
        match self {
            TimeInput::Time(t) => Ok(*t),
            TimeInput::Text(s) => parse_time(s, format),
        }
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(t: NaiveDateTime) -> Self {
        TimeInput::Time(t)
    }
}
impl From<&str> for TimeInput {
    fn from(s: &str) -> Self {
        TimeInput::Text(s.to_string())
    }
}
impl From<String> for TimeInput {
    fn from(s: String) -> Self {
        TimeInput::Text(s)
    }
}

fn parse_time(s: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, format)
        .or_else(|_| {
            NaiveDate::parse_from_str(s, format).map(|d| d.and_time(NaiveTime::default()))
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::default()))
        })
        .map_err(|e| PdError::parse(format!("can't parse `{s}` with format `{format}`: {e}")))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Text(String),
    Delta(TimeDelta),
}

impl Step {
    pub fn resolve(&self) -> Result<TimeDelta> {
        match self {
            Step::Text(s) => parse_step(s),
            Step::Delta(d) => Ok(*d),
        }
    }
}

impl From<&str> for Step {
    fn from(s: &str) -> Self {
        Step::Text(s.to_string())
    }
}
impl From<String> for Step {
    fn from(s: String) -> Self {
        Step::Text(s)
    }
}
impl From<TimeDelta> for Step {
    fn from(d: TimeDelta) -> Self {
        Step::Delta(d)
    }
}

#[derive(Debug, Clone)]
pub struct PivotOptions {
    /// used for string start / end times and string timestamp cells
    pub time_format: String,
    /// joins the parts of a multi-column grouping key into a column name
    pub key_separator: String,
    pub window_closure: WindowClosure,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            key_separator: "_".to_string(),
            window_closure: WindowClosure::default(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn pivot_events_to_snapshots(
    events: &Table,
    aggregation: &Aggregation,
    start_time: impl Into<TimeInput>,
    end_time: impl Into<TimeInput>,
    timestamp_column: &str,
    step: impl Into<Step>,
    group_by_columns: &[&str],
    value_column: &str,
    fill_policy: FillPolicy,
    default_value: Value,
) -> Result<Table> {
    pivot_events_to_snapshots_with(
        events,
        aggregation,
        start_time,
        end_time,
        timestamp_column,
        step,
        group_by_columns,
        value_column,
        fill_policy,
        default_value,
        &PivotOptions::default(),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn pivot_events_to_snapshots_with(
    events: &Table,
    aggregation: &Aggregation,
    start_time: impl Into<TimeInput>,
    end_time: impl Into<TimeInput>,
    timestamp_column: &str,
    step: impl Into<Step>,
    group_by_columns: &[&str],
    value_column: &str,
    fill_policy: FillPolicy,
    default_value: Value,
    options: &PivotOptions,
) -> Result<Table> {
    let mut required = vec![timestamp_column, value_column];
    required.extend_from_slice(group_by_columns);
    let indices = events.require_columns(&required)?;
    let (ts_idx, value_idx, key_indices) = (indices[0], indices[1], &indices[2..]);

    // an unparseable step is an argument error
    let step = step.into().resolve().map_err(|e| match e {
        PdError::Parse(msg) => PdError::Validation(msg),
        other => other,
    })?;
    if step <= TimeDelta::zero() {
        return Err(PdError::validation(format!(
            "step must be positive, got {step}"
        )));
    }
    let start = start_time.into().resolve(&options.time_format)?;
    let end = end_time.into().resolve(&options.time_format)?;

    if aggregation.requires_numeric() {
        let column = events.values.column(value_idx);
        if let Some(bad) = column.iter().find(|v| !v.is_null() && !v.is_numeric()) {
            return Err(PdError::validation(format!(
                "{aggregation:?} needs numeric values, column `{value_column}` holds {}",
                bad.kind()
            )));
        }
    }

    let timestamps = events
        .values
        .column(ts_idx)
        .iter()
        .map(|v| match v {
            Value::Null => Ok(None),
            Value::Time(t) => Ok(Some(*t)),
            Value::Str(s) => parse_time(s, &options.time_format).map(Some),
            other => Err(PdError::validation(format!(
                "timestamp column `{timestamp_column}` holds {}",
                other.kind()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let keys: Vec<Option<Vec<Value>>> = events
        .values
        .rows()
        .into_iter()
        .map(|row| {
            let key = key_indices.iter().map(|&j| row[j].clone()).collect_vec();
            (!key.iter().any(Value::is_null)).then_some(key)
        })
        .collect();
    let distinct: BTreeMap<&[Value], usize> = keys
        .iter()
        .flatten()
        .map(Vec::as_slice)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(g, key)| (key, g))
        .collect();

    let boundaries = window_boundaries(start, end, step);
    let num_windows = boundaries.len().saturating_sub(1);
    // cells[group][window], `None` until aggregated or filled
    let mut cells: Vec<Vec<Option<Value>>> = vec![vec![None; num_windows]; distinct.len()];
    for (w, window) in boundaries.windows(2).enumerate() {
        let (window_start, window_end) = (window[0], window[1]);
        let mut grouped: BTreeMap<usize, Vec<Value>> = BTreeMap::new();
        for (i, (ts, key)) in timestamps.iter().zip(&keys).enumerate() {
            let (Some(ts), Some(key)) = (ts, key) else {
                continue;
            };
            if !options.window_closure.contains(window_start, window_end, *ts) {
                continue;
            }
            let values = grouped.entry(distinct[key.as_slice()]).or_default();
            let value = &events.values[[i, value_idx]];
            if !value.is_null() {
                values.push(value.clone());
            }
        }
        for (g, values) in grouped {
            if values.is_empty() {
                continue;
            }
            let aggregated = aggregation.apply(&values);
            if !aggregated.is_null() {
                cells[g][w] = Some(aggregated);
            }
        }
    }
    cells.iter_mut().for_each(|group| fill(group, fill_policy));

    let mut names = vec![timestamp_column.to_string()];
    if group_by_columns.is_empty() {
        names.extend(distinct.keys().map(|_| value_column.to_string()));
    } else {
        names.extend(
            distinct
                .keys()
                .map(|key| key.iter().join(&options.key_separator)),
        );
    }
    let names = unique_names(names);
    let mut values = Array2::<Value>::default((num_windows, names.len()));
    for (w, window_start) in boundaries.iter().take(num_windows).enumerate() {
        values[[w, 0]] = Value::Time(*window_start);
        for (g, group) in cells.iter().enumerate() {
            values[[w, g + 1]] = group[w].clone().unwrap_or_else(|| default_value.clone());
        }
    }

    tracing::debug!(
        events = events.nrows(),
        windows = num_windows,
        groups = distinct.len(),
        ?aggregation,
        "snapshot pivot finished"
    );
    Table::new(Array1::from(names), values)
}

/// key display forms are not unique (`Int(1)` and `Float(1.0)` both read `1`), later
/// duplicates get `_2`, `_3`, ... until the name is free
fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let mut n = 2;
            let mut candidate = format!("{name}_{n}");
            while taken.contains(&candidate) {
                n += 1;
                candidate = format!("{name}_{n}");
            }
            taken.insert(candidate.clone());
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn window_boundaries(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: TimeDelta,
) -> Vec<NaiveDateTime> {
    let mut boundaries = Vec::new();
    let mut current = Some(start);
    while let Some(boundary) = current.filter(|b| *b <= end) {
        boundaries.push(boundary);
        current = boundary.checked_add_signed(step);
    }
    boundaries
}

/// propagate the nearest set cell into empty ones, following `policy`
fn fill(cells: &mut [Option<Value>], policy: FillPolicy) {
    match policy {
        FillPolicy::None => {}
        FillPolicy::Forward => carry(cells.iter_mut()),
        FillPolicy::Backward => carry(cells.iter_mut().rev()),
    }
}

fn carry<'a>(cells: impl Iterator<Item = &'a mut Option<Value>>) {
    let mut last: Option<Value> = None;
    for cell in cells {
        match cell {
            Some(v) => last = Some(v.clone()),
            None => *cell = last.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::df::frame::test_util::ints;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn text(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&v| Value::from(v)).collect()
    }

    /// `a`: 3 in the first hour, 7 in the second; `b`: 5 in the first hour only
    fn events() -> Table {
        Table::from_columns([
            (
                "ts",
                text(&[
                    "2024-03-01 00:10:00",
                    "2024-03-01 00:20:00",
                    "2024-03-01 00:30:00",
                    "2024-03-01 01:30:00",
                ]),
            ),
            ("key", text(&["a", "a", "b", "a"])),
            ("v", ints(&[1, 2, 5, 7])),
        ])
        .unwrap()
    }

    fn pivot(events: &Table, aggregation: Aggregation, fill_policy: FillPolicy) -> Table {
        pivot_events_to_snapshots(
            events,
            &aggregation,
            "2024-03-01 00:00:00",
            "2024-03-01 02:00:00",
            "ts",
            "1h",
            &["key"],
            "v",
            fill_policy,
            Value::Int(-1),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_cells_use_default_without_fill() {
        let out = pivot(&events(), Aggregation::Sum, FillPolicy::None);
        assert_eq!(out.column_names(), vec!["ts", "a", "b"]);
        assert_eq!(
            out.column("ts").unwrap().to_vec(),
            vec![Value::Time(at(0, 0)), Value::Time(at(1, 0))]
        );
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[3, 7]));
        assert_eq!(out.column("b").unwrap().to_vec(), ints(&[5, -1]));
    }

    #[test]
    fn test_forward_and_backward_fill() {
        let out = pivot(&events(), Aggregation::Sum, FillPolicy::Forward);
        assert_eq!(out.column("b").unwrap().to_vec(), ints(&[5, 5]));

        let late = Table::from_columns([
            ("ts", vec![Value::Time(at(1, 15))]),
            ("key", text(&["c"])),
            ("v", ints(&[4])),
        ])
        .unwrap();
        let out = pivot(&late, Aggregation::Sum, FillPolicy::Backward);
        assert_eq!(out.column("c").unwrap().to_vec(), ints(&[4, 4]));
        let out = pivot(&late, Aggregation::Sum, FillPolicy::Forward);
        assert_eq!(out.column("c").unwrap().to_vec(), ints(&[-1, 4]));
    }

    #[test]
    fn test_boundary_event_is_counted_in_both_windows() {
        let on_edge = Table::from_columns([
            ("ts", vec![Value::Time(at(1, 0))]),
            ("key", text(&["a"])),
            ("v", ints(&[9])),
        ])
        .unwrap();
        let out = pivot(&on_edge, Aggregation::Sum, FillPolicy::None);
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[9, 9]));

        let options = PivotOptions {
            window_closure: WindowClosure::Left,
            ..Default::default()
        };
        let out = pivot_events_to_snapshots_with(
            &on_edge,
            &Aggregation::Sum,
            at(0, 0),
            at(2, 0),
            "ts",
            TimeDelta::hours(1),
            &["key"],
            "v",
            FillPolicy::None,
            Value::Null,
            &options,
        )
        .unwrap();
        assert_eq!(
            out.column("a").unwrap().to_vec(),
            vec![Value::Null, Value::Int(9)]
        );
    }

    #[test]
    fn test_windows() {
        assert_eq!(window_boundaries(at(0, 0), at(2, 30), TimeDelta::hours(1)).len(), 3);
        assert_eq!(window_boundaries(at(0, 0), at(0, 0), TimeDelta::hours(1)).len(), 1);
        assert!(window_boundaries(at(2, 0), at(0, 0), TimeDelta::hours(1)).is_empty());

        let out = pivot_events_to_snapshots(
            &events(),
            &Aggregation::Sum,
            "2024-03-01 02:00:00",
            "2024-03-01 00:00:00",
            "ts",
            "1h",
            &["key"],
            "v",
            FillPolicy::Forward,
            Value::Null,
        )
        .unwrap();
        assert_eq!(out.shape(), (0, 3));
    }

    #[test]
    fn test_aggregations() {
        let column = |aggregation: Aggregation| {
            pivot(&events(), aggregation, FillPolicy::None)
                .column("a")
                .unwrap()
                .to_vec()
        };
        assert_eq!(
            column(Aggregation::Mean),
            vec![Value::Float(1.5), Value::Float(7.0)]
        );
        assert_eq!(column(Aggregation::Count), ints(&[2, 1]));
        assert_eq!(column(Aggregation::Min), ints(&[1, 7]));
        assert_eq!(column(Aggregation::Max), ints(&[2, 7]));
        assert_eq!(column(Aggregation::First), ints(&[1, 7]));
        assert_eq!(column(Aggregation::Last), ints(&[2, 7]));
        let product = Aggregation::custom(|values| {
            Value::Float(values.iter().filter_map(Value::as_f64).product())
        });
        assert_eq!(
            column(product),
            vec![Value::Float(2.0), Value::Float(7.0)]
        );
        assert_eq!(Aggregation::Sum.apply(&[Value::Int(1), Value::Float(0.5)]), Value::Float(1.5));
        assert_eq!(Aggregation::Sum.apply(&[Value::Int(i64::MAX), Value::Int(1)]), Value::Float(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn test_multiple_keys_and_no_keys() {
        let events = Table::from_columns([
            ("ts", vec![Value::Time(at(0, 5)), Value::Time(at(0, 6)), Value::Time(at(0, 7))]),
            ("k1", text(&["x", "x", "y"])),
            ("k2", vec![Value::Int(1), Value::Int(2), Value::Null]),
            ("v", ints(&[10, 20, 30])),
        ])
        .unwrap();
        let out = pivot_events_to_snapshots(
            &events,
            &Aggregation::Sum,
            at(0, 0),
            at(1, 0),
            "ts",
            "1h",
            &["k1", "k2"],
            "v",
            FillPolicy::None,
            Value::Null,
        )
        .unwrap();
        // the row with a null key is dropped
        assert_eq!(out.column_names(), vec!["ts", "x_1", "x_2"]);
        assert_eq!(out.row(0).to_vec()[1..], ints(&[10, 20])[..]);

        let out = pivot_events_to_snapshots(
            &events,
            &Aggregation::Sum,
            at(0, 0),
            at(1, 0),
            "ts",
            "1h",
            &[],
            "v",
            FillPolicy::None,
            Value::Null,
        )
        .unwrap();
        assert_eq!(out.column_names(), vec!["ts", "v"]);
        assert_eq!(out.column("v").unwrap().to_vec(), ints(&[60]));
    }

    #[test]
    fn test_validation() {
        let events = events();
        let run = |step: &str, group_by: &[&str], value: &str, aggregation: Aggregation| {
            pivot_events_to_snapshots(
                &events,
                &aggregation,
                "2024-03-01 00:00:00",
                "2024-03-01 02:00:00",
                "ts",
                step,
                group_by,
                value,
                FillPolicy::None,
                Value::Null,
            )
        };
        let err = run("1h", &["nope"], "missing", Aggregation::Sum).unwrap_err();
        assert!(err.to_string().contains("`nope`") && err.to_string().contains("`missing`"));
        assert!(matches!(run("", &["key"], "v", Aggregation::Sum), Err(PdError::Validation(_))));
        assert!(matches!(run("1.5h", &["key"], "v", Aggregation::Sum), Err(PdError::Validation(_))));
        assert!(matches!(run("1h", &["v"], "key", Aggregation::Mean), Err(PdError::Validation(_))));
        assert!(run("1h", &["v"], "key", Aggregation::Last).is_ok());
    }

    #[test]
    fn test_unparseable_timestamp() {
        let bad_ts = Table::from_columns([
            ("ts", text(&["yesterday"])),
            ("key", text(&["a"])),
            ("v", ints(&[1])),
        ])
        .unwrap();
        let err = pivot_events_to_snapshots(
            &bad_ts,
            &Aggregation::Sum,
            "2024-03-01",
            "2024-03-01 02:00:00",
            "ts",
            "1h",
            &["key"],
            "v",
            FillPolicy::None,
            Value::Null,
        )
        .unwrap_err();
        assert!(matches!(err, PdError::Parse(_)));
    }

    #[test]
    fn test_tokens() {
        assert_eq!("ffill".parse::<FillPolicy>().unwrap(), FillPolicy::Forward);
        assert_eq!("backfill".parse::<FillPolicy>().unwrap(), FillPolicy::Backward);
        assert!("nearest".parse::<FillPolicy>().is_err());
        assert!(matches!("mean".parse::<Aggregation>().unwrap(), Aggregation::Mean));
        assert!("median".parse::<Aggregation>().is_err());
        assert_eq!("left".parse::<WindowClosure>().unwrap(), WindowClosure::Left);
        assert!("right".parse::<WindowClosure>().is_err());
    }

    fn single_window(events: &Table, group_by: &[&str], aggregation: &Aggregation) -> Table {
        pivot_events_to_snapshots(
            events,
            aggregation,
            at(0, 0),
            at(1, 0),
            "ts",
            "1h",
            group_by,
            "v",
            FillPolicy::None,
            Value::Int(-1),
        )
        .unwrap()
    }

    #[test]
    fn test_colliding_column_names_are_suffixed() {
        let named_like_ts = Table::from_columns([
            ("ts", vec![Value::Time(at(0, 5))]),
            ("key", text(&["ts"])),
            ("v", ints(&[1])),
        ])
        .unwrap();
        let out = single_window(&named_like_ts, &["key"], &Aggregation::Sum);
        assert_eq!(out.column_names(), vec!["ts", "ts_2"]);
        assert_eq!(out.column("ts_2").unwrap().to_vec(), ints(&[1]));

        let int_and_float = Table::from_columns([
            ("ts", vec![Value::Time(at(0, 5)), Value::Time(at(0, 6))]),
            ("key", vec![Value::Int(1), Value::Float(1.0)]),
            ("v", ints(&[1, 2])),
        ])
        .unwrap();
        let out = single_window(&int_and_float, &["key"], &Aggregation::Sum);
        assert_eq!(out.column_names(), vec!["ts", "1", "1_2"]);
        assert_eq!(out.row(0).to_vec()[1..], ints(&[1, 2])[..]);

        let joined_alike = Table::from_columns([
            ("ts", vec![Value::Time(at(0, 5)), Value::Time(at(0, 6))]),
            ("k1", text(&["x", "x_1"])),
            ("k2", text(&["1_2", "2"])),
            ("v", ints(&[1, 2])),
        ])
        .unwrap();
        let out = single_window(&joined_alike, &["k1", "k2"], &Aggregation::Sum);
        assert_eq!(out.column_names(), vec!["ts", "x_1_2", "x_1_2_2"]);
        assert_eq!(out.row(0).to_vec()[1..], ints(&[1, 2])[..]);
    }

    #[test]
    fn test_unique_names() {
        let names = |raw: &[&str]| unique_names(raw.iter().map(|n| n.to_string()).collect());
        assert_eq!(names(&["a", "b"]), vec!["a", "b"]);
        assert_eq!(names(&["a", "a", "a_2", "a"]), vec!["a", "a_3", "a_2", "a_4"]);
    }

    #[test]
    fn test_all_null_group_skips_aggregation() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let events = Table::from_columns([
            ("ts", vec![Value::Time(at(0, 5))]),
            ("key", text(&["a"])),
            ("v", vec![Value::Null]),
        ])
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = calls.clone();
            Aggregation::custom(move |values| {
                calls.fetch_add(1, Ordering::SeqCst);
                Value::Int(values.len() as i64)
            })
        };
        let out = single_window(&events, &["key"], &counted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[-1]));

        let out = single_window(&events, &["key"], &Aggregation::Count);
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[-1]));
        let out = single_window(&events, &["key"], &Aggregation::Sum);
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[-1]));
    }

    #[test]
    fn test_events_outside_windows_are_ignored() {
        let events = Table::from_columns([
            (
                "ts",
                vec![
                    Value::Time(at(0, 30)),
                    Value::Time(at(1, 30)),
                    Value::Time(at(3, 10)),
                    Value::Time(at(5, 0)),
                ],
            ),
            ("key", text(&["a", "a", "a", "a"])),
            ("v", ints(&[100, 1, 1_000, 10_000])),
        ])
        .unwrap();
        // boundaries 1:00, 2:00, 3:00; the partial window up to 3:15 is dropped
        let out = pivot_events_to_snapshots(
            &events,
            &Aggregation::Sum,
            at(1, 0),
            at(3, 15),
            "ts",
            "1h",
            &["key"],
            "v",
            FillPolicy::None,
            Value::Int(-1),
        )
        .unwrap();
        assert_eq!(
            out.column("ts").unwrap().to_vec(),
            vec![Value::Time(at(1, 0)), Value::Time(at(2, 0))]
        );
        assert_eq!(out.column("a").unwrap().to_vec(), ints(&[1, -1]));
    }
}
