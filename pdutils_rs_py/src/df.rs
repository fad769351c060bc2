//! `pdutils._rs.df`: tables cross the boundary as `dict`s of columns, see
//! [`pdutils_bindings::convert`].

use std::sync::{Arc, Mutex};

use chrono::TimeDelta;

use pdutils_bindings::{
    convert::{table_to_py, value_to_py, PyTable, PyValue},
    error::to_py_err,
};
use pdutils_core::df::{
    self, Aggregation, FillPolicy, JoinOptions, PivotOptions, Step, TimeInput, Value,
    WindowClosure,
};
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyDict, PyList, PyString},
};

#[pyfunction]
#[pyo3(signature = (
    probe,
    range,
    probe_column,
    range_low_column,
    range_high_column,
    boundary = "[]".to_string(),
    how = "inner".to_string(),
    num_threads = 1,
))]
#[allow(clippy::too_many_arguments)]
pub fn join_within_range<'py>(
    py: Python<'py>,
    probe: PyTable,
    range: PyTable,
    probe_column: String,
    range_low_column: String,
    range_high_column: String,
    boundary: String,
    how: String,
    num_threads: usize,
) -> PyResult<Bound<'py, PyDict>> {
    let boundary = boundary.parse().map_err(to_py_err)?;
    let how = how.parse().map_err(to_py_err)?;
    let options = JoinOptions { num_threads };
    let joined = py
        .allow_threads(|| {
            df::join_within_range_with(
                &probe.0,
                &range.0,
                &probe_column,
                &range_low_column,
                &range_high_column,
                boundary,
                how,
                &options,
            )
        })
        .map_err(to_py_err)?;
    table_to_py(py, &joined)
}

fn extract_time(ob: &Bound<'_, PyAny>) -> PyResult<TimeInput> {
    match ob.extract::<PyValue>()?.0 {
        Value::Str(s) => Ok(TimeInput::Text(s)),
        Value::Time(t) => Ok(TimeInput::Time(t)),
        other => Err(PyTypeError::new_err(format!(
            "expected a str or a datetime, got {}",
            other.kind()
        ))),
    }
}

fn extract_step(ob: &Bound<'_, PyAny>) -> PyResult<Step> {
    if ob.is_instance_of::<PyString>() {
        return Ok(Step::Text(ob.extract()?));
    }
    // `datetime.timedelta`
    let seconds: f64 = ob.call_method0("total_seconds")?.extract()?;
    Ok(Step::Delta(TimeDelta::microseconds((seconds * 1e6).round() as i64)))
}

/// either an aggregation token or a python callable receiving a `list` of cells
fn extract_aggregation(
    ob: &Bound<'_, PyAny>,
    failure: &Arc<Mutex<Option<PyErr>>>,
) -> PyResult<Aggregation> {
    if ob.is_instance_of::<PyString>() {
        return ob.extract::<String>()?.parse().map_err(to_py_err);
    }
    if !ob.is_callable() {
        return Err(PyTypeError::new_err(
            "aggregation should be a str or a callable",
        ));
    }
    let func = ob.clone().unbind();
    let failure = failure.clone();
    Ok(Aggregation::custom(move |values| {
        Python::with_gil(|py| {
            let result = values
                .iter()
                .map(|v| value_to_py(py, v))
                .collect::<PyResult<Vec<_>>>()
                .and_then(|cells| func.call1(py, (PyList::new_bound(py, cells).unbind(),)))
                .and_then(|out| out.bind(py).extract::<PyValue>());
            match result {
                Ok(value) => value.0,
                Err(err) => {
                    if let Ok(mut slot) = failure.lock() {
                        slot.get_or_insert(err);
                    }
                    Value::Null
                }
            }
        })
    }))
}

#[pyfunction]
#[pyo3(signature = (
    events,
    aggregation,
    start_time,
    end_time,
    timestamp_column,
    step,
    group_by_columns,
    value_column,
    fill_policy = "none".to_string(),
    default_value = None,
    time_format = None,
    key_separator = "_".to_string(),
    closed = "both".to_string(),
))]
#[allow(clippy::too_many_arguments)]
pub fn pivot_events_to_snapshots<'py>(
    py: Python<'py>,
    events: PyTable,
    aggregation: &Bound<'py, PyAny>,
    start_time: &Bound<'py, PyAny>,
    end_time: &Bound<'py, PyAny>,
    timestamp_column: String,
    step: &Bound<'py, PyAny>,
    group_by_columns: Vec<String>,
    value_column: String,
    fill_policy: String,
    default_value: Option<PyValue>,
    time_format: Option<String>,
    key_separator: String,
    closed: String,
) -> PyResult<Bound<'py, PyDict>> {
    let failure = Arc::new(Mutex::new(None));
    let aggregation = extract_aggregation(aggregation, &failure)?;
    let start_time = extract_time(start_time)?;
    let end_time = extract_time(end_time)?;
    let step = extract_step(step)?;
    let fill_policy: FillPolicy = fill_policy.parse().map_err(to_py_err)?;
    let window_closure: WindowClosure = closed.parse().map_err(to_py_err)?;
    let mut options = PivotOptions {
        key_separator,
        window_closure,
        ..PivotOptions::default()
    };
    if let Some(time_format) = time_format {
        options.time_format = time_format;
    }
    let default_value = default_value.map_or(Value::Null, |v| v.0);
    let group_by_columns: Vec<&str> = group_by_columns.iter().map(String::as_str).collect();
    let snapshots = py
        .allow_threads(|| {
            df::pivot_events_to_snapshots_with(
                &events.0,
                &aggregation,
                start_time,
                end_time,
                &timestamp_column,
                step,
                &group_by_columns,
                &value_column,
                fill_policy,
                default_value,
                &options,
            )
        })
        .map_err(to_py_err)?;
    if let Some(err) = failure.lock().ok().and_then(|mut slot| slot.take()) {
        return Err(err);
    }
    table_to_py(py, &snapshots)
}
