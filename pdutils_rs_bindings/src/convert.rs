//! conversions between Python objects and core values.
//!
//! - `None` and float NaN become [`Value::Null`]
//! - objects with an `isoformat` method (`datetime.datetime`) become [`Value::Time`]
//! - a table crosses the boundary as a `dict` of column name -> column, where a column is
//!   either a 1d numpy array (`float64`, `int64` or `bool`) or any Python iterable
//!
//! with `abi3` there is no direct access to `datetime` internals, so times travel as ISO
//! strings in both directions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use numpy::PyReadonlyArray1;
use pdutils_core::df::{Table, Value};
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyBool, PyDict, PyFloat, PyList, PyLong, PyString},
};

use crate::error::to_py_err;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub struct PyValue(pub Value);

fn float_or_null(v: f64) -> Value {
    if v.is_nan() {
        Value::Null
    } else {
        Value::Float(v)
    }
}

/// `datetime.date` cells land on midnight
fn parse_iso(text: &str) -> PyResult<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .or_else(|_| {
            text.parse::<NaiveDate>()
                .map(|d| d.and_time(NaiveTime::default()))
        })
        .map_err(|e| PyTypeError::new_err(format!("unsupported datetime `{text}`: {e}")))
}

impl<'py> FromPyObject<'py> for PyValue {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let value = if ob.is_none() {
            Value::Null
        } else if ob.is_instance_of::<PyBool>() {
            Value::Bool(ob.extract()?)
        } else if ob.is_instance_of::<PyLong>() {
            Value::Int(ob.extract()?)
        } else if ob.is_instance_of::<PyFloat>() {
            float_or_null(ob.extract()?)
        } else if ob.is_instance_of::<PyString>() {
            Value::Str(ob.extract()?)
        } else if ob.hasattr("isoformat")? {
            let text: String = ob.call_method0("isoformat")?.extract()?;
            Value::Time(parse_iso(&text)?)
        } else if let Ok(v) = ob.extract::<i64>() {
            Value::Int(v)
        } else if let Ok(v) = ob.extract::<f64>() {
            float_or_null(v)
        } else {
            return Err(PyTypeError::new_err(format!(
                "unsupported cell type {}",
                ob.get_type()
            )));
        };
        Ok(PyValue(value))
    }
}

pub fn value_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    let object = match value {
        Value::Null => py.None(),
        Value::Bool(v) => v.to_object(py),
        Value::Int(v) => v.to_object(py),
        Value::Float(v) => v.to_object(py),
        Value::Str(v) => v.to_object(py),
        Value::Time(v) => py
            .import_bound("datetime")?
            .getattr("datetime")?
            .call_method1("fromisoformat", (v.format(ISO_FORMAT).to_string(),))?
            .unbind(),
    };
    Ok(object)
}

fn extract_column(ob: &Bound<'_, PyAny>) -> PyResult<Vec<Value>> {
    if let Ok(array) = ob.extract::<PyReadonlyArray1<f64>>() {
        return Ok(array.as_array().iter().map(|&v| float_or_null(v)).collect());
    }
    if let Ok(array) = ob.extract::<PyReadonlyArray1<i64>>() {
        return Ok(array.as_array().iter().map(|&v| Value::Int(v)).collect());
    }
    if let Ok(array) = ob.extract::<PyReadonlyArray1<bool>>() {
        return Ok(array.as_array().iter().map(|&v| Value::Bool(v)).collect());
    }
    ob.iter()?
        .map(|item| item.and_then(|item| item.extract::<PyValue>()).map(|v| v.0))
        .collect()
}

pub struct PyTable(pub Table);

impl<'py> FromPyObject<'py> for PyTable {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let dict = ob.downcast::<PyDict>()?;
        let mut columns = Vec::with_capacity(dict.len());
        for (name, column) in dict.iter() {
            columns.push((name.extract::<String>()?, extract_column(&column)?));
        }
        Table::from_columns(columns).map(PyTable).map_err(to_py_err)
    }
}

/// `dict` of column name -> `list` of cells, in column order
pub fn table_to_py<'py>(py: Python<'py>, table: &Table) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (j, name) in table.columns.iter().enumerate() {
        let cells = table
            .values
            .column(j)
            .iter()
            .map(|v| value_to_py(py, v))
            .collect::<PyResult<Vec<_>>>()?;
        dict.set_item(name, PyList::new_bound(py, cells))?;
    }
    Ok(dict)
}

