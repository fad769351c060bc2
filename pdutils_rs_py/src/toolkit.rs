use pdutils_bindings::{
    convert::{value_to_py, PyValue},
    error::to_py_err,
};
use pdutils_core::{
    df::{Value, ValueKind},
    toolkit::{
        duration,
        logger::CallLogger,
        signature::{Param, Signature},
    },
};
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyBool, PyDict, PyFloat, PyLong, PyString, PyTuple},
};

/// parse a `NdNhNmNs` step into a `datetime.timedelta`
#[pyfunction]
#[pyo3(signature = (text, strict = false))]
pub fn parse_step(py: Python<'_>, text: String, strict: bool) -> PyResult<PyObject> {
    let delta = if strict {
        duration::parse_step_strict(&text)
    } else {
        duration::parse_step(&text)
    }
    .map_err(to_py_err)?;
    let seconds = delta.num_seconds();
    let timedelta = py
        .import_bound("datetime")?
        .getattr("timedelta")?
        .call1((0, seconds))?;
    Ok(timedelta.unbind())
}

/// runtime kind of an argument plus a loggable rendition of it
///
/// unlike table cells, NaN stays a float and objects outside the [`Value`] model are
/// [`ValueKind::Other`] (logged by their `repr`)
fn classify(ob: &Bound<'_, PyAny>) -> PyResult<(ValueKind, Value)> {
    let repr = || -> PyResult<Value> { Ok(Value::Str(ob.repr()?.extract()?)) };
    let classified = if ob.is_none() {
        (ValueKind::Null, Value::Null)
    } else if ob.is_instance_of::<PyBool>() {
        (ValueKind::Bool, Value::Bool(ob.extract()?))
    } else if ob.is_instance_of::<PyLong>() {
        let value = match ob.extract::<i64>() {
            Ok(v) => Value::Int(v),
            Err(_) => repr()?,
        };
        (ValueKind::Int, value)
    } else if ob.is_instance_of::<PyFloat>() {
        (ValueKind::Float, Value::Float(ob.extract()?))
    } else if ob.is_instance_of::<PyString>() {
        (ValueKind::Str, Value::Str(ob.extract()?))
    } else if ob.is_instance(&ob.py().import_bound("datetime")?.getattr("datetime")?)? {
        (ValueKind::Time, ob.extract::<PyValue>()?.0)
    } else {
        (ValueKind::Other, repr()?)
    };
    Ok(classified)
}

type Classified = (Vec<ValueKind>, Vec<Value>);

fn classify_args(args: &Bound<'_, PyTuple>) -> PyResult<Classified> {
    let mut classified = (Vec::with_capacity(args.len()), Vec::with_capacity(args.len()));
    for arg in args.iter() {
        let (kind, value) = classify(&arg)?;
        classified.0.push(kind);
        classified.1.push(value);
    }
    Ok(classified)
}

fn classify_kwargs(
    kwargs: Option<&Bound<'_, PyDict>>,
) -> PyResult<Vec<(String, ValueKind, Value)>> {
    let Some(kwargs) = kwargs else {
        return Ok(Vec::new());
    };
    kwargs
        .iter()
        .map(|(k, v)| {
            let (kind, value) = classify(&v)?;
            Ok((k.extract::<String>()?, kind, value))
        })
        .collect()
}

/// a callable that validates its arguments against a declared signature before
/// delegating, and logs every call
///
/// `params` is a list of `(name, annotation, default)` tuples where `annotation` is a
/// type name (`"int"`, `"str"`, ...) or `None`, and `default` is omitted when the tuple
/// only has two items.
#[pyclass]
pub struct TypeChecker {
    name: String,
    signature: Signature,
    func: PyObject,
}

#[pymethods]
impl TypeChecker {
    #[new]
    fn new<'py>(func: &Bound<'py, PyAny>, params: Vec<Bound<'py, PyTuple>>) -> PyResult<Self> {
        let mut signature = Signature::default();
        for entry in params {
            let mut param = Param::new(entry.get_item(0)?.extract::<String>()?);
            if let Some(annotation) = entry.get_item(1)?.extract::<Option<String>>()? {
                param = param.annotated(annotation.parse().map_err(to_py_err)?);
            }
            if entry.len() > 2 {
                let default = entry.get_item(2)?;
                let (kind, value) = classify(&default)?;
                if value.kind() != kind {
                    return Err(PyTypeError::new_err(format!(
                        "unsupported default {} for parameter `{}`",
                        default.repr()?,
                        param.name
                    )));
                }
                param = param.with_default(value);
            }
            signature = signature.param(param);
        }
        let name = func
            .getattr("__name__")
            .and_then(|n| n.extract::<String>())
            .unwrap_or_else(|_| "<callable>".to_string());
        Ok(Self {
            name,
            signature,
            func: func.clone().unbind(),
        })
    }

    #[pyo3(signature = (*args, **kwargs))]
    fn __call__(
        &self,
        py: Python<'_>,
        args: &Bound<'_, PyTuple>,
        kwargs: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<PyObject> {
        let (kinds, values) = classify_args(args)?;
        let classified_kwargs = classify_kwargs(kwargs)?;
        let kw_kinds: Vec<(&str, ValueKind)> = classified_kwargs
            .iter()
            .map(|(name, kind, _)| (name.as_str(), *kind))
            .collect();
        self.signature
            .check_kinds(&kinds, &kw_kinds)
            .map_err(to_py_err)?;
        let kw_values: Vec<(String, Value)> = classified_kwargs
            .into_iter()
            .map(|(name, _, value)| (name, value))
            .collect();
        let logger = CallLogger::new(self.name.as_str(), |_: &[Value], _: &[(String, Value)]| {
            self.func.call_bound(py, args.clone(), kwargs)
        });
        logger.call(&values, &kw_values)
    }

    /// the declared defaults, keyed by parameter name
    #[getter]
    fn defaults<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        for param in self.signature.params() {
            if let Some(default) = &param.default {
                dict.set_item(&param.name, value_to_py(py, default)?)?;
            }
        }
        Ok(dict)
    }
}
