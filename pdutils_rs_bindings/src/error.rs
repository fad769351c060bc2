//! Python exception types exposed by the `pdutils` module.

use pdutils_core::PdError;
use pyo3::{create_exception, exceptions::PyException, prelude::*};

create_exception!(
    pdutils,
    PdUtilsError,
    PyException,
    "Base exception for pdutils."
);

create_exception!(
    pdutils,
    ValidationError,
    PdUtilsError,
    "Raised when inputs are invalid: missing columns, unknown mode tokens, bad steps."
);

create_exception!(
    pdutils,
    ParseError,
    PdUtilsError,
    "Raised when a duration or a timestamp can't be parsed."
);

create_exception!(
    pdutils,
    TypeMismatchError,
    PdUtilsError,
    "Raised when arguments don't match the declared parameter types."
);

pub fn to_py_err(err: PdError) -> PyErr {
    let msg = err.to_string();
    match err {
        PdError::Validation(_) => ValidationError::new_err(msg),
        PdError::Parse(_) => ParseError::new_err(msg),
        PdError::TypeMismatch(_) => TypeMismatchError::new_err(msg),
        PdError::Shape(_) | PdError::ThreadPool(_) => PdUtilsError::new_err(msg),
    }
}

/// expose every exception type on `module`
pub fn add_exceptions(module: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = module.py();
    module.add("PdUtilsError", py.get_type_bound::<PdUtilsError>())?;
    module.add("ValidationError", py.get_type_bound::<ValidationError>())?;
    module.add("ParseError", py.get_type_bound::<ParseError>())?;
    module.add("TypeMismatchError", py.get_type_bound::<TypeMismatchError>())?;
    Ok(())
}
