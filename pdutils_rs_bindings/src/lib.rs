//! Some useful bindings for pyo3.
//!
//! # Design
//!
//! The core (`pdutils_core`) knows nothing about Python. This crate holds the glue that
//! every Python-facing crate built on top of the core needs:
//!
//! - [`convert`]: Python objects <-> [`Value`](pdutils_core::df::Value) /
//!   [`Table`](pdutils_core::df::Table)
//! - [`error`]: Python exception types and the mapping from
//!   [`PdError`](pdutils_core::PdError)
//! - [`register_submodule!`]: nested, importable submodules

pub mod convert;
pub mod error;

#[macro_export]
macro_rules! register_submodule {
    ($parent:expr, $hierarchy:expr) => {{
        let py = $parent.py();
        let module_name = $hierarchy.split('.').last().unwrap();
        let submodule = PyModule::new_bound(py, module_name)?;
        py_run!(
            py,
            submodule,
            concat!("import sys; sys.modules['", $hierarchy, "'] = submodule")
        );
        $parent.add_submodule(&submodule)?;
        submodule
    }};
}
