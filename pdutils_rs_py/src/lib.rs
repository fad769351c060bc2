mod df;
mod toolkit;

use pdutils_bindings::{error::add_exceptions, register_submodule};
use pyo3::{prelude::*, py_run};

#[pymodule]
fn pdutils(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pdutils_core::logging::init_logging();
    add_exceptions(m)?;

    let rs_module = register_submodule!(m, "pdutils._rs");
    let df_module = register_submodule!(rs_module, "pdutils._rs.df");
    let toolkit_module = register_submodule!(rs_module, "pdutils._rs.toolkit");

    df_module.add_function(wrap_pyfunction!(df::join_within_range, &df_module)?)?;
    df_module.add_function(wrap_pyfunction!(df::pivot_events_to_snapshots, &df_module)?)?;

    toolkit_module.add_function(wrap_pyfunction!(toolkit::parse_step, &toolkit_module)?)?;
    toolkit_module.add_class::<toolkit::TypeChecker>()?;

    Ok(())
}
