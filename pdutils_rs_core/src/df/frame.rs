use super::{ColumnsDtype, Value};
use ndarray::{Array1, Array2};

mod indexing;
mod meta;
mod ops;

/// an ordered set of named columns over positional rows
///
/// `values` is laid out as `(rows, columns)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Array1<ColumnsDtype>,
    pub values: Array2<Value>,
}
