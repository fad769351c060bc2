use super::Table;
use crate::df::Value;
use ndarray::Array2;

impl Table {
    /// gather rows by position, a `None` position yields a row of [`Value::Null`]
    pub fn take_or_null(&self, positions: &[Option<usize>]) -> Table {
        let mut values = Array2::<Value>::default((positions.len(), self.ncols()));
        for (mut out, position) in values.rows_mut().into_iter().zip(positions) {
            if let Some(i) = *position {
                out.assign(&self.values.row(i));
            }
        }
        Table {
            columns: self.columns.clone(),
            values,
        }
    }
}
