use super::Table;
use crate::error::{PdError, Result};
use ndarray::{concatenate, Axis};

impl Table {
    /// place the columns of `other` to the right of `self`
    pub fn hstack(&self, other: &Table) -> Result<Table> {
        if self.nrows() != other.nrows() {
            return Err(PdError::validation(format!(
                "can't hstack {} rows with {} rows",
                self.nrows(),
                other.nrows()
            )));
        }
        let columns = self.columns.iter().chain(other.columns.iter()).cloned().collect();
        let values = concatenate(Axis(1), &[self.values.view(), other.values.view()])?;
        Table::new(columns, values)
    }
}
