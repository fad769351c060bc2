use super::Table;
use crate::{
    df::{ColumnsDtype, Value},
    error::{PdError, Result},
};
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Axis};

impl Table {
    /// # Errors
    ///
    /// fails if column names are duplicated or if `values` does not have one column per name.
    pub fn new(columns: Array1<ColumnsDtype>, values: Array2<Value>) -> Result<Self> {
        if values.ncols() != columns.len() {
            return Err(PdError::validation(format!(
                "got {} column names for {} value columns",
                columns.len(),
                values.ncols()
            )));
        }
        if let Some(dup) = columns.iter().duplicates().next() {
            return Err(PdError::validation(format!("duplicated column `{dup}`")));
        }
        Ok(Self { columns, values })
    }

    /// build a table from `(name, column values)` pairs, all columns must share one length
    pub fn from_columns<N, I>(columns: I) -> Result<Self>
    where
        N: Into<ColumnsDtype>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        let (names, data): (Vec<ColumnsDtype>, Vec<Vec<Value>>) =
            columns.into_iter().map(|(n, d)| (n.into(), d)).unzip();
        let nrows = data.first().map_or(0, Vec::len);
        if let Some((name, column)) = names.iter().zip(&data).find(|(_, d)| d.len() != nrows) {
            return Err(PdError::validation(format!(
                "column `{name}` has {} rows, expected {nrows}",
                column.len()
            )));
        }
        let mut values = Array2::<Value>::default((nrows, names.len()));
        for (j, column) in data.into_iter().enumerate() {
            for (i, value) in column.into_iter().enumerate() {
                values[[i, j]] = value;
            }
        }
        Table::new(Array1::from(names), values)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, Value>> {
        self.column_index(name)
            .map(|j| self.values.index_axis(Axis(1), j))
    }
    pub fn row(&self, i: usize) -> ArrayView1<'_, Value> {
        self.values.row(i)
    }

    /// resolve every name to its column position
    ///
    /// # Errors
    ///
    /// a single [`PdError::Validation`] naming all the missing columns.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .unique()
            .collect();
        if !missing.is_empty() {
            return Err(PdError::validation(format!(
                "can't find column(s) {} in table with columns [{}]",
                missing.iter().map(|m| format!("`{m}`")).join(", "),
                self.columns.iter().join(", ")
            )));
        }
        Ok(names
            .iter()
            .filter_map(|n| self.column_index(n))
            .collect())
    }
}
