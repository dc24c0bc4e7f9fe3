// src/table/feature_table.rs
//! Feature table: sorted key index and named columns with missing cells

use serde::Serialize;

use crate::error::{EmgError, EmgErrorBuilder, EmgResult};

/// One named output column; `None` marks a key the column has no value for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureColumn {
    /// Output label
    pub name: String,
    /// One cell per table row
    pub values: Vec<Option<f64>>,
}

/// Outer-joinable table of feature values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    index: Vec<i64>,
    columns: Vec<FeatureColumn>,
}

impl FeatureTable {
    /// Table with no rows and no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from dense columns over strictly increasing `keys`
    pub fn from_columns(keys: Vec<i64>, columns: Vec<(String, Vec<f64>)>) -> EmgResult<Self> {
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EmgErrorBuilder::new("feature_table", "from_columns")
                .invalid_data("index", "keys must be strictly increasing"));
        }

        let mut table = Self {
            index: keys,
            columns: Vec::with_capacity(columns.len()),
        };
        for (name, values) in columns {
            if values.len() != table.index.len() {
                return Err(EmgErrorBuilder::new("feature_table", "from_columns").invalid_data(
                    "column",
                    &format!("'{}' has {} values for {} keys", name, values.len(), table.index.len()),
                ));
            }
            table.push_column(FeatureColumn {
                name,
                values: values.into_iter().map(Some).collect(),
            })?;
        }
        Ok(table)
    }

    fn push_column(&mut self, column: FeatureColumn) -> EmgResult<()> {
        if self.column(&column.name).is_some() {
            return Err(EmgError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Union of both key sets, columns of `self` followed by columns of `other`
    ///
    /// Cells for keys a side does not have are `None`.
    pub fn outer_join(&self, other: &FeatureTable) -> EmgResult<FeatureTable> {
        if let Some(duplicate) = other.columns.iter().find(|c| self.column(&c.name).is_some()) {
            return Err(EmgError::DuplicateColumn(duplicate.name.clone()));
        }

        // Merge of two sorted key lists: (key, row in self, row in other)
        let mut merged: Vec<(i64, Option<usize>, Option<usize>)> =
            Vec::with_capacity(self.index.len().max(other.index.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.index.len() || j < other.index.len() {
            match (self.index.get(i), other.index.get(j)) {
                (Some(&a), Some(&b)) if a == b => {
                    merged.push((a, Some(i), Some(j)));
                    i += 1;
                    j += 1;
                }
                (Some(&a), Some(&b)) if a < b => {
                    merged.push((a, Some(i), None));
                    i += 1;
                }
                (Some(&a), None) => {
                    merged.push((a, Some(i), None));
                    i += 1;
                }
                (_, Some(&b)) => {
                    merged.push((b, None, Some(j)));
                    j += 1;
                }
                (None, None) => break,
            }
        }

        let reindex = |column: &FeatureColumn, pick: fn(&(i64, Option<usize>, Option<usize>)) -> Option<usize>| {
            FeatureColumn {
                name: column.name.clone(),
                values: merged
                    .iter()
                    .map(|row| pick(row).and_then(|r| column.values[r]))
                    .collect(),
            }
        };

        let columns = self
            .columns
            .iter()
            .map(|c| reindex(c, |row| row.1))
            .chain(other.columns.iter().map(|c| reindex(c, |row| row.2)))
            .collect();

        Ok(FeatureTable {
            index: merged.iter().map(|row| row.0).collect(),
            columns,
        })
    }

    /// Attach a column from another index, keeping only keys this table has
    ///
    /// Keys missing from `source_index` give `None`; nothing is filled.
    pub fn attach_column(&mut self, name: &str, source_index: &[i64], values: &[f64]) -> EmgResult<()> {
        if source_index.len() != values.len() {
            return Err(EmgErrorBuilder::new("feature_table", "attach_column").invalid_data(
                "column",
                &format!("'{}' has {} values for {} keys", name, values.len(), source_index.len()),
            ));
        }

        let reindexed = self
            .index
            .iter()
            .map(|key| source_index.binary_search(key).ok().map(|p| values[p]))
            .collect();

        self.push_column(FeatureColumn {
            name: name.to_string(),
            values: reindexed,
        })
    }

    /// Row keys, strictly increasing
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    /// Columns in join order
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    /// Column by label
    pub fn column(&self, name: &str) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Labels in join order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at `key` in `column`; `None` when either is absent or the cell is missing
    pub fn value(&self, key: i64, column: &str) -> Option<f64> {
        let row = self.index.binary_search(&key).ok()?;
        self.column(column).and_then(|c| c.values[row])
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(keys: Vec<i64>, name: &str, values: Vec<f64>) -> FeatureTable {
        FeatureTable::from_columns(keys, vec![(name.to_string(), values)]).unwrap()
    }

    #[test]
    fn test_outer_join_union() {
        let left = table(vec![1, 3, 5], "a", vec![10.0, 30.0, 50.0]);
        let right = table(vec![2, 3, 6], "b", vec![0.2, 0.3, 0.6]);

        let joined = left.outer_join(&right).unwrap();
        assert_eq!(joined.index(), &[1, 2, 3, 5, 6]);
        assert_eq!(joined.column_names(), vec!["a", "b"]);
        assert_eq!(
            joined.column("a").unwrap().values,
            vec![Some(10.0), None, Some(30.0), Some(50.0), None]
        );
        assert_eq!(
            joined.column("b").unwrap().values,
            vec![None, Some(0.2), Some(0.3), None, Some(0.6)]
        );
    }

    #[test]
    fn test_join_with_empty_table() {
        let left = table(vec![1, 2], "a", vec![1.0, 2.0]);
        let columns_only = FeatureTable::from_columns(vec![], vec![("b".to_string(), vec![])]).unwrap();

        let joined = FeatureTable::new().outer_join(&left).unwrap().outer_join(&columns_only).unwrap();
        assert_eq!(joined.index(), &[1, 2]);
        assert_eq!(joined.column("b").unwrap().values, vec![None, None]);
    }

    #[test]
    fn test_duplicate_column() {
        let left = table(vec![1], "a", vec![1.0]);
        assert!(matches!(left.outer_join(&left), Err(EmgError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_attach_column_without_fill() {
        let mut features = table(vec![4, 8, 12], "rms_1", vec![1.0, 2.0, 3.0]);
        let source_index = vec![0, 4, 8, 10];
        features
            .attach_column("label", &source_index, &[7.0, 8.0, 9.0, 10.0])
            .unwrap();

        assert_eq!(features.value(4, "label"), Some(8.0));
        assert_eq!(features.value(12, "label"), None);
        assert_eq!(features.width(), 2);
    }

    #[test]
    fn test_nan_is_not_missing() {
        let features = table(vec![1], "kurt_1", vec![f64::NAN]);
        assert!(features.column("kurt_1").unwrap().values[0].is_some());
    }
}
