use std::cmp::Ordering;

use polars::prelude::DataType;
use tracing::trace;

use crate::domain::{NULL_SYMBOL, SortOrder, TVError};

pub struct Column {
    name: String,
    dtype: DataType,
    data: Vec<Option<String>>,
    max_width: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType, data: Vec<Option<String>>) -> Self {
        let name = name.into();
        let max_width = data
            .iter()
            .map(|v| v.as_deref().map_or(1, |s| s.chars().count()))
            .max()
            .unwrap_or(0);
        Self {
            name,
            dtype,
            data,
            max_width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Widest rendered cell in characters, header excluded.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    pub fn text(&self, row: usize) -> &str {
        self.data[row].as_deref().unwrap_or(NULL_SYMBOL)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self.dtype, DataType::Float32 | DataType::Float64)
    }

    fn sort_key(&self, row: usize) -> SortKey<'_> {
        let Some(s) = self.data[row].as_deref() else {
            return SortKey::Null;
        };
        if self.is_integer() {
            if let Ok(v) = s.trim().parse::<i128>() {
                return SortKey::Integer(v);
            }
        } else if self.is_float() {
            match s.trim().parse::<f64>() {
                Ok(v) if v.is_nan() => return SortKey::Null,
                Ok(v) => return SortKey::Float(v),
                Err(_) => (),
            }
        }
        SortKey::Text(s)
    }

    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", {:?}, width_max: {}, # rows {}",
            self.name,
            self.dtype,
            self.max_width,
            self.data.len(),
        )
    }
}

enum SortKey<'a> {
    Integer(i128),
    Float(f64),
    Text(&'a str),
    /// Missing values and NaN.
    Null,
}

impl SortKey<'_> {
    fn is_number(&self) -> bool {
        matches!(self, SortKey::Integer(_) | SortKey::Float(_))
    }

    // Nulls go last and numbers before text, whatever the direction.
    fn compare(&self, other: &Self, order: SortOrder) -> Ordering {
        let directed = |o: Ordering| match order {
            SortOrder::Ascending => o,
            SortOrder::Descending => o.reverse(),
        };
        match (self, other) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Null, _) => Ordering::Greater,
            (_, SortKey::Null) => Ordering::Less,
            (SortKey::Integer(a), SortKey::Integer(b)) => directed(a.cmp(b)),
            (SortKey::Float(a), SortKey::Float(b)) => directed(a.total_cmp(b)),
            (SortKey::Integer(a), SortKey::Float(b)) => directed((*a as f64).total_cmp(b)),
            (SortKey::Float(a), SortKey::Integer(b)) => directed(a.total_cmp(&(*b as f64))),
            (SortKey::Text(a), SortKey::Text(b)) => directed(a.cmp(b)),
            (a, _) if a.is_number() => Ordering::Less,
            _ => Ordering::Greater,
        }
    }
}

/// Column oriented table of display values with a row label index.
///
/// All columns and the index always have the same length.
pub struct Table {
    columns: Vec<Column>,
    index: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TVError> {
        let nrows = columns.first().map_or(0, |c| c.len());
        if let Some(c) = columns.iter().find(|c| c.len() != nrows) {
            return Err(TVError::LoadingFailed(format!(
                "column \"{}\" has {} rows, expected {}",
                c.name,
                c.len(),
                nrows
            )));
        }
        Ok(Self {
            columns,
            index: (0..nrows).collect(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn row_label(&self, row: usize) -> usize {
        self.index[row]
    }

    /// Reorders all rows, index included, by the values of one column.
    ///
    /// The sort is stable. The permutation is computed before anything is
    /// moved, so on error the table is left as it was.
    pub fn sort_by_column(&mut self, column: usize, order: SortOrder) -> Result<(), TVError> {
        let col = self
            .columns
            .get(column)
            .ok_or(TVError::InvalidColumn(column))?;
        let keys: Vec<SortKey> = (0..col.len()).map(|row| col.sort_key(row)).collect();

        let mut permutation: Vec<usize> = (0..self.nrows()).collect();
        permutation.sort_by(|&a, &b| keys[a].compare(&keys[b], order));
        trace!("Sorting by column {column} {order:?}");

        self.apply_permutation(&permutation);
        Ok(())
    }

    fn apply_permutation(&mut self, permutation: &[usize]) {
        for column in self.columns.iter_mut() {
            let mut old = std::mem::take(&mut column.data);
            column.data = permutation.iter().map(|&i| old[i].take()).collect();
        }
        self.index = permutation.iter().map(|&i| self.index[i]).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn sample() -> Table {
        Table::new(vec![
            Column::new("id", DataType::Int64, text(&["3", "10", "2", "10", "1"])),
            Column::new("name", DataType::String, text(&["c", "x", "b", "y", "a"])),
        ])
        .unwrap()
    }

    fn column_values(table: &Table, idx: usize) -> Vec<String> {
        let col = table.column(idx).unwrap();
        (0..table.nrows()).map(|r| col.text(r).to_string()).collect()
    }

    #[test]
    fn numeric_column_sorts_by_value() {
        let mut table = sample();
        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        assert_eq!(column_values(&table, 0), ["1", "2", "3", "10", "10"]);
        // Rows move together with their labels.
        assert_eq!(column_values(&table, 1), ["a", "b", "c", "x", "y"]);
        assert_eq!(
            (0..5).map(|r| table.row_label(r)).collect::<Vec<_>>(),
            [4, 2, 0, 1, 3]
        );
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let mut table = sample();
        table.sort_by_column(0, SortOrder::Descending).unwrap();
        assert_eq!(column_values(&table, 0), ["10", "10", "3", "2", "1"]);
        assert_eq!(column_values(&table, 1), ["x", "y", "c", "b", "a"]);
    }

    #[test]
    fn sort_is_a_permutation_and_idempotent() {
        let mut table = sample();
        let mut original = column_values(&table, 1);
        original.sort();

        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        let once = column_values(&table, 1);
        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        assert_eq!(column_values(&table, 1), once);

        table.sort_by_column(0, SortOrder::Descending).unwrap();
        let mut after = column_values(&table, 1);
        after.sort();
        assert_eq!(after, original);
    }

    #[test]
    fn nulls_sort_last() {
        let mut table = Table::new(vec![Column::new(
            "v",
            DataType::Float64,
            vec![None, Some("2.5".into()), Some("-1".into()), None],
        )])
        .unwrap();
        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        assert_eq!(column_values(&table, 0), ["-1", "2.5", NULL_SYMBOL, NULL_SYMBOL]);
        table.sort_by_column(0, SortOrder::Descending).unwrap();
        assert_eq!(column_values(&table, 0), ["2.5", "-1", NULL_SYMBOL, NULL_SYMBOL]);
    }

    #[test]
    fn nan_sorts_with_the_nulls() {
        let values: Vec<Option<String>> = (0..60)
            .map(|i| match i % 3 {
                0 => Some("NaN".to_string()),
                _ => Some(((i * 37) % 101).to_string() + ".5"),
            })
            .collect();
        let mut table = Table::new(vec![Column::new("v", DataType::Float64, values)]).unwrap();

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            table.sort_by_column(0, order).unwrap();
            let sorted = column_values(&table, 0);
            let numbers: Vec<f64> = sorted[..40].iter().map(|v| v.parse().unwrap()).collect();
            assert!(numbers.iter().all(|v| !v.is_nan()));
            assert!(numbers.windows(2).all(|w| match order {
                SortOrder::Ascending => w[0] <= w[1],
                SortOrder::Descending => w[0] >= w[1],
            }));
            assert!(sorted[40..].iter().all(|v| v == "NaN"));
        }
    }

    #[test]
    fn large_integers_keep_their_order() {
        let mut table = Table::new(vec![Column::new(
            "id",
            DataType::Int64,
            text(&["9007199254740993", "9007199254740992", "-9007199254740993"]),
        )])
        .unwrap();
        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&table, 0),
            ["-9007199254740993", "9007199254740992", "9007199254740993"]
        );
        table.sort_by_column(0, SortOrder::Descending).unwrap();
        assert_eq!(column_values(&table, 0)[0], "9007199254740993");
    }

    #[test]
    fn text_columns_sort_lexically() {
        let mut table = Table::new(vec![Column::new(
            "v",
            DataType::String,
            text(&["10", "9", "100"]),
        )])
        .unwrap();
        table.sort_by_column(0, SortOrder::Ascending).unwrap();
        assert_eq!(column_values(&table, 0), ["10", "100", "9"]);
    }

    #[test]
    fn invalid_column_leaves_table_untouched() {
        let mut table = sample();
        assert!(matches!(
            table.sort_by_column(7, SortOrder::Ascending),
            Err(TVError::InvalidColumn(7))
        ));
        assert_eq!(column_values(&table, 0), ["3", "10", "2", "10", "1"]);
        assert_eq!(table.row_label(0), 0);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let result = Table::new(vec![
            Column::new("a", DataType::String, text(&["1", "2"])),
            Column::new("b", DataType::String, text(&["1"])),
        ]);
        assert!(result.is_err());
    }
}
