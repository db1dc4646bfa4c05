use crate::domain::{SortOrder, TVError};
use crate::table::Table;

/// Which column the table was last sorted by, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub order: SortOrder,
}

/// Exposes a [`Table`] to the grid renderer.
///
/// Every value is handed out as display text. Sorting reorders the owned
/// table in place.
pub struct GridModel {
    table: Table,
    sort_state: Option<SortState>,
}

impl GridModel {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            sort_state: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.table.nrows()
    }

    pub fn column_count(&self) -> usize {
        self.table.ncols()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.table
            .column(column)
            .map(|c| c.text(row))
            .unwrap_or_default()
    }

    pub fn column_label(&self, column: usize) -> &str {
        self.table.column(column).map(|c| c.name()).unwrap_or_default()
    }

    pub fn row_label(&self, row: usize) -> String {
        self.table.row_label(row).to_string()
    }

    /// Characters needed to show the widest value or the header of a column.
    pub fn content_width(&self, column: usize) -> usize {
        self.table.column(column).map_or(0, |c| {
            std::cmp::max(c.name().chars().count(), c.max_width())
        })
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort_state
    }

    pub fn sort(&mut self, column: usize, order: SortOrder) -> Result<(), TVError> {
        self.table.sort_by_column(column, order)?;
        self.sort_state = Some(SortState { column, order });
        Ok(())
    }

    /// Header click behaviour: a new column sorts ascending, the sorted
    /// column flips direction.
    pub fn toggle_sort(&mut self, column: usize) -> Result<SortOrder, TVError> {
        let order = match self.sort_state {
            Some(state) if state.column == column => state.order.toggled(),
            _ => SortOrder::Ascending,
        };
        self.sort(column, order)?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;
    use crate::table::Column;

    fn grid() -> GridModel {
        let table = Table::new(vec![
            Column::new(
                "value",
                DataType::Float64,
                vec![Some("2.0".into()), None, Some("1.5".into())],
            ),
            Column::new(
                "label",
                DataType::String,
                vec![Some("two".into()), Some("none".into()), Some("one and a half".into())],
            ),
        ])
        .unwrap();
        GridModel::new(table)
    }

    #[test]
    fn exposes_cells_and_headers_as_text() {
        let grid = grid();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.cell(0, 0), "2.0");
        assert_eq!(grid.cell(1, 0), "∅");
        assert_eq!(grid.column_label(1), "label");
        assert_eq!(grid.row_label(2), "2");
        assert_eq!(grid.content_width(0), 5);
        assert_eq!(grid.content_width(1), 14);
    }

    #[test]
    fn toggle_sort_flips_direction_on_the_same_column() {
        let mut grid = grid();
        assert_eq!(grid.toggle_sort(0).unwrap(), SortOrder::Ascending);
        assert_eq!(grid.cell(0, 0), "1.5");
        assert_eq!(grid.row_label(0), "2");

        assert_eq!(grid.toggle_sort(0).unwrap(), SortOrder::Descending);
        assert_eq!(grid.cell(0, 0), "2.0");
        assert_eq!(grid.cell(2, 0), "∅");

        assert_eq!(grid.toggle_sort(1).unwrap(), SortOrder::Ascending);
        assert_eq!(
            grid.sort_state(),
            Some(SortState {
                column: 1,
                order: SortOrder::Ascending
            })
        );
    }

    #[test]
    fn failed_sort_keeps_previous_state() {
        let mut grid = grid();
        grid.sort(0, SortOrder::Descending).unwrap();
        assert!(grid.sort(5, SortOrder::Ascending).is_err());
        assert_eq!(grid.sort_state().map(|s| s.column), Some(0));
        assert_eq!(grid.cell(0, 0), "2.0");
    }
}
