use std::sync::Arc;

use tracing::trace;

use crate::domain::{SortOrder, TVError};
use crate::filter::RowFilter;
use crate::grid::GridModel;
use crate::table::Table;

pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const COLUMN_MIN_WIDTH: usize = 3;
pub const COLUMN_SPACING: usize = 1;

/// A column that made it onto the screen and how wide it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleColumn {
    pub idx: usize,
    pub width: usize,
}

/// One loaded file: its grid, its filter and where the user is looking.
pub struct Session {
    pub name: String,
    pub info: String,
    grid: GridModel,
    filter: RowFilter,
    rows: Arc<Vec<usize>>, // Mapping of view row to table row
    curser_row: usize,     // Position in `rows`
    curser_column: usize,  // Table column index
    offset_row: usize,
    offset_column: usize,
    visible_columns: Vec<VisibleColumn>,
    height: usize,
}

impl Session {
    pub fn new(name: impl Into<String>, info: impl Into<String>, table: Table) -> Self {
        let grid = GridModel::new(table);
        let rows = Arc::new((0..grid.row_count()).collect());
        Self {
            name: name.into(),
            info: info.into(),
            grid,
            filter: RowFilter::default(),
            rows,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            offset_column: 0,
            visible_columns: Vec::new(),
            height: 0,
        }
    }

    pub fn title(&self) -> String {
        format!("Viewer: {}", self.name)
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    pub fn rows(&self) -> Arc<Vec<usize>> {
        Arc::clone(&self.rows)
    }

    pub fn curser(&self) -> (usize, usize) {
        (self.curser_row, self.curser_column)
    }

    pub fn offset_row(&self) -> usize {
        self.offset_row
    }

    pub fn visible_columns(&self) -> &[VisibleColumn] {
        &self.visible_columns
    }

    /// Table rows currently on screen, paired with their view position.
    pub fn page(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let end = std::cmp::min(self.offset_row + self.height, self.rows.len());
        (self.offset_row..end).map(|pos| (pos, self.rows[pos]))
    }

    pub fn status_line(&self) -> String {
        let mut status = format!(
            "Rows: {} | Columns: {}",
            self.grid.row_count(),
            self.grid.column_count()
        );
        if self.filter.is_active() {
            status.push_str(&format!(" | Showing: {}", self.rows.len()));
        }
        status
    }

    /// Width of the row label column.
    pub fn index_width(&self) -> usize {
        self.grid.row_count().saturating_sub(1).to_string().len()
    }

    pub fn set_filter(&mut self, pattern: &str) {
        if pattern == self.filter.pattern() {
            return;
        }
        trace!("Filter {:?} on {}", pattern, self.name);
        self.filter = RowFilter::new(pattern);
        self.refresh_rows();
    }

    pub fn sort(&mut self, column: usize, order: SortOrder) -> Result<(), TVError> {
        self.grid.sort(column, order)?;
        self.refresh_rows();
        Ok(())
    }

    pub fn toggle_sort(&mut self, column: usize) -> Result<SortOrder, TVError> {
        let order = self.grid.toggle_sort(column)?;
        self.refresh_rows();
        Ok(order)
    }

    /// Sorts by the cursor column; `None` toggles like a header click.
    pub fn sort_current_column(
        &mut self,
        order: Option<SortOrder>,
    ) -> Result<SortOrder, TVError> {
        match order {
            Some(order) => self.sort(self.curser_column, order).map(|_| order),
            None => self.toggle_sort(self.curser_column),
        }
    }

    // Full rescan; row counts are small enough that nothing is cached.
    fn refresh_rows(&mut self) {
        self.rows = Arc::new(self.filter.visible_rows(&self.grid));
        self.curser_row = std::cmp::min(self.curser_row, self.rows.len().saturating_sub(1));
        self.scroll_rows();
    }

    pub fn move_up(&mut self, size: usize) {
        self.curser_row = self.curser_row.saturating_sub(size);
        self.scroll_rows();
    }

    pub fn move_down(&mut self, size: usize) {
        let last = self.rows.len().saturating_sub(1);
        self.curser_row = std::cmp::min(self.curser_row + size, last);
        self.scroll_rows();
    }

    pub fn move_beginning(&mut self) {
        self.curser_row = 0;
        self.scroll_rows();
    }

    pub fn move_end(&mut self) {
        self.curser_row = self.rows.len().saturating_sub(1);
        self.scroll_rows();
    }

    pub fn move_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.curser_column + 1 < self.grid.column_count() {
            self.curser_column += 1;
        }
    }

    pub fn select_column(&mut self, column: usize) {
        if column < self.grid.column_count() {
            self.curser_column = column;
        }
    }

    fn scroll_rows(&mut self) {
        if self.curser_row < self.offset_row {
            self.offset_row = self.curser_row;
        } else if self.height > 0 && self.curser_row >= self.offset_row + self.height {
            self.offset_row = self.curser_row + 1 - self.height;
        }
        // Do not leave empty space at the bottom after the row set shrank.
        let max_offset = self.rows.len().saturating_sub(self.height.max(1));
        self.offset_row = std::cmp::min(self.offset_row, max_offset);
    }

    fn column_width(&self, column: usize, max_column_width: usize) -> usize {
        let width = self.grid.content_width(column) + COLUMN_WIDTH_MARGIN;
        width.clamp(COLUMN_MIN_WIDTH, max_column_width.max(COLUMN_MIN_WIDTH))
    }

    fn fit_columns(
        &self,
        offset: usize,
        width: usize,
        max_column_width: usize,
    ) -> Vec<VisibleColumn> {
        let mut visible = Vec::new();
        let mut used = 0;
        for idx in offset..self.grid.column_count() {
            let spacing = if visible.is_empty() { 0 } else { COLUMN_SPACING };
            let column_width = self.column_width(idx, max_column_width);
            if used + spacing + column_width <= width {
                visible.push(VisibleColumn {
                    idx,
                    width: column_width,
                });
                used += spacing + column_width;
            } else {
                // Last, partially visible column
                let remaining = width.saturating_sub(used + spacing);
                if remaining >= COLUMN_MIN_WIDTH || visible.is_empty() {
                    visible.push(VisibleColumn {
                        idx,
                        width: remaining,
                    });
                }
                break;
            }
        }
        visible
    }

    /// Recomputes which rows and columns fit into a `width` x `height` grid
    /// and scrolls so the cursor stays on screen.
    pub fn update_viewport(&mut self, width: usize, height: usize, max_column_width: usize) {
        self.height = height;
        self.scroll_rows();

        if self.curser_column < self.offset_column {
            self.offset_column = self.curser_column;
        }
        let mut visible = self.fit_columns(self.offset_column, width, max_column_width);
        // Move right until the cursor column is fully on screen.
        while self.offset_column < self.curser_column
            && !visible.iter().any(|c| {
                c.idx == self.curser_column
                    && c.width >= self.column_width(c.idx, max_column_width)
            })
        {
            self.offset_column += 1;
            visible = self.fit_columns(self.offset_column, width, max_column_width);
        }
        trace!(
            "Viewport {}x{}: rows {}.., columns {:?}",
            width,
            height,
            self.offset_row,
            visible.iter().map(|c| c.idx).collect::<Vec<_>>()
        );
        self.visible_columns = visible;
    }

    /// Table column under a horizontal position relative to the first data
    /// column.
    pub fn column_at(&self, x: usize) -> Option<usize> {
        let mut start = 0;
        for column in self.visible_columns.iter() {
            if x >= start && x < start + column.width {
                return Some(column.idx);
            }
            start += column.width + COLUMN_SPACING;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;
    use crate::table::Column;

    fn session(nrows: usize) -> Session {
        let ids = (0..nrows).map(|i| Some(i.to_string())).collect();
        let names = (0..nrows).map(|i| Some(format!("name{}", i % 3))).collect();
        let notes = (0..nrows).map(|_| Some("x".repeat(30))).collect();
        let table = Table::new(vec![
            Column::new("id", DataType::Int64, ids),
            Column::new("name", DataType::String, names),
            Column::new("notes", DataType::String, notes),
        ])
        .unwrap();
        Session::new("data.csv", "Loaded successfully using Comma Separated", table)
    }

    #[test]
    fn status_line_reports_shape_and_filter() {
        let mut s = session(6);
        assert_eq!(s.title(), "Viewer: data.csv");
        assert_eq!(s.status_line(), "Rows: 6 | Columns: 3");
        s.set_filter("NAME1");
        assert_eq!(*s.rows(), vec![1, 4]);
        assert_eq!(s.status_line(), "Rows: 6 | Columns: 3 | Showing: 2");
        s.set_filter("");
        assert_eq!(s.rows().len(), 6);
        assert_eq!(s.status_line(), "Rows: 6 | Columns: 3");
    }

    #[test]
    fn cursor_is_clamped_when_rows_disappear() {
        let mut s = session(10);
        s.update_viewport(80, 4, 40);
        s.move_end();
        assert_eq!(s.curser().0, 9);
        assert_eq!(s.offset_row(), 6);
        s.set_filter("name2");
        assert_eq!(s.rows().len(), 3);
        assert_eq!(s.curser().0, 2);
        assert_eq!(s.offset_row(), 0);
        s.set_filter("nothing matches this");
        assert_eq!(s.curser().0, 0);
        assert_eq!(s.page().count(), 0);
    }

    #[test]
    fn paging_scrolls_the_view() {
        let mut s = session(20);
        s.update_viewport(80, 5, 40);
        s.move_down(7);
        assert_eq!(s.curser().0, 7);
        assert_eq!(s.offset_row(), 3);
        assert_eq!(s.page().map(|(_, r)| r).collect::<Vec<_>>(), [3, 4, 5, 6, 7]);
        s.move_up(100);
        assert_eq!(s.curser().0, 0);
        assert_eq!(s.offset_row(), 0);
    }

    #[test]
    fn sorting_keeps_the_filter() {
        let mut s = session(6);
        s.set_filter("name0");
        assert_eq!(*s.rows(), vec![0, 3]);
        assert_eq!(s.sort_current_column(None).unwrap(), SortOrder::Ascending);
        assert_eq!(s.sort_current_column(None).unwrap(), SortOrder::Descending);
        // Table is now 5..0, rows with name0 are ids 3 and 0.
        let ids: Vec<&str> = s.rows().iter().map(|&r| s.grid().cell(r, 0)).collect();
        assert_eq!(ids, ["3", "0"]);
    }

    #[test]
    fn columns_scroll_to_keep_cursor_visible() {
        let mut s = session(3);
        // id: 3, name: 6, notes: 31 -> capped to 20
        s.update_viewport(15, 5, 20);
        let idx: Vec<usize> = s.visible_columns().iter().map(|c| c.idx).collect();
        assert_eq!(idx, [0, 1, 2]);
        assert_eq!(s.visible_columns()[2].width, 4);

        s.move_right();
        s.move_right();
        s.update_viewport(15, 5, 20);
        assert_eq!(s.visible_columns()[0].idx, 2);
        assert_eq!(s.visible_columns()[0].width, 15);
        assert_eq!(s.column_at(3), Some(2));
    }

    #[test]
    fn column_at_maps_positions() {
        let mut s = session(3);
        s.update_viewport(80, 5, 40);
        assert_eq!(s.column_at(0), Some(0));
        assert_eq!(s.column_at(2), Some(0));
        assert_eq!(s.column_at(3), None);
        assert_eq!(s.column_at(4), Some(1));
        assert_eq!(s.column_at(200), None);
    }
}
