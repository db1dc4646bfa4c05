use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::grid::GridModel;

/// Case-insensitive row filter applied across all columns.
///
/// The pattern is used as a regex. Text that does not compile as one is
/// matched literally instead.
#[derive(Debug, Default)]
pub struct RowFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl RowFilter {
    pub fn new(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self::default();
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .or_else(|e| {
                debug!("Filter {pattern:?} is not a regex ({e}), matching literally");
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
            })
            .ok();
        Self {
            pattern: pattern.to_string(),
            regex,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(text),
            None => true,
        }
    }

    pub fn row_matches(&self, grid: &GridModel, row: usize) -> bool {
        (0..grid.column_count()).any(|c| self.matches(grid.cell(row, c)))
    }

    /// Table positions of every row that passes the filter, in table order.
    pub fn visible_rows(&self, grid: &GridModel) -> Vec<usize> {
        if !self.is_active() {
            return (0..grid.row_count()).collect();
        }
        let rows: Vec<usize> = (0..grid.row_count())
            .into_par_iter()
            .filter(|&r| self.row_matches(grid, r))
            .collect();
        trace!(
            "Filter {:?} keeps {} of {} rows",
            self.pattern,
            rows.len(),
            grid.row_count()
        );
        rows
    }
}
