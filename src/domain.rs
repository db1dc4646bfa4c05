use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

pub const NULL_SYMBOL: &str = "∅";

pub const HELP_TEXT: &str = "\
tabex - keys

  q            close the current file
  Q, Ctrl-c    quit
  Tab          next file
  Shift-Tab    previous file

  arrows, hjkl move the cursor
  PgUp, PgDn   move one page
  Home/g       first row
  End/G        last row

  / or f       edit the row filter (regex, case-insensitive)
  Enter        keep filter
  Esc          clear filter

  s            sort current column (toggles direction)
  S            sort current column descending
  mouse click  sort by clicked header

  ?            show this help
  Esc          close this help";

#[derive(Debug)]
pub enum TVError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    InvalidColumn(usize),
    FileNotFound,
    PermissionDenied,
    Logging(String),
}

impl fmt::Display for TVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TVError::IoError(e) => write!(f, "{e}"),
            TVError::PolarsError(e) => write!(f, "{e}"),
            TVError::LoadingFailed(msg) => write!(f, "{msg}"),
            TVError::InvalidColumn(idx) => write!(f, "column {idx} does not exist"),
            TVError::FileNotFound => write!(f, "file not found"),
            TVError::PermissionDenied => write!(f, "permission denied"),
            TVError::Logging(msg) => write!(f, "could not set up logging: {msg}"),
        }
    }
}

impl std::error::Error for TVError {}

impl From<Error> for TVError {
    fn from(err: Error) -> Self {
        TVError::IoError(err)
    }
}

impl From<PolarsError> for TVError {
    fn from(err: PolarsError) -> Self {
        TVError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TVConfig {
    /// Milliseconds to wait for a terminal event before redrawing.
    pub event_poll_time: u64,
    pub max_column_width: usize,
    /// Number of leading lines the delimiter sniffer looks at.
    pub sniff_lines: usize,
    pub infer_schema_length: usize,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            sniff_lines: 20,
            infer_schema_length: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    CloseSession,
    NextSession,
    PrevSession,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    ToggleSort,
    SortDescending,
    Filter,
    Help,
    Exit,
    Resize(usize, usize),
    Click(u16, u16),
    RawKey(KeyEvent),
}
