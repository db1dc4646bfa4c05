use std::path::PathBuf;

use clap::Parser;

use crate::domain::TVConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tabex",
    version,
    about = "Pick tabular data files from a directory and explore them in a terminal grid"
)]
pub struct Args {
    /// Directory to scan, defaults to the current one
    #[arg(default_value = ".")]
    pub dir: String,

    /// File extensions to look for
    #[arg(short, long = "ext", value_delimiter = ',', default_values = [".csv", ".dat", ".txt"])]
    pub extensions: Vec<String>,

    /// Answer the selection prompt instead of asking, e.g. "1,3" or "" for all
    #[arg(long)]
    pub select: Option<String>,

    /// Lines looked at when guessing the delimiter
    #[arg(long, default_value_t = 20)]
    pub sniff_lines: usize,

    /// Rows used to infer column types
    #[arg(long, default_value_t = 100)]
    pub infer_schema_length: usize,

    #[arg(long, default_value_t = 40)]
    pub max_column_width: usize,

    /// Milliseconds between terminal event polls
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Write a trace log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn config(&self) -> TVConfig {
        TVConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_max_column_width(self.max_column_width)
            .with_sniff_lines(self.sniff_lines)
            .with_infer_schema_length(self.infer_schema_length)
    }
}
