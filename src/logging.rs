use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::TVError;

/// Sends tracing output to `log_file`. Without a file nothing is recorded,
/// so the terminal UI is never written over.
pub fn init(log_file: Option<&Path>, level: &str) -> Result<(), TVError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let filter = EnvFilter::try_new(level).map_err(|e| TVError::Logging(e.to_string()))?;
    let file = File::create(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::Logging(e.to_string()))
}
