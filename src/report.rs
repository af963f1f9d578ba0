use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::CrossCheckError;

/// Default report file name, relative to the working directory.
pub const DEFAULT_REPORT_FILE: &str = "missed_zips.txt";

/// Collects a notice for every archive that matched nothing.
///
/// `record` may be called from any number of workers at once; each message
/// lands exactly once. Order across workers is whatever order they finished
/// in. `flush` is meant to run once, after the completion barrier.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    messages: Mutex<Vec<String>>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Record the standard notice for an unmatched archive.
    pub fn record_missed(&self, archive_name: &str) {
        self.record(missed_message(archive_name));
    }

    /// Snapshot of everything recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write a timestamped header and then one line per recorded message to
    /// a new file at `path`, replacing any previous report.
    pub fn flush(&self, path: &Path) -> Result<(), CrossCheckError> {
        let io_err = |source| CrossCheckError::Io {
            path: path.to_path_buf(),
            source,
        };

        let messages = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);

        writeln!(out, "{}", report_header(chrono::Local::now())).map_err(io_err)?;
        for message in messages.iter() {
            writeln!(out, "{message}").map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;

        tracing::info!(path = %path.display(), missed = messages.len(), "report written");
        Ok(())
    }
}

/// The notice recorded for an archive with no matching line.
pub fn missed_message(archive_name: &str) -> String {
    format!("Zip file \"{archive_name}\" does not contain any input from searchstrings!")
}

fn report_header(at: chrono::DateTime<chrono::Local>) -> String {
    format!(
        "--- Missed zip files for cross checking at: {} ---",
        at.format("%a %b %d %H:%M:%S %Z %Y")
    )
}
