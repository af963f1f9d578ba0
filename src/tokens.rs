use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CrossCheckError;

/// The set of search strings every archive line is tested against.
///
/// Loaded once before any work is dispatched and never mutated afterwards,
/// so workers share it behind an `Arc` with no locking.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    /// Read every line of the file at `path` into the set.
    ///
    /// Duplicate lines collapse. Line terminators (`\n` and `\r\n`) are
    /// stripped; no other trimming is done.
    ///
    /// # Errors
    ///
    /// Returns [`CrossCheckError::Io`] if the file cannot be opened or is not
    /// valid UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CrossCheckError> {
        let path = path.as_ref();
        let io_err = |source| CrossCheckError::Io {
            path: path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(io_err)?);
        let tokens = reader
            .lines()
            .collect::<Result<HashSet<_>, _>>()
            .map_err(io_err)?;

        Ok(Self { tokens })
    }

    /// Build a set from in-memory lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact membership test.
    pub fn contains(&self, line: &str) -> bool {
        self.tokens.contains(line)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
