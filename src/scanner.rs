use std::io::{self, BufRead, BufReader};

use crate::archive::ArchiveHandle;
use crate::error::CrossCheckError;
use crate::tokens::TokenSet;

/// Outcome of scanning one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchVerdict {
    /// At least one line is a token. `line` is the first one found.
    Matched { line: String },

    /// The entry was read to the end without a hit.
    Unmatched,
}

impl MatchVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Scan the first entry of `archive` line by line against `tokens`.
///
/// Stops reading at the first matching line.
///
/// # Errors
///
/// - [`CrossCheckError::Io`] if the archive file cannot be opened
/// - [`CrossCheckError::ArchiveRead`] if it is not a readable zip archive
/// - [`CrossCheckError::EmptyArchive`] if it has no entries
/// - [`CrossCheckError::Decode`] if the entry is not UTF-8 text
pub fn scan(archive: &ArchiveHandle, tokens: &TokenSet) -> Result<MatchVerdict, CrossCheckError> {
    let mut zip = archive.open()?;
    let entry = zip.by_index(0).map_err(|e| archive.read_error(e))?;

    scan_lines(BufReader::new(entry).lines(), tokens)
        .map_err(|e| CrossCheckError::entry_read(archive.path.clone(), e))
}

/// The membership loop behind [`scan`], over any fallible line source.
///
/// Lines after the first match are never pulled from `lines`.
pub fn scan_lines<I>(lines: I, tokens: &TokenSet) -> io::Result<MatchVerdict>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    for line in lines {
        let line = line?;
        if tokens.contains(&line) {
            return Ok(MatchVerdict::Matched { line });
        }
    }
    Ok(MatchVerdict::Unmatched)
}
