use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::CrossCheckError;

/// A single input archive handed to the scanner and extractor.
///
/// Archives are expected to hold exactly one stored text entry. The handle
/// itself is cheap: nothing is opened until a scan or extraction needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    /// Full path to the archive.
    pub path: PathBuf,

    /// The archive's file name, used in log lines and the missed report.
    pub name: String,
}

impl ArchiveHandle {
    /// Build a handle from a path. The name is the final path component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }

    /// Open the archive and check that it has an entry to read.
    ///
    /// Only the first entry is ever used. Archives with more than one entry
    /// are accepted with a warning.
    pub(crate) fn open(&self) -> Result<ZipArchive<BufReader<File>>, CrossCheckError> {
        let file = File::open(&self.path).map_err(|source| CrossCheckError::Io {
            path: self.path.clone(),
            source,
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| {
            CrossCheckError::ArchiveRead {
                path: self.path.clone(),
                source,
            }
        })?;

        match archive.len() {
            0 => Err(CrossCheckError::EmptyArchive(self.path.clone())),
            1 => Ok(archive),
            n => {
                tracing::warn!(archive = %self.name, entries = n, "archive has more than one entry, using the first");
                Ok(archive)
            }
        }
    }

    pub(crate) fn read_error(&self, source: zip::result::ZipError) -> CrossCheckError {
        CrossCheckError::ArchiveRead {
            path: self.path.clone(),
            source,
        }
    }
}

impl From<PathBuf> for ArchiveHandle {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for ArchiveHandle {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}
