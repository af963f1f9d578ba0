use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrossCheckError {
    // Config
    #[error("folder does not exist or is not a directory: {}", .0.display())]
    InvalidFolder(PathBuf),

    #[error("no token file found in {}", .0.display())]
    MissingTokenFile(PathBuf),

    #[error("missing {0}")]
    MissingInput(&'static str),

    #[error("invalid batch size")]
    InvalidBatchSize(usize),

    #[error("invalid worker count")]
    InvalidWorkerCount(usize),

    // Archives
    #[error("cannot read archive {}", path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive has no entries: {}", .0.display())]
    EmptyArchive(PathBuf),

    #[error("archive entry is not valid text: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Runtime
    #[error("thread pool failure")]
    ThreadPool(String),

    #[error("{pending} task(s) still running at deadline")]
    Timeout { pending: usize },
}

impl CrossCheckError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InvalidFolder(p)
            | Self::MissingTokenFile(p)
            | Self::EmptyArchive(p)
            | Self::ArchiveRead { path: p, .. }
            | Self::Decode { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the run can continue after this error.
    ///
    /// Per-archive failures (unreadable archive, undecodable entry, failed
    /// extraction) only skip the archive they occurred on. Everything else
    /// aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ArchiveRead { .. } | Self::EmptyArchive(_) | Self::Decode { .. } | Self::Io { .. }
        )
    }

    /// Classify an IO error raised while reading an archive entry.
    pub(crate) fn entry_read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::InvalidData {
            Self::Decode { path, source }
        } else {
            Self::Io { path, source }
        }
    }
}
