use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::archive::ArchiveHandle;
use crate::error::CrossCheckError;
use crate::traits::Source;

/// Every regular file directly inside a folder, in file-name order.
///
/// Hidden files are included and no ignore rules apply; subdirectories are
/// not descended into.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Source for DirectorySource {
    fn archives(&self) -> Result<Vec<ArchiveHandle>, CrossCheckError> {
        Ok(list_files(&self.root)?
            .into_iter()
            .map(ArchiveHandle::new)
            .collect())
    }
}

/// Fail with [`CrossCheckError::InvalidFolder`] unless `path` is an existing
/// directory.
pub fn check_folder(path: &Path) -> Result<(), CrossCheckError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CrossCheckError::InvalidFolder(path.to_path_buf()))
    }
}

/// List the regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CrossCheckError> {
    check_folder(dir)?;

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| map_ignore_error(dir, e))?;
        if entry.depth() == 0 {
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The token file of a search folder: its first regular file by name.
pub fn first_file(dir: &Path) -> Result<PathBuf, CrossCheckError> {
    list_files(dir)?
        .into_iter()
        .next()
        .ok_or_else(|| CrossCheckError::MissingTokenFile(dir.to_path_buf()))
}

fn map_ignore_error(dir: &Path, e: ignore::Error) -> CrossCheckError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => CrossCheckError::Io { path, source },
            other => CrossCheckError::Io {
                path,
                source: std::io::Error::other(other.to_string()),
            },
        },
        ignore::Error::Io(source) => CrossCheckError::Io {
            path: dir.to_path_buf(),
            source,
        },
        other => CrossCheckError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}
