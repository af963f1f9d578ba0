use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::archive::ArchiveHandle;
use crate::error::CrossCheckError;

/// Writes the entry of a matched archive into the output directory.
///
/// Output files are named `{base}{n}.txt`, where `base` is the entry's file
/// name up to its first `.` and `n` comes from a counter shared by every
/// worker using this extractor. Files are opened with create-new semantics:
/// if the name is already taken (by another run, or by a file the user put
/// there) the counter moves on, so an extraction never overwrites anything.
#[derive(Debug, Default)]
pub struct Extractor {
    next: AtomicU64,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the first entry of `archive` into `output_dir`.
    ///
    /// Returns the path of the file written.
    pub fn extract(
        &self,
        archive: &ArchiveHandle,
        output_dir: &Path,
    ) -> Result<PathBuf, CrossCheckError> {
        let mut zip = archive.open()?;
        let mut entry = zip.by_index(0).map_err(|e| archive.read_error(e))?;
        let base = entry_base_name(entry.name());

        let (target, file) = self.create_unique(output_dir, &base)?;
        let mut out = BufWriter::new(file);

        io::copy(&mut entry, &mut out)
            .and_then(|_| out.flush())
            .map_err(|source| CrossCheckError::Io {
                path: target.clone(),
                source,
            })?;

        Ok(target)
    }

    fn create_unique(
        &self,
        output_dir: &Path,
        base: &str,
    ) -> Result<(PathBuf, std::fs::File), CrossCheckError> {
        loop {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            let candidate = output_dir.join(format!("{base}{n}.txt"));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => {
                    return Err(CrossCheckError::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        }
    }
}

/// The part of an entry's file name before its first `.`.
///
/// Directory components inside the archive are dropped so the output always
/// lands directly in the output directory.
pub fn entry_base_name(entry_name: &str) -> String {
    let file_name = entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name);
    match file_name.split('.').next() {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => "entry".to_string(),
    }
}
