#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a zip at `dir/name` holding one entry called `entry` with `lines`.
pub fn write_archive(dir: &Path, name: &str, entry: &str, lines: &[&str]) -> PathBuf {
    write_archive_entries(dir, name, &[(entry, lines)])
}

/// Write a zip at `dir/name` with the given entries, in order.
pub fn write_archive_entries(dir: &Path, name: &str, entries: &[(&str, &[&str])]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    for (entry, lines) in entries {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        for line in *lines {
            writeln!(zip, "{line}").unwrap();
        }
    }
    zip.finish().unwrap();
    path
}

/// Write a zip at `dir/name` whose single entry holds raw `bytes`.
pub fn write_archive_bytes(dir: &Path, name: &str, entry: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(bytes).unwrap();
    zip.finish().unwrap();
    path
}

/// Input, output and search folders plus a report path, all under one tempdir.
pub struct Workspace {
    pub dir:    tempfile::TempDir,
    pub input:  PathBuf,
    pub output: PathBuf,
    pub search: PathBuf,
    pub report: PathBuf,
}

pub fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zips");
    let output = dir.path().join("out");
    let search = dir.path().join("search");
    for d in [&input, &output, &search] {
        fs::create_dir(d).unwrap();
    }
    let report = dir.path().join("missed_zips.txt");
    Workspace {
        dir,
        input,
        output,
        search,
        report,
    }
}

/// Every file in the output folder.
pub fn output_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Report lines after the header.
pub fn report_body(report: &Path) -> Vec<String> {
    let text = fs::read_to_string(report).unwrap();
    let mut lines = text.lines();
    let header = lines.next().expect("report has a header line");
    assert!(header.starts_with("--- Missed zip files for cross checking at: "));
    lines.map(str::to_string).collect()
}
