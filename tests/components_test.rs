mod common;

use std::fs::{self, File};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{output_files, write_archive, write_archive_entries};
use crosscheck::{
    entry_base_name, first_file, list_files, partition, process_batch, scan, scan_lines,
    ArchiveHandle, CompletionBarrier, CrossCheckError, Extractor, MatchVerdict, ReportAggregator,
    RunContext, TokenSet, WorkerPool,
};
use zip::ZipWriter;

fn handles(n: usize) -> Vec<ArchiveHandle> {
    (0..n)
        .map(|i| ArchiveHandle::new(format!("/zips/{i}.zip")))
        .collect()
}

// ---------------------------------------------------------------------------
// TokenSet
// ---------------------------------------------------------------------------

#[test]
fn token_file_lines_collapse_and_strip_terminators() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.txt");
    fs::write(&path, "alpha\r\nbeta\nalpha\n gamma\n").unwrap();

    let tokens = TokenSet::load(&path).unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.contains("alpha"));
    assert!(tokens.contains("beta"));
    assert!(tokens.contains(" gamma"), "no trimming beyond the terminator");
    assert!(!tokens.contains("gamma"));
}

#[test]
fn unreadable_token_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TokenSet::load(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, CrossCheckError::Io { .. }));
    assert!(err.path().is_some());
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[test]
fn scan_lines_matches_iff_a_line_is_a_token() {
    let tokens = TokenSet::from_lines(["alpha", "beta"]);
    fn lines(ls: &[&str]) -> Vec<io::Result<String>> {
        ls.iter().map(|l| Ok(l.to_string())).collect()
    }

    assert_eq!(
        scan_lines(lines(&["gamma", "beta", "alpha"]), &tokens).unwrap(),
        MatchVerdict::Matched { line: "beta".into() }
    );
    assert_eq!(
        scan_lines(lines(&["alphabet", "Beta", ""]), &tokens).unwrap(),
        MatchVerdict::Unmatched
    );
    assert_eq!(
        scan_lines(Vec::<io::Result<String>>::new(), &tokens).unwrap(),
        MatchVerdict::Unmatched
    );
}

#[test]
fn scan_lines_stops_at_the_first_match() {
    let tokens = TokenSet::from_lines(["alpha"]);
    let mut reads = 0;
    let source = std::iter::from_fn(|| {
        reads += 1;
        match reads {
            1 => Some(Ok("alpha".to_string())),
            _ => panic!("line source read past the first match"),
        }
    });

    let verdict = scan_lines(source, &tokens).unwrap();
    assert!(verdict.is_match());
}

#[test]
fn scan_lines_propagates_read_errors() {
    let tokens = TokenSet::from_lines(["alpha"]);
    let source = vec![
        Ok("x".to_string()),
        Err(io::Error::new(io::ErrorKind::InvalidData, "bad bytes")),
    ];
    let err = scan_lines(source, &tokens).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn scan_reads_the_archive_entry() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenSet::from_lines(["alpha"]);
    let hit = write_archive(dir.path(), "hit.zip", "a.txt", &["gamma", "alpha"]);
    let miss = write_archive(dir.path(), "miss.zip", "b.txt", &["delta"]);

    assert_eq!(
        scan(&ArchiveHandle::new(hit), &tokens).unwrap(),
        MatchVerdict::Matched { line: "alpha".into() }
    );
    assert_eq!(
        scan(&ArchiveHandle::new(miss), &tokens).unwrap(),
        MatchVerdict::Unmatched
    );
}

#[test]
fn scan_uses_only_the_first_of_several_entries() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenSet::from_lines(["alpha"]);
    let path = write_archive_entries(
        dir.path(),
        "multi.zip",
        &[("first.txt", &["delta"][..]), ("second.txt", &["alpha"][..])],
    );

    assert_eq!(
        scan(&ArchiveHandle::new(path), &tokens).unwrap(),
        MatchVerdict::Unmatched
    );
}

#[test]
fn scan_rejects_empty_and_broken_archives() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenSet::from_lines(["alpha"]);

    let empty = dir.path().join("empty.zip");
    ZipWriter::new(File::create(&empty).unwrap()).finish().unwrap();
    let err = scan(&ArchiveHandle::new(&empty), &tokens).unwrap_err();
    assert!(matches!(err, CrossCheckError::EmptyArchive(_)));

    let broken = dir.path().join("broken.zip");
    fs::write(&broken, "plain text").unwrap();
    let err = scan(&ArchiveHandle::new(&broken), &tokens).unwrap_err();
    assert!(matches!(err, CrossCheckError::ArchiveRead { .. }));
    assert!(err.is_recoverable());

    let missing = dir.path().join("missing.zip");
    let err = scan(&ArchiveHandle::new(&missing), &tokens).unwrap_err();
    assert!(matches!(err, CrossCheckError::Io { .. }));
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

#[test]
fn base_name_is_the_file_name_before_the_first_dot() {
    assert_eq!(entry_base_name("data.txt"), "data");
    assert_eq!(entry_base_name("data.tar.gz"), "data");
    assert_eq!(entry_base_name("nested/dir/file.csv"), "file");
    assert_eq!(entry_base_name("noext"), "noext");
    assert_eq!(entry_base_name(".hidden"), "entry");
}

#[test]
fn extraction_never_overwrites_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("data0.txt"), "keep me").unwrap();
    fs::write(out.join("data1.txt"), "keep me too").unwrap();

    let archive = write_archive(dir.path(), "a.zip", "data.txt", &["alpha"]);
    let written = Extractor::new()
        .extract(&ArchiveHandle::new(archive), &out)
        .unwrap();

    assert_eq!(written, out.join("data2.txt"));
    assert_eq!(fs::read_to_string(&written).unwrap(), "alpha\n");
    assert_eq!(fs::read_to_string(out.join("data0.txt")).unwrap(), "keep me");
    assert_eq!(fs::read_to_string(out.join("data1.txt")).unwrap(), "keep me too");
}

#[test]
fn concurrent_extractions_of_one_base_name_produce_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let a = ArchiveHandle::new(write_archive(dir.path(), "a.zip", "same.txt", &["from a"]));
    let b = ArchiveHandle::new(write_archive(dir.path(), "b.zip", "same.txt", &["from b"]));

    let extractor = Extractor::new();
    let (ra, rb) = thread::scope(|s| {
        let ta = s.spawn(|| extractor.extract(&a, &out));
        let tb = s.spawn(|| extractor.extract(&b, &out));
        (ta.join().unwrap(), tb.join().unwrap())
    });

    assert_ne!(ra.unwrap(), rb.unwrap());
    assert_eq!(output_files(&out).len(), 2);
}

#[test]
fn extraction_into_a_missing_directory_fails_with_io() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(dir.path(), "a.zip", "data.txt", &["alpha"]);
    let err = Extractor::new()
        .extract(&ArchiveHandle::new(archive), &dir.path().join("gone"))
        .unwrap_err();
    assert!(matches!(err, CrossCheckError::Io { .. }));
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[test]
fn concurrent_records_are_all_kept() {
    let report = ReportAggregator::new();
    assert!(report.is_empty());
    thread::scope(|s| {
        for t in 0..8 {
            let report = &report;
            s.spawn(move || {
                for i in 0..250 {
                    report.record(format!("{t}-{i}"));
                }
            });
        }
    });

    let mut messages = report.messages();
    assert_eq!(messages.len(), 2000);
    assert_eq!(report.len(), 2000);
    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), 2000, "no message recorded twice");
}

#[test]
fn flush_writes_header_then_messages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    let report = ReportAggregator::new();
    report.record_missed("a.zip");
    report.record_missed("b.zip");
    assert_eq!(report.len(), 2);
    report.flush(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("--- Missed zip files for cross checking at: "));
    assert!(lines[0].ends_with(" ---"));
    // weekday, month, day, time, zone, year
    let stamp = lines[0]
        .trim_start_matches("--- Missed zip files for cross checking at: ")
        .trim_end_matches(" ---");
    assert_eq!(stamp.split_whitespace().count(), 6, "timestamp with zone: {stamp}");
    assert_eq!(lines[1], "Zip file \"a.zip\" does not contain any input from searchstrings!");
    assert_eq!(lines[2], "Zip file \"b.zip\" does not contain any input from searchstrings!");
}

// ---------------------------------------------------------------------------
// Partitioning and dispatch
// ---------------------------------------------------------------------------

#[test]
fn partition_shape_and_order() {
    for (n, b) in [(0, 2), (1, 2), (2, 2), (5, 2), (7, 3), (9, 3), (4, 10)] {
        let files = handles(n);
        let batches = partition(files.clone(), b).unwrap();

        assert_eq!(batches.len(), n.div_ceil(b), "n={n} b={b}");
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.index, i);
            if i + 1 < batches.len() {
                assert_eq!(batch.len(), b);
            } else {
                assert!(!batch.is_empty() && batch.len() <= b);
            }
        }
        let flat: Vec<ArchiveHandle> = batches.into_iter().flat_map(|b| b.archives).collect();
        assert_eq!(flat, files);
    }
}

#[test]
fn partition_rejects_zero_batch_size() {
    assert!(matches!(
        partition(handles(3), 0),
        Err(CrossCheckError::InvalidBatchSize(0))
    ));
}

#[test]
fn a_failing_archive_does_not_stop_its_batch() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let broken = dir.path().join("broken.zip");
    fs::write(&broken, "garbage").unwrap();
    let miss = write_archive(dir.path(), "miss.zip", "m.txt", &["nope"]);

    let ctx = RunContext::new(Arc::new(TokenSet::from_lines(["alpha"])), &out);
    let batch = partition(vec![ArchiveHandle::new(broken), ArchiveHandle::new(miss)], 2)
        .unwrap()
        .remove(0);
    process_batch(&batch, &ctx);

    assert_eq!(ctx.report.messages(), vec![crosscheck::missed_message("miss.zip")]);
}

// ---------------------------------------------------------------------------
// Worker pool and completion barrier
// ---------------------------------------------------------------------------

#[test]
fn pool_runs_every_task() {
    let pool = WorkerPool::new(4, 2).unwrap();
    assert_eq!(pool.size(), 4);
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let counter = Arc::clone(&counter);
            pool.submit(i, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        })
        .collect();

    CompletionBarrier::new().await_all(&handles).unwrap();
    assert!(handles.iter().all(|h| h.is_done()));
    let ids: Vec<usize> = handles.iter().map(|h| h.id()).collect();
    assert_eq!(ids, (0..32).collect::<Vec<_>>());
    assert_eq!(counter.load(Ordering::SeqCst), 32);
}

#[test]
fn panicking_task_still_completes_and_worker_survives() {
    let pool = WorkerPool::new(1, 4).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    let bad = pool.submit(0, || panic!("boom")).unwrap();
    let ran_clone = Arc::clone(&ran);
    let good = pool
        .submit(1, move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    bad.wait();
    good.wait();
    assert!(bad.is_done() && good.is_done());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn barrier_times_out_on_a_stuck_task() {
    let pool = WorkerPool::new(2, 2).unwrap();
    let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(0);

    let quick = pool.submit(0, || {}).unwrap();
    let stuck = pool
        .submit(1, move || {
            let _ = release_rx.recv();
        })
        .unwrap();
    let handles = [quick, stuck];

    let err = CompletionBarrier::new()
        .progress_interval(Duration::from_millis(10))
        .deadline(Some(Duration::from_millis(50)))
        .await_all(&handles)
        .unwrap_err();
    assert!(matches!(err, CrossCheckError::Timeout { pending: 1 }));

    drop(release_tx);
    CompletionBarrier::new()
        .progress_interval(Duration::from_millis(10))
        .await_all(&handles)
        .unwrap();
}

#[test]
fn zero_workers_is_rejected() {
    assert!(matches!(
        WorkerPool::new(0, 1),
        Err(CrossCheckError::InvalidWorkerCount(0))
    ));
}

// ---------------------------------------------------------------------------
// Folder listing
// ---------------------------------------------------------------------------

#[test]
fn list_files_is_sorted_and_flat() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.zip"), "").unwrap();
    fs::write(dir.path().join("a.zip"), "").unwrap();
    fs::write(dir.path().join(".hidden.zip"), "").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c.zip"), "").unwrap();

    let names: Vec<String> = list_files(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, [".hidden.zip", "a.zip", "b.zip"]);

    assert_eq!(first_file(dir.path()).unwrap(), dir.path().join(".hidden.zip"));
}

#[test]
fn first_file_of_an_empty_folder_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        first_file(dir.path()),
        Err(CrossCheckError::MissingTokenFile(_))
    ));
    assert!(matches!(
        list_files(&dir.path().join("nope")),
        Err(CrossCheckError::InvalidFolder(_))
    ));
}
