use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CrossCheckError;
use crate::extractor::Extractor;
use crate::report::ReportAggregator;
use crate::tokens::TokenSet;

/// Everything a task needs, built once by the engine and shared by every
/// task through an `Arc`.
///
/// `tokens` is read-only. The report, extracted paths and errors are
/// internally synchronized; counters are atomics.
pub struct RunContext {
    pub tokens:     Arc<TokenSet>,
    pub report:     ReportAggregator,
    pub extractor:  Extractor,
    pub output_dir: PathBuf,

    pub(crate) matched:   AtomicUsize,
    pub(crate) unmatched: AtomicUsize,
    pub(crate) failed:    AtomicUsize,
    pub(crate) extracted: Mutex<Vec<PathBuf>>,
    pub(crate) errors:    Mutex<Vec<CrossCheckError>>,
}

impl RunContext {
    pub fn new(tokens: Arc<TokenSet>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tokens,
            report:     ReportAggregator::new(),
            extractor:  Extractor::new(),
            output_dir: output_dir.into(),
            matched:    AtomicUsize::new(0),
            unmatched:  AtomicUsize::new(0),
            failed:     AtomicUsize::new(0),
            extracted:  Mutex::new(Vec::new()),
            errors:     Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn record_extracted(&self, path: PathBuf) {
        self.matched.fetch_add(1, Ordering::Relaxed);
        self.extracted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
    }

    pub(crate) fn record_unmatched(&self, archive_name: &str) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
        self.report.record_missed(archive_name);
    }

    pub(crate) fn take_extracted(&self) -> Vec<PathBuf> {
        take_locked(&self.extracted)
    }

    pub(crate) fn take_errors(&self) -> Vec<CrossCheckError> {
        take_locked(&self.errors)
    }

    pub(crate) fn record_failure(&self, err: CrossCheckError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }
}

fn take_locked<T>(items: &Mutex<Vec<T>>) -> Vec<T> {
    std::mem::take(&mut *items.lock().unwrap_or_else(PoisonError::into_inner))
}
