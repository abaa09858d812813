use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters shared by every worker of one run. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    files_scanned: Arc<AtomicUsize>,
    files_skipped: Arc<AtomicUsize>,
    bytes_read: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a file that was read and matched
    pub fn record_scanned(&self, bytes: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        let total = self.bytes_read.fetch_add(bytes, Ordering::Relaxed) + bytes;
        debug!("Read {} bytes, total: {} bytes", bytes, total);
    }

    /// Records a file skipped after a read failure
    pub fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds counts reported by a worker that kept its own counters
    pub fn absorb(&self, files_scanned: usize, files_skipped: usize) {
        self.files_scanned.fetch_add(files_scanned, Ordering::Relaxed);
        self.files_skipped.fetch_add(files_skipped, Ordering::Relaxed);
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned.load(Ordering::Relaxed)
    }

    pub fn files_skipped(&self) -> usize {
        self.files_skipped.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub fn log_stats(&self) {
        info!(
            "Scan metrics: {} files scanned, {} skipped, {} bytes read",
            self.files_scanned(),
            self.files_skipped(),
            self.bytes_read()
        );
    }
}
