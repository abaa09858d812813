use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

use super::worker::ChunkScanner;
use crate::config::{EncodingMode, ScanMode};
use crate::errors::{ScanError, ScanResult};
use crate::keywords::KeywordSet;
use crate::metrics::ScanMetrics;
use crate::partition::partition;
use crate::results::{FinalResult, KeywordHits, ScanStats};

/// Thread-based driver.
///
/// Every worker is a task on a dedicated rayon pool with exactly one thread per worker.
/// All workers write into one `Mutex<KeywordHits>`; the lock is taken per (keyword, file)
/// hit, after the file has been read and lower-cased, so no I/O happens under it.
#[derive(Debug, Clone, Default)]
pub struct ThreadScanner {
    encoding_mode: EncodingMode,
}

impl ThreadScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding_mode: EncodingMode) -> Self {
        self.encoding_mode = encoding_mode;
        self
    }

    pub fn scan(
        &self,
        files: &[PathBuf],
        keywords: &KeywordSet,
        workers: usize,
    ) -> ScanResult<FinalResult> {
        let start = Instant::now();
        let ranges = partition(files.len(), workers)?;
        info!(
            "Scanning {} files for {} keywords on {} threads",
            files.len(),
            keywords.len(),
            workers
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("kwscan-worker-{}", i))
            .build()
            .map_err(|e| ScanError::worker_failed(format!("thread pool: {}", e)))?;

        let shared = Mutex::new(KeywordHits::new());
        let metrics = ScanMetrics::new();
        let encoding_mode = self.encoding_mode;

        // The scope returns only after every spawned worker has finished
        pool.scope(|s| {
            for (worker_id, range) in ranges.into_iter().enumerate() {
                let chunk = &files[range];
                let shared = &shared;
                let metrics = metrics.clone();
                s.spawn(move |_| {
                    debug!("Thread worker {} scanning {} files", worker_id, chunk.len());
                    let scanner = ChunkScanner::new(keywords, encoding_mode, metrics);
                    let counts = scanner.scan(chunk, |keyword, path| {
                        let mut hits = shared.lock().unwrap_or_else(PoisonError::into_inner);
                        hits.record(keyword.as_str(), path);
                    });
                    debug!(
                        "Thread worker {} done: {} scanned, {} skipped",
                        worker_id, counts.scanned, counts.skipped
                    );
                });
            }
        });

        let hits = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        metrics.log_stats();

        let result = FinalResult {
            hits,
            stats: ScanStats {
                files_scanned: metrics.files_scanned(),
                files_skipped: metrics.files_skipped(),
                workers,
                mode: ScanMode::Threads,
                elapsed: start.elapsed(),
            },
        };
        info!(
            "Thread scan complete: {} keywords matched in {:?}",
            result.hits.len(),
            result.stats.elapsed
        );
        Ok(result)
    }
}
