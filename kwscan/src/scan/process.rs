use rayon::ThreadPoolBuilder;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::worker::WorkerTask;
use crate::config::{EncodingMode, ScanMode};
use crate::errors::{ScanError, ScanResult};
use crate::keywords::KeywordSet;
use crate::metrics::ScanMetrics;
use crate::partition::partition;
use crate::results::{FinalResult, KeywordHits, PartialResult, ScanStats};

/// Kills the child if it is dropped before being waited on.
struct ChildGuard(Option<Child>);

impl ChildGuard {
    fn child_mut(&mut self) -> ScanResult<&mut Child> {
        self.0
            .as_mut()
            .ok_or_else(|| ScanError::worker_failed("worker process already reaped"))
    }

    fn into_inner(mut self) -> ScanResult<Child> {
        self.0
            .take()
            .ok_or_else(|| ScanError::worker_failed("worker process already reaped"))
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.0.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Process-based driver.
///
/// Each chunk goes to its own OS process: `program` started with `args`, a JSON
/// [`WorkerTask`] on its stdin, and a JSON [`PartialResult`] expected on its stdout. Workers
/// share no memory. A supervising task per child forwards the decoded result into an mpsc
/// channel; the driver drains that channel only after every supervisor has returned.
#[derive(Debug, Clone)]
pub struct ProcessScanner {
    program: PathBuf,
    args: Vec<OsString>,
    encoding_mode: EncodingMode,
}

impl ProcessScanner {
    /// Workers are started as `program worker`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![OsString::from("worker")],
            encoding_mode: EncodingMode::default(),
        }
    }

    /// Re-invokes the running executable, which must handle the `worker` subcommand.
    pub fn current_exe() -> ScanResult<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Replaces the arguments passed to every worker process.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
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
            "Scanning {} files for {} keywords in {} processes",
            files.len(),
            keywords.len(),
            workers
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("kwscan-supervisor-{}", i))
            .build()
            .map_err(|e| ScanError::worker_failed(format!("thread pool: {}", e)))?;

        let (tx, rx) = mpsc::channel::<PartialResult>();
        let failures = Mutex::new(Vec::<ScanError>::new());
        let failures_ref = &failures;

        // The sender moves into the scope and is dropped once every supervisor has returned
        pool.scope(move |s| {
            for (worker_id, range) in ranges.into_iter().enumerate() {
                let task = WorkerTask {
                    files: files[range].to_vec(),
                    keywords: keywords.clone(),
                    encoding_mode: self.encoding_mode,
                };
                let tx = tx.clone();
                let failures = failures_ref;
                s.spawn(move |_| match self.run_child(worker_id, &task) {
                    Ok(partial) => {
                        if tx.send(partial).is_err() {
                            warn!("Result channel closed before worker {} reported", worker_id);
                        }
                    }
                    Err(e) => failures
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(e),
                });
            }
        });

        // Every worker has been joined; nothing can arrive on the channel any more
        let failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = failures.into_iter().next() {
            return Err(err);
        }

        let (hits, metrics) = drain(&rx);
        metrics.log_stats();

        let result = FinalResult {
            hits,
            stats: ScanStats {
                files_scanned: metrics.files_scanned(),
                files_skipped: metrics.files_skipped(),
                workers,
                mode: ScanMode::Processes,
                elapsed: start.elapsed(),
            },
        };
        info!(
            "Process scan complete: {} keywords matched in {:?}",
            result.hits.len(),
            result.stats.elapsed
        );
        Ok(result)
    }

    fn run_child(&self, worker_id: usize, task: &WorkerTask) -> ScanResult<PartialResult> {
        let payload = serde_json::to_vec(task)?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                ScanError::worker_failed(format!(
                    "failed to spawn {}: {}",
                    self.program.display(),
                    e
                ))
            })?;
        let mut guard = ChildGuard(Some(child));
        debug!(
            "Worker {} started as pid {} with {} files",
            worker_id,
            guard.child_mut()?.id(),
            task.files.len()
        );

        // Closing stdin tells the worker the task is complete
        {
            let mut stdin = guard
                .child_mut()?
                .stdin
                .take()
                .ok_or_else(|| ScanError::worker_failed("worker stdin unavailable"))?;
            stdin.write_all(&payload)?;
        }

        let output = guard.into_inner()?.wait_with_output()?;
        if !output.status.success() {
            return Err(ScanError::worker_failed(format!(
                "worker {} exited with {}",
                worker_id, output.status
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            ScanError::worker_failed(format!(
                "worker {} sent an unreadable result: {}",
                worker_id, e
            ))
        })
    }
}

/// Merges everything currently queued, stopping as soon as the channel reports empty.
fn drain(rx: &mpsc::Receiver<PartialResult>) -> (KeywordHits, ScanMetrics) {
    let mut hits = KeywordHits::new();
    let metrics = ScanMetrics::new();
    let mut received = 0;

    loop {
        match rx.try_recv() {
            Ok(partial) => {
                received += 1;
                metrics.absorb(partial.files_scanned, partial.files_skipped);
                hits.merge(partial.hits);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }

    debug!("Merged {} partial results", received);
    (hits, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn partial(entries: &[(&str, &str)], scanned: usize) -> PartialResult {
        let mut hits = KeywordHits::new();
        for (keyword, file) in entries {
            hits.record(keyword, Path::new(file));
        }
        PartialResult {
            hits,
            files_scanned: scanned,
            files_skipped: 0,
        }
    }

    #[test]
    fn test_drain_merges_all_queued_results() {
        let (tx, rx) = mpsc::channel();
        tx.send(partial(&[("python", "a.txt")], 2)).unwrap();
        tx.send(partial(&[("python", "c.txt"), ("error", "c.txt")], 2))
            .unwrap();
        drop(tx);

        let (hits, metrics) = drain(&rx);
        assert_eq!(hits.get("python").map(|f| f.len()), Some(2));
        assert_eq!(hits.get("error"), Some(&[PathBuf::from("c.txt")][..]));
        assert_eq!(metrics.files_scanned(), 4);
    }

    #[test]
    fn test_drain_stops_when_empty() {
        let (tx, rx) = mpsc::channel::<PartialResult>();
        tx.send(partial(&[("python", "a.txt")], 1)).unwrap();

        // Sender still alive: drain must not block
        let (hits, _) = drain(&rx);
        assert_eq!(hits.len(), 1);
        drop(tx);
    }

    #[test]
    fn test_zero_workers_fails_before_spawning() {
        let scanner = ProcessScanner::new("/nonexistent/kwscan");
        let keywords = KeywordSet::new(["python"]);
        let result = scanner.scan(&[PathBuf::from("a.txt")], &keywords, 0);
        assert!(matches!(result, Err(ScanError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_worker_binary_is_reported() {
        let scanner = ProcessScanner::new("/nonexistent/kwscan");
        let keywords = KeywordSet::new(["python"]);
        let result = scanner.scan(&[PathBuf::from("a.txt")], &keywords, 1);
        assert!(matches!(result, Err(ScanError::WorkerFailed(_))));
    }
}
