use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::config::EncodingMode;
use crate::errors::{ScanError, ScanResult};
use crate::keywords::{Keyword, KeywordSet};
use crate::metrics::ScanMetrics;
use crate::results::{KeywordHits, PartialResult};

/// Decodes file bytes according to the encoding mode
fn decode_bytes(bytes: Vec<u8>, path: &Path, encoding_mode: EncodingMode) -> ScanResult<String> {
    match encoding_mode {
        EncodingMode::FailFast => {
            String::from_utf8(bytes).map_err(|e| ScanError::encoding_error(path, e))
        }
        EncodingMode::Lossy => {
            let cow = String::from_utf8_lossy(&bytes);
            if let std::borrow::Cow::Owned(_) = cow {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(cow.into_owned())
        }
    }
}

/// Per-chunk counts returned by [`ChunkScanner::scan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkCounts {
    pub scanned: usize,
    pub skipped: usize,
}

/// Scans one chunk of files for a keyword set.
#[derive(Debug)]
pub struct ChunkScanner<'a> {
    keywords: &'a KeywordSet,
    encoding_mode: EncodingMode,
    metrics: ScanMetrics,
}

impl<'a> ChunkScanner<'a> {
    pub fn new(keywords: &'a KeywordSet, encoding_mode: EncodingMode, metrics: ScanMetrics) -> Self {
        Self {
            keywords,
            encoding_mode,
            metrics,
        }
    }

    /// Reads a whole file and lower-cases it.
    ///
    /// The handle lives only for the duration of the read and is closed on every path.
    pub fn read_lowercased(&self, path: &Path) -> ScanResult<String> {
        let bytes = std::fs::read(path).map_err(|e| ScanError::from_read_error(path, e))?;
        let len = bytes.len() as u64;
        let contents = decode_bytes(bytes, path, self.encoding_mode)?;
        self.metrics.record_scanned(len);
        Ok(contents.to_lowercase())
    }

    /// Scans `files` in order and calls `on_hit` once per (keyword, file) found.
    ///
    /// Unreadable files are logged and skipped; they never stop the chunk.
    pub fn scan<F>(&self, files: &[PathBuf], mut on_hit: F) -> ChunkCounts
    where
        F: FnMut(&Keyword, &Path),
    {
        let mut counts = ChunkCounts::default();

        for path in files {
            let lowered = match self.read_lowercased(path) {
                Ok(lowered) => lowered,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    self.metrics.record_skipped();
                    counts.skipped += 1;
                    continue;
                }
            };
            counts.scanned += 1;

            for keyword in self.keywords.found_in(&lowered) {
                trace!("'{}' found in {}", keyword.as_str(), path.display());
                on_hit(keyword, path);
            }
        }

        counts
    }

    /// Scans `files` into a private result owned by this worker alone.
    pub fn scan_partial(&self, files: &[PathBuf]) -> PartialResult {
        let mut hits = KeywordHits::new();
        let counts = self.scan(files, |keyword, path| {
            hits.record(keyword.as_str(), path);
        });

        PartialResult {
            hits,
            files_scanned: counts.scanned,
            files_skipped: counts.skipped,
        }
    }
}

/// The unit of work handed to a worker process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTask {
    #[serde(with = "crate::paths::list")]
    pub files: Vec<PathBuf>,
    pub keywords: KeywordSet,
    #[serde(default)]
    pub encoding_mode: EncodingMode,
}

impl WorkerTask {
    pub fn run(&self) -> PartialResult {
        ChunkScanner::new(&self.keywords, self.encoding_mode, ScanMetrics::new())
            .scan_partial(&self.files)
    }
}

/// Worker process body: reads a JSON [`WorkerTask`] and writes a JSON [`PartialResult`].
///
/// The `kwscan worker` subcommand wires this to stdin and stdout.
pub fn run_worker<R: Read, W: Write>(reader: R, mut writer: W) -> ScanResult<()> {
    let task: WorkerTask = serde_json::from_reader(reader)?;
    debug!(
        "Worker {} received {} files",
        std::process::id(),
        task.files.len()
    );

    let partial = task.run();
    serde_json::to_writer(&mut writer, &partial)?;
    writer.flush()?;
    Ok(())
}
