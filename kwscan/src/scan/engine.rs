use std::path::PathBuf;
use tracing::{debug, info};

use super::process::ProcessScanner;
use super::threaded::ThreadScanner;
use crate::config::{ScanConfig, ScanMode};
use crate::errors::ScanResult;
use crate::filters::collect_files;
use crate::keywords::KeywordSet;
use crate::results::FinalResult;

/// Builds the run's file list: explicit files first, then files found under `root_path`.
pub fn resolve_files(config: &ScanConfig) -> ScanResult<Vec<PathBuf>> {
    let mut files = config.files.clone();

    if let Some(root) = &config.root_path {
        let found = collect_files(root, &config.file_extensions, &config.ignore_patterns)?;
        debug!("Found {} files under {}", found.len(), root.display());
        files.extend(found);
    }

    Ok(files)
}

/// Runs a complete scan with the driver selected by `config.mode`.
///
/// In process mode the workers are the running executable re-invoked as
/// `worker --log-level <level>`, so this is meant to be called from a binary that
/// dispatches that subcommand to [`run_worker`](super::worker::run_worker).
pub fn scan(config: &ScanConfig) -> ScanResult<FinalResult> {
    let keywords = KeywordSet::new(config.keywords.iter().cloned());
    let files = resolve_files(config)?;
    info!(
        "Starting {} scan with keywords: {:?}",
        config.mode, config.keywords
    );

    if keywords.is_empty() {
        debug!("No keywords provided, every file will come back unmatched");
    }

    match config.mode {
        ScanMode::Threads => ThreadScanner::new()
            .with_encoding(config.encoding_mode)
            .scan(&files, &keywords, config.worker_count),
        ScanMode::Processes => ProcessScanner::current_exe()?
            .with_args(["worker", "--log-level", config.log_level.as_str()])
            .with_encoding(config.encoding_mode)
            .scan(&files, &keywords, config.worker_count),
    }
}
