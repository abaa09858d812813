use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ScanMode;

/// Keyword -> files in which the keyword was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordHits(#[serde(with = "crate::paths::map")] BTreeMap<String, Vec<PathBuf>>);

impl KeywordHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` under `keyword` unless it is already listed there.
    ///
    /// A single scan of a file can only find each keyword once, so the membership check
    /// never fires today; it keeps the at-most-once-per-worker invariant if a file is ever
    /// rescanned. Returns whether the path was added.
    pub fn record(&mut self, keyword: &str, path: &Path) -> bool {
        let files = self.0.entry(keyword.to_string()).or_default();
        if files.iter().any(|p| p == path) {
            return false;
        }
        files.push(path.to_path_buf());
        true
    }

    /// Concatenates another worker's lists onto ours. No cross-worker deduplication.
    pub fn merge(&mut self, other: KeywordHits) {
        for (keyword, files) in other.0 {
            self.0.entry(keyword).or_default().extend(files);
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&[PathBuf]> {
        self.0.get(keyword).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The (keyword, file) associations, ignoring list order.
    pub fn pairs(&self) -> BTreeSet<(String, PathBuf)> {
        self.0
            .iter()
            .flat_map(|(k, files)| files.iter().map(move |f| (k.clone(), f.clone())))
            .collect()
    }
}

/// One worker's findings, not yet merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    pub hits: KeywordHits,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

/// Run statistics reported alongside the final mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files read and matched successfully
    pub files_scanned: usize,
    /// Files skipped because they could not be read
    pub files_skipped: usize,
    /// Number of workers the list was split across
    pub workers: usize,
    pub mode: ScanMode,
    /// Wall-clock time from driver start to the merged result
    pub elapsed: Duration,
}

/// The merged keyword -> files mapping for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub hits: KeywordHits,
    pub stats: ScanStats,
}

impl FinalResult {
    pub fn get(&self, keyword: &str) -> Option<&[PathBuf]> {
        self.hits.get(keyword)
    }

    pub fn pairs(&self) -> BTreeSet<(String, PathBuf)> {
        self.hits.pairs()
    }

    /// True when both results hold the same (keyword, file) associations.
    pub fn same_associations(&self, other: &FinalResult) -> bool {
        self.pairs() == other.pairs()
    }
}
