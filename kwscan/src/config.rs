use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Which concurrency primitive the driver fans work out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Worker threads sharing one mutex-guarded result map
    #[default]
    Threads,
    /// Worker processes reporting partial results over a channel
    Processes,
}

impl std::str::FromStr for ScanMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "threads" | "thread" => Ok(ScanMode::Threads),
            "processes" | "process" => Ok(ScanMode::Processes),
            other => Err(ScanError::config_error(format!(
                "Unknown scan mode '{}', expected 'threads' or 'processes'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Threads => write!(f, "threads"),
            ScanMode::Processes => write!(f, "processes"),
        }
    }
}

/// How to treat files that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Skip the file and log an encoding error
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD and scan anyway
    Lossy,
}

impl std::str::FromStr for EncodingMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "failfast" => Ok(EncodingMode::FailFast),
            "lossy" => Ok(EncodingMode::Lossy),
            other => Err(ScanError::config_error(format!(
                "Unknown encoding mode '{}', expected 'failfast' or 'lossy'",
                other
            ))),
        }
    }
}

/// Configuration for a scan run.
///
/// # Configuration Locations
///
/// Loaded from, in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/kwscan/config.yaml`
/// 2. Local `.kwscan.yaml` in the current directory
/// 3. A file passed with `--config`
///
/// Command-line arguments override all of them (see [`ScanConfig::merge_with_cli`]).
///
/// # Configuration Format
///
/// ```yaml
/// keywords: ["python", "threading", "multiprocessing", "Error"]
/// files: ["file1.txt", "file2.txt"]
/// root_path: "logs"          # optional, walked for more files
/// file_extensions: ["txt"]
/// ignore_patterns: ["**/*.tmp"]
/// worker_count: 2
/// mode: processes            # threads | processes
/// encoding_mode: failfast    # failfast | lossy
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Explicit files to scan, in partitioning order
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Keywords to look for (case-insensitive)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Optional directory whose files are appended to `files`
    #[serde(default)]
    pub root_path: Option<PathBuf>,

    /// File extensions kept when walking `root_path`; None keeps all
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Glob patterns skipped when walking `root_path`
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of workers. Zero is rejected when the scan starts.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub mode: ScanMode,

    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            keywords: Vec::new(),
            root_path: None,
            file_extensions: None,
            ignore_patterns: Vec::new(),
            worker_count: default_worker_count(),
            mode: ScanMode::default(),
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations plus a specific file.
    ///
    /// A custom path that does not exist is an error; missing default files are not.
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("kwscan/config.yaml")),
            Some(PathBuf::from(".kwscan.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        if !cli_config.files.is_empty() {
            self.files = cli_config.files;
        }
        if !cli_config.keywords.is_empty() {
            self.keywords = cli_config.keywords;
        }
        if cli_config.root_path.is_some() {
            self.root_path = cli_config.root_path;
        }
        if cli_config.file_extensions.is_some() {
            self.file_extensions = cli_config.file_extensions;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        // The CLI resolves these against the file values before merging
        self.worker_count = cli_config.worker_count;
        self.mode = cli_config.mode;
        self.encoding_mode = cli_config.encoding_mode;
        self.log_level = cli_config.log_level;
        self
    }
}
