pub mod config;
pub mod errors;
pub mod filters;
pub mod keywords;
pub mod metrics;
pub mod partition;
mod paths;
pub mod results;
pub mod scan;

pub use config::{EncodingMode, ScanConfig, ScanMode};
pub use errors::{ScanError, ScanResult};
pub use keywords::{Keyword, KeywordSet};
pub use partition::partition;
pub use results::{FinalResult, KeywordHits, PartialResult, ScanStats};
pub use scan::{run_worker, scan, ProcessScanner, ThreadScanner};
