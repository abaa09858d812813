//! Parallel keyword scanning.
//!
//! Two drivers perform the same scan with different concurrency primitives:
//!
//! - [`ThreadScanner`] runs one thread per chunk. All threads write into a single
//!   `Mutex<KeywordHits>`, taking the lock once per (keyword, file) hit.
//! - [`ProcessScanner`] runs one OS process per chunk. Each process builds a private
//!   [`PartialResult`](crate::results::PartialResult) and ships it back over its stdout;
//!   the driver merges them after every worker has exited.
//!
//! Both split the file list with [`partition`](crate::partition::partition), both share the
//! per-file logic in [`worker::ChunkScanner`], and both produce the same set of
//! (keyword, file) pairs for the same input.
//!
//! ```rust,ignore
//! let keywords = KeywordSet::new(["python", "error"]);
//! let threaded = ThreadScanner::new().scan(&files, &keywords, 4)?;
//! let processes = ProcessScanner::current_exe()?.scan(&files, &keywords, 4)?;
//! assert!(threaded.same_associations(&processes));
//! ```
pub mod engine;
pub mod process;
pub mod threaded;
pub mod worker;

pub use engine::{resolve_files, scan};
pub use process::ProcessScanner;
pub use threaded::ThreadScanner;
pub use worker::{run_worker, ChunkScanner, WorkerTask};
