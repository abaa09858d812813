use std::ops::Range;

use crate::errors::{ScanError, ScanResult};

/// Splits `len` items into `workers` contiguous ranges.
///
/// Every range but the last holds `len / workers` items; the last one runs to `len`, so it
/// absorbs the remainder. With fewer items than workers the leading ranges are empty.
pub fn partition(len: usize, workers: usize) -> ScanResult<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(ScanError::invalid_argument(
            "worker count must be at least 1",
        ));
    }

    let chunk_size = len / workers;
    let ranges = (0..workers)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == workers - 1 { len } else { start + chunk_size };
            start..end
        })
        .collect();

    Ok(ranges)
}
