//! # Fan-Out Sizing
//!
//! Worker-count selection and contiguous range partitioning for the
//! fork-join loops in the join executor. Partitions are contiguous and
//! ordered, which is what makes parallel output order equal to serial
//! left-major order after concatenation.

use std::num::NonZeroUsize;

/// Worker count for `record_len` records: host parallelism, never more
/// workers than records, always at least one.
pub fn worker_count(record_len: usize) -> usize {
    let host = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    host.min(record_len).max(1)
}

/// Splits `[0, record_len)` into `workers` contiguous half-open ranges
/// with sizes differing by at most one; returns partition `th_idx`.
pub fn record_range(th_idx: usize, record_len: usize, workers: usize) -> (usize, usize) {
    let base = record_len / workers;
    let rem = record_len % workers;
    let start = th_idx * base + th_idx.min(rem);
    let end = start + base + usize::from(th_idx < rem);
    (start, end)
}
