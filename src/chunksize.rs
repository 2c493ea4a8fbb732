// src/chunksize.rs
//
// Adaptive part sizing for multipart transfers.
//
// A requested part size is only usable if the whole object fits inside the
// service's part-count ceiling. When it does not, the part size is doubled
// until the count fits, then capped at the single-part ceiling.

use crate::constants::{MAX_SINGLE_UPLOAD_SIZE, MAX_UPLOAD_PARTS};

/// Pick the part size actually used to transfer an object of `size` bytes,
/// starting from the caller's requested `chunksize`.
///
/// Uses the crate-level limits ([`MAX_UPLOAD_PARTS`],
/// [`MAX_SINGLE_UPLOAD_SIZE`]). Inputs are assumed validated by the caller;
/// `chunksize` must be at least 1.
pub fn find_chunksize(size: u64, chunksize: u64) -> u64 {
    find_chunksize_with(size, chunksize, MAX_UPLOAD_PARTS, MAX_SINGLE_UPLOAD_SIZE)
}

/// `find_chunksize` with explicit limits.
///
/// Doubling converges in O(log) steps even for extreme size ratios, and the
/// single-part cap is applied last, so the result never exceeds `max_single`.
pub fn find_chunksize_with(size: u64, mut chunksize: u64, max_parts: u64, max_single: u64) -> u64 {
    while size / chunksize > max_parts {
        chunksize *= 2;
    }
    chunksize.min(max_single)
}
