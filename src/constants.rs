// src/constants.rs
//
// Centralized constants for s3xfer to avoid hardcoded values throughout the codebase

/// Part-count ceiling for one multipart upload, held below the remote
/// service's documented part limit.
pub const MAX_UPLOAD_PARTS: u64 = 950;

/// Absolute ceiling on a single uploaded part (5 GiB).
/// `find_chunksize` never returns a value above this.
pub const MAX_SINGLE_UPLOAD_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Default starting part size for multipart transfers (7 MiB)
pub const DEFAULT_CHUNKSIZE: u64 = 7 * 1024 * 1024;

/// Objects at or above this size are transferred multipart (8 MiB)
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Default bound on the pending-task queue; `put` blocks once reached
pub const DEFAULT_QUEUE_MAXSIZE: usize = 1000;

/// Default priority ceiling for queued tasks. Doubles as the sentinel
/// assigned to tasks that carry no priority of their own.
pub const DEFAULT_MAX_PRIORITY: u32 = 20;
