// src/lib.rs
//
// Crate root — public re-exports for the transfer-support core.

//! Transfer-support core for a command-line object-storage client.
//!
//! Four primitives make large multi-part transfers efficient, retryable
//! in place, and orderable:
//!
//! * [`find_chunksize`] — adaptive part sizing under the service's
//!   part-count and single-part ceilings.
//! * [`ChunkReader`] — an independent, seekable, re-readable view over one
//!   byte range of a file, so a failed part restarts from its own byte 0.
//! * [`StablePriorityQueue`] — bounded, thread-safe scheduling of transfer
//!   sub-tasks: ascending priority, FIFO among equals.
//! * [`BucketLister`] — paginated listing flattened into normalized
//!   `(path, size, last_modified)` entries, with percent-decoded keys and
//!   per-page events on an [`EventBus`].
//!
//! Everything around these — transport, credentials, retries, the worker
//! pool, the CLI — is an external collaborator.

pub mod chunk_reader;
pub mod chunksize;
pub mod constants;
pub mod events;
pub mod lister;
pub mod task_queue;
pub mod uri_utils;

pub use chunk_reader::ChunkReader;
pub use chunksize::{find_chunksize, find_chunksize_with};
pub use constants::{
    DEFAULT_CHUNKSIZE, DEFAULT_MAX_PRIORITY, DEFAULT_MULTIPART_THRESHOLD, DEFAULT_QUEUE_MAXSIZE,
    MAX_SINGLE_UPLOAD_SIZE, MAX_UPLOAD_PARTS,
};
pub use events::{EventBus, ScopedSubscription, SubscriberId, AFTER_CALL_LIST_OBJECTS};
pub use lister::{
    rfc3339_date_parser, BucketLister, ListObjectsPage, ObjectEntry, ObjectPageSource, PageStream,
    RawObject,
};
pub use task_queue::{HasPriority, StablePriorityQueue, TryGetError, TryPutError};
pub use uri_utils::{find_bucket_key, relative_path};
