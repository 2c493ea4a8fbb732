// src/lister.rs
//
// Paginated bucket listing, flattened into normalized entries.
//
// The pagination protocol and the transport behind it are collaborators:
// anything that can hand back pages of {Key, Size, LastModified} works.
// Keys arrive percent-encoded (control characters are unsafe on the wire)
// and are decoded as UTF-8 before the path is built.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::events::{EventBus, AFTER_CALL_LIST_OBJECTS};

/// One object as it appears on the wire, key still percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObject {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "LastModified")]
    pub last_modified: String,
}

/// One page of a list-objects response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObjectsPage {
    #[serde(rename = "Contents", default)]
    pub contents: Vec<RawObject>,
}

/// Normalized listing entry: `bucket/decoded-key`, object size, and
/// whatever the injected date parser produced for `LastModified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry<T> {
    pub path: String,
    pub size: u64,
    pub last_modified: T,
}

pub type PageStream<'a> = Box<dyn Iterator<Item = Result<ListObjectsPage>> + 'a>;

/// The pagination protocol. Each `paginate` call starts a fresh page
/// sequence; page-level failures surface as `Err` items and are passed
/// through to the listing consumer unchanged.
pub trait ObjectPageSource {
    fn paginate<'a>(&'a self, bucket: &str, prefix: Option<&str>) -> PageStream<'a>;
}

/// Timestamp parser used when the caller injects nothing fancier.
pub fn rfc3339_date_parser(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid LastModified timestamp {raw:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Streams a bucket's contents as a flat, lazy sequence of
/// [`ObjectEntry`] values, one paginated protocol call at a time.
///
/// After every retrieved page the raw payload is published on
/// [`AFTER_CALL_LIST_OBJECTS`], which is how progress observers hook in
/// without being a parameter to the listing call.
pub struct BucketLister<S, D> {
    source: S,
    events: Arc<EventBus<ListObjectsPage>>,
    date_parser: D,
}

impl<S, D, T> BucketLister<S, D>
where
    S: ObjectPageSource,
    D: Fn(&str) -> Result<T>,
{
    pub fn new(source: S, events: Arc<EventBus<ListObjectsPage>>, date_parser: D) -> Self {
        Self { source, events, date_parser }
    }

    /// List every object in `bucket`, optionally narrowed to `prefix`.
    /// `prefix` only narrows what the remote side returns; the output path
    /// is always `bucket/decoded-key`. Lazy across pages and restartable:
    /// each call issues a fresh pagination sequence.
    pub fn list_objects<'a>(
        &'a self,
        bucket: &'a str,
        prefix: Option<&str>,
    ) -> impl Iterator<Item = Result<ObjectEntry<T>>> + 'a
    where
        T: 'a,
    {
        debug!("list objects: bucket={bucket} prefix={prefix:?}");
        self.source
            .paginate(bucket, prefix)
            .flat_map(move |page| match page {
                Ok(page) => {
                    self.events.publish(AFTER_CALL_LIST_OBJECTS, &page);
                    page.contents
                        .into_iter()
                        .map(|raw| self.decode_entry(bucket, raw))
                        .collect::<Vec<_>>()
                }
                Err(err) => vec![Err(err)],
            })
    }

    fn decode_entry(&self, bucket: &str, raw: RawObject) -> Result<ObjectEntry<T>> {
        // UTF-8 decode of the whole key, so a percent-encoded multi-byte
        // sequence becomes one code point. Malformed escapes pass through.
        let key = percent_decode_str(&raw.key).decode_utf8_lossy();
        let last_modified = (self.date_parser)(&raw.last_modified)?;
        Ok(ObjectEntry {
            path: format!("{bucket}/{key}"),
            size: raw.size,
            last_modified,
        })
    }
}

impl<S: ObjectPageSource> BucketLister<S, fn(&str) -> Result<DateTime<Utc>>> {
    /// Lister with the stock RFC-3339 timestamp parser.
    pub fn with_rfc3339_dates(source: S, events: Arc<EventBus<ListObjectsPage>>) -> Self {
        Self::new(source, events, rfc3339_date_parser)
    }
}
