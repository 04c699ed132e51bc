use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const META_HEADER_CACHE_CONTROL: &str = "cache-control";
pub const META_HEADER_CONTENT_TYPE: &str = "content-type";
pub const META_HEADER_CONTENT_MD5: &str = "content-md5";
pub const META_HEADER_CONTENT_ENCODING: &str = "content-encoding";
pub const META_HEADER_CONTENT_DISPOSITION: &str = "content-disposition";

/// Metadata headers that travel as typed request fields rather than user metadata
pub const CANONICAL_META_HEADERS: [&str; 5] = [
    META_HEADER_CACHE_CONTROL,
    META_HEADER_CONTENT_TYPE,
    META_HEADER_CONTENT_MD5,
    META_HEADER_CONTENT_ENCODING,
    META_HEADER_CONTENT_DISPOSITION,
];

/// An object (or common prefix) returned by a listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CloudObject {
    pub key: String,
    pub size_bytes: i64,
    pub etag: String,
    /// Empty means the bucket default
    pub storage_class: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl CloudObject {
    /// A common-prefix entry carries only its key
    pub fn prefix(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

/// One page of an object listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListObjectResult {
    pub objects: Vec<CloudObject>,
    /// Only populated when the listing was delimited
    pub common_prefixes: Vec<CloudObject>,
    pub is_truncated: bool,
    pub next_marker: Option<String>,
}

/// Byte range for ranged reads, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ObjectRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Everything from `start` to the end of the object
    pub fn from(start: u64) -> Self {
        Self { start, end: None }
    }

    /// `length` bytes starting at `offset`.
    ///
    /// `None` for an empty range or one ending past `u64::MAX`.
    pub fn with_length(offset: u64, length: u64) -> Option<Self> {
        let last = offset.checked_add(length.checked_sub(1)?)?;
        Some(Self::new(offset, last))
    }
}

impl std::fmt::Display for ObjectRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "bytes={}-{}", self.start, end),
            None => write!(f, "bytes={}-", self.start),
        }
    }
}

/// Metadata returned by a HEAD on an object
#[derive(Debug, Clone, Default)]
pub struct ObjectMeta {
    pub size_bytes: i64,
    pub etag: String,
    pub storage_class: String,
    pub last_modified: Option<DateTime<Utc>>,
    /// Canonical headers plus user metadata with the wire prefix stripped
    pub metadata: HeaderMap,
}
