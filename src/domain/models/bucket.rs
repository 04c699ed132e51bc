use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A public URL a bucket can be reached at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAccessUrl {
    pub url: String,
    pub description: String,
    pub primary: bool,
}

/// A bucket entry returned by the account-wide listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Short name, without the `-{appId}` suffix
    pub name: String,
    pub app_id: String,
    pub region: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl BucketSummary {
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.app_id)
    }
}

/// Account owner reported by the service listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketOwner {
    pub id: String,
    pub display_name: String,
}
