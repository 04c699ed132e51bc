use serde::{Deserialize, Serialize};

/// Service area of a CDN domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CdnArea {
    Mainland,
    Overseas,
    Global,
}

impl CdnArea {
    /// Maps the control-plane area string; unknown values read as mainland
    pub fn from_vendor(area: &str) -> Self {
        match area {
            "overseas" => CdnArea::Overseas,
            "global" => CdnArea::Global,
            _ => CdnArea::Mainland,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CdnArea::Mainland => "mainland",
            CdnArea::Overseas => "overseas",
            CdnArea::Global => "global",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CdnStatus {
    Online,
    Offline,
    Processing,
    Rejected,
}

impl CdnStatus {
    pub fn from_vendor(status: &str) -> Self {
        match status {
            "online" => CdnStatus::Online,
            "offline" => CdnStatus::Offline,
            "rejected" => CdnStatus::Rejected,
            _ => CdnStatus::Processing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CdnStatus::Online => "online",
            CdnStatus::Offline => "offline",
            CdnStatus::Processing => "processing",
            CdnStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CdnOriginType {
    Bucket,
}

/// A CDN acceleration domain whose origin is this bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnDomain {
    pub domain: String,
    pub status: CdnStatus,
    pub area: CdnArea,
    pub cname: String,
    /// Bucket host the domain pulls from
    pub origin: String,
    pub origin_type: CdnOriginType,
}
