use serde::{Deserialize, Serialize};

/// Canonical canned ACL of a bucket or object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketAcl {
    Private,
    AuthenticatedRead,
    PublicRead,
    PublicReadWrite,
    Unknown,
}

impl BucketAcl {
    /// Wire name, as sent in the `x-cos-acl` header
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketAcl::Private => "private",
            BucketAcl::AuthenticatedRead => "authenticated-read",
            BucketAcl::PublicRead => "public-read",
            BucketAcl::PublicReadWrite => "public-read-write",
            BucketAcl::Unknown => "unknown",
        }
    }

    /// All values that may be sent to the wire
    pub fn canned() -> [BucketAcl; 4] {
        [
            BucketAcl::Private,
            BucketAcl::AuthenticatedRead,
            BucketAcl::PublicRead,
            BucketAcl::PublicReadWrite,
        ]
    }
}

impl std::fmt::Display for BucketAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BucketAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(BucketAcl::Private),
            "authenticated-read" => Ok(BucketAcl::AuthenticatedRead),
            "public-read" => Ok(BucketAcl::PublicRead),
            "public-read-write" => Ok(BucketAcl::PublicReadWrite),
            "unknown" => Ok(BucketAcl::Unknown),
            other => Err(format!("unrecognized canned ACL: {}", other)),
        }
    }
}

/// Permission carried by a single grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    FullControl,
    Read,
    Write,
    ReadAcp,
    WriteAcp,
    Other(String),
}

impl Permission {
    pub fn parse(value: &str) -> Self {
        match value {
            "FULL_CONTROL" => Permission::FullControl,
            "READ" => Permission::Read,
            "WRITE" => Permission::Write,
            "READ_ACP" => Permission::ReadAcp,
            "WRITE_ACP" => Permission::WriteAcp,
            other => Permission::Other(other.to_string()),
        }
    }
}

/// A grant tuple from an access control list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Group URI; empty for grants to a specific account
    pub grantee_uri: String,
    pub grantee_id: String,
    pub permission: Permission,
}

impl Grant {
    pub fn new(grantee_uri: impl Into<String>, permission: Permission) -> Self {
        Self {
            grantee_uri: grantee_uri.into(),
            grantee_id: String::new(),
            permission,
        }
    }

    pub fn owner(grantee_id: impl Into<String>) -> Self {
        Self {
            grantee_uri: String::new(),
            grantee_id: grantee_id.into(),
            permission: Permission::FullControl,
        }
    }
}
