//! Tencent Cloud COS adapter.

pub mod acl;
pub mod bucket;
pub mod cdn;
pub mod client;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod multipart;
pub mod policy;
pub mod signer;
pub mod wire;

pub use bucket::QcloudBucket;
pub use client::{CosClient, CosRequest, QcloudClient, QcloudConfig, DEFAULT_ACL_LOOKUP_TIMEOUT};
pub use endpoint::CosEndpoint;
pub use error::{QcloudError, QcloudResult};
pub use signer::{CosSigner, Tc3Signer};
