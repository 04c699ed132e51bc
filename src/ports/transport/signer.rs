use std::time::Duration;

use http::{request::Parts, Method, Uri};

#[derive(Debug, thiserror::Error)]
#[error("signing failed: {0}")]
pub struct SignError(pub String);

/// Port for authenticating storage requests
pub trait Signer: Send + Sync + 'static {
    /// Add authentication headers to a request that is about to be sent
    fn sign(&self, parts: &mut Parts, now_unix: i64) -> Result<(), SignError>;

    /// Produce a URL that authorizes `method` on `uri` until `expire` elapses
    fn presign(
        &self,
        method: &Method,
        uri: &Uri,
        now_unix: i64,
        expire: Duration,
    ) -> Result<String, SignError>;
}
