pub mod identity;
pub mod storage;
pub mod transport;

// Re-export all port traits for convenience
pub use identity::{Identity, IdentityDirectory};
pub use storage::CloudBucket;
pub use transport::{
    ByteStream, HttpTransport, RequestBody, RequestContext, ResponseBody, SignError, Signer,
    TransportError,
};
