mod context;
mod http_transport;
mod signer;

pub use context::RequestContext;
pub use http_transport::{ByteStream, HttpTransport, RequestBody, ResponseBody, TransportError};
pub use signer::{SignError, Signer};
