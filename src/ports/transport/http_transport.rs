use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt};
use http::{Request, Response};
use tokio_util::io::StreamReader;

/// Boxed stream of body chunks
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Body of an outgoing request
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    /// Sent chunked unless a `content-length` header is set
    Stream(ByteStream),
}

impl RequestBody {
    /// Length when known up front
    pub fn len(&self) -> Option<u64> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Bytes(b) => Some(b.len() as u64),
            RequestBody::Stream(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Buffered contents, `None` for streams
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Empty => Some(&[]),
            RequestBody::Bytes(b) => Some(b),
            RequestBody::Stream(_) => None,
        }
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("RequestBody::Empty"),
            RequestBody::Bytes(b) => write!(f, "RequestBody::Bytes({} bytes)", b.len()),
            RequestBody::Stream(_) => f.write_str("RequestBody::Stream"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(value: Bytes) -> Self {
        RequestBody::Bytes(value)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(value: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(value))
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Bytes(Bytes::from(value))
    }
}

/// Streaming body of a response
pub struct ResponseBody {
    stream: ByteStream,
}

impl ResponseBody {
    pub fn new(stream: ByteStream) -> Self {
        Self { stream }
    }

    pub fn empty() -> Self {
        Self::new(futures::stream::empty().boxed())
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::new(futures::stream::once(async move { Ok(data) }).boxed())
    }

    /// Drain the body into memory
    pub async fn bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Expose the body as an `AsyncRead`; dropping it closes the connection
    pub fn into_async_read(self) -> StreamReader<ByteStream, Bytes> {
        StreamReader::new(self.stream)
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseBody")
    }
}

/// Failure below the HTTP layer: connect, DNS, TLS or a broken body
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("body error: {0}")]
    Body(#[from] std::io::Error),
}

/// Port for issuing HTTP requests.
///
/// Implementations return every response, whatever its status; mapping
/// non-2xx statuses to errors is the caller's job.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(
        &self,
        request: Request<RequestBody>,
    ) -> Result<Response<ResponseBody>, TransportError>;
}
