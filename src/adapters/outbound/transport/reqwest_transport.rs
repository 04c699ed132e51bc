use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use http::{Request, Response};
use reqwest::{Body, Client};

use crate::ports::transport::{HttpTransport, RequestBody, ResponseBody, TransportError};

/// `HttpTransport` backed by a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Build a transport; `timeout` bounds each whole request when set
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { http_client })
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: Request<RequestBody>,
    ) -> Result<Response<ResponseBody>, TransportError> {
        let (parts, body) = request.into_parts();

        let body = match body {
            RequestBody::Empty => Body::from(Vec::new()),
            RequestBody::Bytes(bytes) => Body::from(bytes),
            RequestBody::Stream(stream) => Body::wrap_stream(stream),
        };

        let response = self
            .http_client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        let mut out = Response::new(ResponseBody::new(stream));
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
