#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri};

use qcloud_bucket_adapter::{
    ports::{HttpTransport, IdentityDirectory, RequestBody, ResponseBody, TransportError},
    AppBuilder, AppConfig, QcloudBucket, QcloudClient,
};

pub const APP_ID: &str = "100001";
pub const REGION: &str = "ap-beijing";

/// A request as the transport saw it, after signing
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn host(&self) -> &str {
        self.uri.host().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or_default()
    }

    /// True when the query has `name` as a bare flag or a `name=value` pair
    pub fn has_query(&self, name: &str) -> bool {
        self.query()
            .split('&')
            .any(|pair| pair == name || pair.starts_with(&format!("{}=", name)))
    }

    pub fn query_value(&self, name: &str) -> Option<String> {
        self.query().split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| urlencoding::decode(v).map(|v| v.into_owned()).unwrap_or_default())
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A canned response handed out in order
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ScriptedResponse {
    pub fn ok() -> Self {
        Self::status(200, "")
    }

    pub fn status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn xml(body: &str) -> Self {
        Self::status(200, body.to_string()).with_header("content-type", "application/xml")
    }

    pub fn json(body: &str) -> Self {
        Self::status(200, body.to_string()).with_header("content-type", "application/json")
    }

    /// A COS `<Error>` document with the given status and code
    pub fn error(status: u16, code: &str) -> Self {
        Self::status(
            status,
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Error><Code>{}</Code><Message>scripted</Message><RequestId>req-{}</RequestId></Error>",
                code, status
            ),
        )
        .with_header("content-type", "application/xml")
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }
}

/// In-memory `HttpTransport` that records every request and replays scripted
/// responses in order. Once the script runs out it answers `200` with an
/// empty body.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    hang: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose requests never complete
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn push(&self, response: ScriptedResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, index: usize) -> RecordedRequest {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no request #{}", index))
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        request: Request<RequestBody>,
    ) -> Result<Response<ResponseBody>, TransportError> {
        let (parts, body) = request.into_parts();
        let body = match body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(bytes) => bytes,
            RequestBody::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                buf.freeze()
            }
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });

        if self.hang {
            std::future::pending::<()>().await;
        }

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(ScriptedResponse::ok);
        let mut response = Response::builder()
            .status(scripted.status)
            .body(ResponseBody::from_bytes(scripted.body))
            .unwrap();
        *response.headers_mut() = scripted.headers;
        Ok(response)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new("AKIDexample", "secret", APP_ID);
    config.region = REGION.to_string();
    config
}

pub fn client(transport: &MockTransport) -> Arc<QcloudClient> {
    AppBuilder::new()
        .with_config(test_config())
        .with_transport(Arc::new(transport.clone()))
        .build()
        .unwrap()
}

pub fn client_with_directory(
    transport: &MockTransport,
    directory: Arc<dyn IdentityDirectory>,
) -> Arc<QcloudClient> {
    AppBuilder::new()
        .with_config(test_config())
        .with_transport(Arc::new(transport.clone()))
        .with_identity_directory(directory)
        .build()
        .unwrap()
}

/// `logs-100001` in `ap-beijing`, owned by the client's own tenant
pub fn logs_bucket(client: &Arc<QcloudClient>) -> QcloudBucket {
    client.bucket("logs", Some(APP_ID), Some(REGION)).unwrap()
}

pub const LOGS_HOST: &str = "logs-100001.cos.ap-beijing.myqcloud.com";

pub fn acl_xml(grants: &[(&str, &str)]) -> String {
    let owner = "qcs::cam::uin/100000000001:uin/100000000001";
    let entries: String = grants
        .iter()
        .map(|(grantee, permission)| {
            let grantee = if grantee.starts_with("http://") {
                format!("<Grantee><URI>{}</URI></Grantee>", grantee)
            } else {
                format!("<Grantee><ID>{}</ID></Grantee>", grantee)
            };
            format!("<Grant>{}<Permission>{}</Permission></Grant>", grantee, permission)
        })
        .collect();
    format!(
        "<AccessControlPolicy><Owner><ID>{owner}</ID><DisplayName>{owner}</DisplayName></Owner><AccessControlList>{entries}</AccessControlList></AccessControlPolicy>"
    )
}
