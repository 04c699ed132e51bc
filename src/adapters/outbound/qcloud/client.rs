use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use http::header::IntoHeaderName;
use http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::bucket::QcloudBucket;
use super::codec::{content_md5, parse_timestamp};
use super::endpoint::{split_full_name, CosEndpoint, COS_SERVICE_HOST};
use super::error::{QcloudError, QcloudResult};
use super::signer::{CosSigner, Tc3Signer};
use super::wire::{ErrorResponse, ListAllMyBucketsResult};
use crate::domain::{
    errors::{CloudError, CloudResult},
    models::{BucketOwner, BucketSummary},
    value_objects::BucketName,
};
use crate::ports::{HttpTransport, IdentityDirectory, RequestBody, RequestContext, ResponseBody, Signer};

/// Upper bound on the best-effort ACL read done before uploads
pub const DEFAULT_ACL_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const COS_REQUEST_ID_HEADER: &str = "x-cos-request-id";

/// One COS call, before signing
#[derive(Debug)]
pub struct CosRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    headers: HeaderMap,
    body: RequestBody,
}

impl CosRequest {
    /// `path` must already be percent-encoded and start with `/`
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), Some(value.into())));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k, Some(v))));
        self
    }

    /// Bare sub-resource such as `?acl`
    pub fn sub_resource(mut self, name: impl Into<String>) -> Self {
        self.query.push((name.into(), None));
        self
    }

    pub fn header(mut self, name: impl IntoHeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn xml_body<T: Serialize>(self, value: &T) -> QcloudResult<Self> {
        let xml = quick_xml::se::to_string(value)?;
        Ok(self.raw_body("application/xml", Bytes::from(xml)))
    }

    pub fn json_body<T: Serialize>(self, value: &T) -> QcloudResult<Self> {
        let json = serde_json::to_vec(value)?;
        Ok(self.raw_body("application/json", Bytes::from(json)))
    }

    fn raw_body(mut self, content_type: &'static str, data: Bytes) -> Self {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        if let Ok(md5) = HeaderValue::from_str(&content_md5(&data)) {
            self.headers.insert("content-md5", md5);
        }
        self.body = RequestBody::Bytes(data);
        self
    }

    fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| match v {
                Some(v) => format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)),
                None => urlencoding::encode(k).into_owned(),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Signed access to one COS host
#[derive(Clone)]
pub struct CosClient {
    transport: Arc<dyn HttpTransport>,
    signer: Arc<dyn Signer>,
    scheme: String,
    host: String,
}

impl std::fmt::Debug for CosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosClient")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl CosClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        signer: Arc<dyn Signer>,
        scheme: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            signer,
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sign and send; any non-2xx status becomes [`QcloudError::Service`]
    pub async fn send(
        &self,
        ctx: &RequestContext,
        request: CosRequest,
    ) -> QcloudResult<Response<ResponseBody>> {
        let query = request.query_string();
        let CosRequest {
            method,
            path,
            mut headers,
            body,
            ..
        } = request;

        let url = if query.is_empty() {
            format!("{}://{}{}", self.scheme, self.host, path)
        } else {
            format!("{}://{}{}?{}", self.scheme, self.host, path, query)
        };
        let uri: Uri = url.parse().map_err(http::Error::from)?;

        if let Some(len) = body.len().filter(|len| *len > 0) {
            headers
                .entry(header::CONTENT_LENGTH)
                .or_insert_with(|| HeaderValue::from(len));
        }

        let (mut parts, body) = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)?
            .into_parts();
        parts.headers = headers;
        self.signer.sign(&mut parts, Utc::now().timestamp())?;

        debug!(
            method = %parts.method,
            host = %self.host,
            path = %path,
            "Sending COS request"
        );

        let request = Request::from_parts(parts, body);
        let response = ctx
            .run(self.transport.send(request))
            .await
            .ok_or(QcloudError::Cancelled)??;

        if response.status().is_success() {
            return Ok(response);
        }
        let (parts, body) = response.into_parts();
        let data = ctx
            .run(body.bytes())
            .await
            .ok_or(QcloudError::Cancelled)?
            .unwrap_or_default();
        Err(service_error(parts.status, &parts.headers, &data))
    }

    /// Send and drain the whole response body
    pub async fn send_bytes(
        &self,
        ctx: &RequestContext,
        request: CosRequest,
    ) -> QcloudResult<(HeaderMap, Bytes)> {
        let (parts, body) = self.send(ctx, request).await?.into_parts();
        let data = ctx.run(body.bytes()).await.ok_or(QcloudError::Cancelled)??;
        Ok((parts.headers, data))
    }

    /// Send, discarding the body
    pub async fn send_empty(&self, ctx: &RequestContext, request: CosRequest) -> QcloudResult<HeaderMap> {
        self.send_bytes(ctx, request).await.map(|(headers, _)| headers)
    }

    /// Send and decode an XML body; an `<Error>` document is an error even
    /// when the status is 200
    pub async fn send_xml<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: CosRequest,
    ) -> QcloudResult<(HeaderMap, T)> {
        let (headers, data) = self.send_bytes(ctx, request).await?;
        if is_error_document(&data) {
            return Err(service_error(StatusCode::OK, &headers, &data));
        }
        let text = std::str::from_utf8(&data).map_err(|e| QcloudError::Xml(e.to_string()))?;
        let value = quick_xml::de::from_str(text)?;
        Ok((headers, value))
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: CosRequest,
    ) -> QcloudResult<T> {
        let (_, data) = self.send_bytes(ctx, request).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

pub(super) fn is_error_document(body: &[u8]) -> bool {
    let text = String::from_utf8_lossy(body);
    let mut text = text.trim_start();
    if text.starts_with("<?xml") {
        text = text.split_once("?>").map(|(_, rest)| rest.trim_start()).unwrap_or(text);
    }
    text.starts_with("<Error>")
}

pub(super) fn service_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> QcloudError {
    let parsed: ErrorResponse = std::str::from_utf8(body)
        .ok()
        .filter(|text| !text.trim().is_empty())
        .and_then(|text| quick_xml::de::from_str(text).ok())
        .unwrap_or_default();

    let request_id = if parsed.request_id.is_empty() {
        headers
            .get(COS_REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    } else {
        parsed.request_id
    };
    let code = if parsed.code.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("UnknownError")
            .replace(' ', "")
    } else {
        parsed.code
    };

    QcloudError::Service {
        status,
        code,
        message: parsed.message,
        request_id,
    }
}

/// Account-level settings of a [`QcloudClient`]
#[derive(Debug, Clone)]
pub struct QcloudConfig {
    /// The caller's own tenant id
    pub app_id: String,
    /// Default region for buckets built without one
    pub region: String,
    pub scheme: String,
    pub acl_lookup_timeout: Duration,
}

impl QcloudConfig {
    pub fn new(app_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            region: region.into(),
            scheme: "https".to_string(),
            acl_lookup_timeout: DEFAULT_ACL_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_acl_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.acl_lookup_timeout = timeout;
        self
    }
}

/// Credentials, transport and account settings shared by every bucket facade.
///
/// Immutable once built; bucket handles hold it behind an `Arc`.
pub struct QcloudClient {
    config: QcloudConfig,
    transport: Arc<dyn HttpTransport>,
    signer: Arc<CosSigner>,
    tc3: Tc3Signer,
    identity: Option<Arc<dyn IdentityDirectory>>,
}

impl std::fmt::Debug for QcloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QcloudClient")
            .field("config", &self.config)
            .field("signer", &self.signer)
            .field("identity", &self.identity.is_some())
            .finish_non_exhaustive()
    }
}

impl QcloudClient {
    pub fn new(
        config: QcloudConfig,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        Self {
            config,
            transport,
            signer: Arc::new(CosSigner::new(secret_id.clone(), secret_key.clone())),
            tc3: Tc3Signer::new(secret_id, secret_key),
            identity: None,
        }
    }

    /// Resolve policy principals to display names through `directory`
    pub fn with_identity_directory(mut self, directory: Arc<dyn IdentityDirectory>) -> Self {
        self.identity = Some(directory);
        self
    }

    pub fn config(&self) -> &QcloudConfig {
        &self.config
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn endpoint(&self, region: &str) -> CosEndpoint {
        CosEndpoint::new(region).with_scheme(self.config.scheme.as_str())
    }

    pub(crate) fn cos_client(&self, host: impl Into<String>) -> CosClient {
        CosClient::new(
            self.transport.clone(),
            self.signer.clone(),
            self.config.scheme.as_str(),
            host,
        )
    }

    pub(crate) fn signer(&self) -> &CosSigner {
        &self.signer
    }

    pub(crate) fn tc3(&self) -> &Tc3Signer {
        &self.tc3
    }

    pub(crate) fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub(crate) fn identity_directory(&self) -> Option<&Arc<dyn IdentityDirectory>> {
        self.identity.as_ref()
    }

    async fn service_listing(&self, ctx: &RequestContext) -> QcloudResult<ListAllMyBucketsResult> {
        let request = CosRequest::new(Method::GET, "/");
        let (_, listing) = self
            .cos_client(COS_SERVICE_HOST)
            .send_xml(ctx, request)
            .await?;
        Ok(listing)
    }

    /// The account owner reported by the service listing
    pub async fn owner(&self, ctx: &RequestContext) -> CloudResult<BucketOwner> {
        let listing = self
            .service_listing(ctx)
            .await
            .map_err(|e| e.into_cloud("get_owner", COS_SERVICE_HOST))?;
        Ok(BucketOwner {
            id: listing.owner.id,
            display_name: listing.owner.display_name,
        })
    }

    /// Every bucket of the account, with the `-appId` suffix split off
    pub async fn list_buckets(&self, ctx: &RequestContext) -> CloudResult<Vec<BucketSummary>> {
        let listing = self
            .service_listing(ctx)
            .await
            .map_err(|e| e.into_cloud("list_buckets", COS_SERVICE_HOST))?;

        let buckets = listing
            .buckets
            .bucket
            .into_iter()
            .map(|entry| {
                let (name, app_id) = match entry.name.rsplit_once('-') {
                    Some((name, app_id)) => (name.to_string(), app_id.to_string()),
                    None => (entry.name.clone(), String::new()),
                };
                BucketSummary {
                    name,
                    app_id,
                    region: entry.location,
                    created_at: parse_timestamp(&entry.creation_date),
                }
            })
            .collect();
        Ok(buckets)
    }

    /// Facades for every bucket of the account
    pub async fn buckets(self: &Arc<Self>, ctx: &RequestContext) -> CloudResult<Vec<QcloudBucket>> {
        let mut out = Vec::new();
        for summary in self.list_buckets(ctx).await? {
            match BucketName::new(summary.name.as_str()) {
                Ok(name) => out.push(QcloudBucket::new(
                    self.clone(),
                    name,
                    summary.app_id,
                    summary.region,
                    None,
                    summary.created_at,
                )),
                Err(e) => warn!(bucket = %summary.name, error = %e, "Skipping bucket"),
            }
        }
        Ok(out)
    }

    /// Facade for one bucket without a listing round-trip.
    ///
    /// `name` may be the short name or `{name}-{appId}`. The app id defaults
    /// to the client's and the region to the configured one.
    pub fn bucket(
        self: &Arc<Self>,
        name: &str,
        app_id: Option<&str>,
        region: Option<&str>,
    ) -> CloudResult<QcloudBucket> {
        self.zoned_bucket(name, app_id, region, None)
    }

    /// Like [`QcloudClient::bucket`], with hosts scoped to `zone` when given
    pub fn zoned_bucket(
        self: &Arc<Self>,
        name: &str,
        app_id: Option<&str>,
        region: Option<&str>,
        zone: Option<&str>,
    ) -> CloudResult<QcloudBucket> {
        let (short, app_id) = match (app_id, split_full_name(name)) {
            (Some(app_id), Some((short, suffix))) if suffix == app_id => (short, app_id),
            (Some(app_id), _) => (name, app_id),
            (None, Some((short, suffix))) => (short, suffix),
            (None, None) => (name, self.config.app_id.as_str()),
        };
        let name = BucketName::new(short).map_err(|e| CloudError::invalid_input("bucket", e))?;
        let region = region.unwrap_or(self.config.region.as_str()).to_string();
        Ok(QcloudBucket::new(
            self.clone(),
            name,
            app_id.to_string(),
            region,
            zone.map(str::to_string),
            None,
        ))
    }

    /// HEAD the bucket; a 404 means it does not exist
    pub async fn bucket_exists(
        &self,
        ctx: &RequestContext,
        name: &str,
        region: Option<&str>,
    ) -> CloudResult<bool> {
        let full_name = match split_full_name(name) {
            Some(_) => name.to_string(),
            None => format!("{}-{}", name, self.config.app_id),
        };
        let endpoint = self.endpoint(region.unwrap_or(self.config.region.as_str()));
        let client = self.cos_client(endpoint.bucket_host(&full_name));
        match client.send_empty(ctx, CosRequest::new(Method::HEAD, "/")).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into_cloud("bucket_exists", &full_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let request = CosRequest::new(Method::GET, "/")
            .sub_resource("uploads")
            .query("prefix", "a b/")
            .query("max-keys", "10");
        assert_eq!(request.query_string(), "uploads&prefix=a%20b%2F&max-keys=10");
    }

    #[test]
    fn test_xml_body_sets_md5() {
        let tagging = super::super::wire::Tagging::default();
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("tagging")
            .xml_body(&tagging)
            .unwrap();
        assert_eq!(request.headers["content-type"], "application/xml");
        let body = request.body.as_bytes().unwrap();
        assert_eq!(request.headers["content-md5"], content_md5(body).as_str());
    }

    #[test]
    fn test_service_error_from_body() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <Resource>logs-100001.cos.ap-beijing.myqcloud.com/a.txt</Resource>
  <RequestId>NWQ1ZjU</RequestId>
</Error>"#;
        assert!(is_error_document(body));
        let err = service_error(StatusCode::NOT_FOUND, &HeaderMap::new(), body);
        assert_eq!(err.code(), Some("NoSuchKey"));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("NWQ1ZjU"));
    }

    #[test]
    fn test_service_error_without_body() {
        let mut headers = HeaderMap::new();
        headers.insert(COS_REQUEST_ID_HEADER, HeaderValue::from_static("req-9"));
        let err = service_error(StatusCode::FORBIDDEN, &headers, b"");
        assert_eq!(err.code(), Some("Forbidden"));
        assert!(err.to_string().contains("req-9"));
        assert!(!is_error_document(b"<ListBucketResult/>"));
    }
}
