//! Read-only CDN lookups against the JSON cloud API.

use bytes::Bytes;
use chrono::Utc;
use http::{Method, Request};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::QcloudClient;
use super::endpoint::CDN_API_HOST;
use super::error::{QcloudError, QcloudResult};
use super::signer::Tc3Request;
use crate::domain::models::{CdnArea, CdnDomain, CdnOriginType, CdnStatus};
use crate::ports::{RequestBody, RequestContext};

const CDN_SERVICE: &str = "cdn";
const CDN_API_VERSION: &str = "2018-06-06";
const DESCRIBE_DOMAINS_CONFIG: &str = "DescribeDomainsConfig";
const PAGE_SIZE: u32 = 50;

/// Domain type filter for buckets
pub const COS_DOMAIN_TYPE: &str = "cos";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainsRequest<'a> {
    offset: u32,
    limit: u32,
    filters: Vec<DomainFilter<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DomainFilter<'a> {
    name: &'a str,
    value: Vec<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "Response", default)]
    response: DescribeDomainsResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainsResponse {
    #[serde(default)]
    domains: Vec<DomainEntry>,
    #[serde(default)]
    total_number: u64,
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    request_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// One CDN domain; fields the bucket does not use are skipped
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainEntry {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub cname: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub area: String,
}

impl QcloudClient {
    async fn describe_domains_page(
        &self,
        ctx: &RequestContext,
        origins: &[&str],
        domain_type: &str,
        offset: u32,
    ) -> QcloudResult<DescribeDomainsResponse> {
        let mut filters = Vec::new();
        if !origins.is_empty() {
            filters.push(DomainFilter {
                name: "origin",
                value: origins.to_vec(),
            });
        }
        if !domain_type.is_empty() {
            filters.push(DomainFilter {
                name: "domainType",
                value: vec![domain_type],
            });
        }
        let payload = serde_json::to_vec(&DescribeDomainsRequest {
            offset,
            limit: PAGE_SIZE,
            filters,
        })?;

        let call = Tc3Request {
            service: CDN_SERVICE,
            host: CDN_API_HOST,
            action: DESCRIBE_DOMAINS_CONFIG,
            version: CDN_API_VERSION,
            region: None,
            payload: &payload,
        };
        let headers = self.tc3().headers(&call, Utc::now().timestamp())?;

        let mut request = Request::builder()
            .method(Method::POST)
            .uri(format!("https://{}/", CDN_API_HOST))
            .body(RequestBody::Bytes(Bytes::from(payload)))?;
        request.headers_mut().extend(headers);

        debug!(action = DESCRIBE_DOMAINS_CONFIG, offset, "Sending CDN request");

        let response = ctx
            .run(self.transport().send(request))
            .await
            .ok_or(QcloudError::Cancelled)??;
        let (parts, body) = response.into_parts();
        let data = ctx.run(body.bytes()).await.ok_or(QcloudError::Cancelled)??;

        if !parts.status.is_success() {
            return Err(QcloudError::Service {
                status: parts.status,
                code: parts
                    .status
                    .canonical_reason()
                    .unwrap_or("UnknownError")
                    .replace(' ', ""),
                message: String::from_utf8_lossy(&data).into_owned(),
                request_id: String::new(),
            });
        }

        let envelope: ApiEnvelope = serde_json::from_slice(&data)?;
        let response = envelope.response;
        if let Some(error) = response.error {
            return Err(QcloudError::Api {
                code: error.code,
                message: error.message,
                request_id: response.request_id,
            });
        }
        Ok(response)
    }

    /// Every CDN domain matching the filters, fetched page by page
    pub async fn describe_all_cdn_domains(
        &self,
        ctx: &RequestContext,
        origins: &[&str],
        domain_type: &str,
    ) -> QcloudResult<Vec<DomainEntry>> {
        let mut domains = Vec::new();
        loop {
            let page = self
                .describe_domains_page(ctx, origins, domain_type, domains.len() as u32)
                .await?;
            let fetched = page.domains.len();
            domains.extend(page.domains);
            if fetched == 0 || domains.len() as u64 >= page.total_number {
                break;
            }
        }
        Ok(domains)
    }
}

/// Map a vendor record onto the canonical CDN model, tagged with `origin`
pub fn cdn_domain(entry: DomainEntry, origin: &str) -> CdnDomain {
    CdnDomain {
        domain: entry.domain,
        status: CdnStatus::from_vendor(&entry.status),
        area: CdnArea::from_vendor(&entry.area),
        cname: entry.cname,
        origin: origin.to_string(),
        origin_type: CdnOriginType::Bucket,
    }
}
