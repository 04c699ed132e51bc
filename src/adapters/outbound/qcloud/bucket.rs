use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::{header, HeaderMap, HeaderValue, Method, Uri};
use tracing::{debug, warn};

use super::acl::{acl_from_grants, acl_header_value, grants_from_wire, ACL_HEADER};
use super::cdn::{cdn_domain, COS_DOMAIN_TYPE};
use super::client::{CosClient, CosRequest, QcloudClient};
use super::codec::{decode_metadata, encode_metadata, parse_timestamp};
use super::endpoint::{full_bucket_name, CosEndpoint};
use super::error::{QcloudError, QcloudResult};
use super::multipart::COPY_SOURCE_HEADER;
use super::policy::{
    needs_owner, principal_arns, remove_statements, resource_arns, statement_from_input,
    statement_to_domain, POLICY_VERSION,
};
use super::wire::{
    AccessControlPolicy, CopyResult, CorsConfiguration, CorsRuleEntry, DomainList, ErrorDocument,
    IndexDocument, ListBucketResult, PolicyDocument, RedirectAllRequestsTo, RefererConfiguration,
    RoutingCondition, RoutingRedirect, RoutingRule, RoutingRules, Tag, TagSet, Tagging,
    WebsiteConfiguration,
};
use crate::domain::{
    errors::{CloudError, CloudResult},
    models::{
        BucketAccessUrl, BucketAcl, CdnDomain, CloudObject, CompletedPart, CopyObjectOptions,
        CorsRule, ListFilter, ListObjectResult, MultipartOptions, MultipartUpload, ObjectMeta,
        ObjectRange, PolicyStatement, PolicyStatementInput, PutObjectOptions, RefererConfig,
        WebsiteConfig, WebsiteRoutingRule, MAX_PART_NUMBER,
    },
    value_objects::{BucketName, ObjectKey},
};
use crate::ports::{CloudBucket, RequestBody, RequestContext, ResponseBody, Signer};

const STORAGE_CLASS_HEADER: &str = "x-cos-storage-class";
const METADATA_DIRECTIVE_HEADER: &str = "x-cos-metadata-directive";
const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

const REFERER_ENABLED: &str = "Enabled";
const EMPTY_REFER_ALLOW: &str = "Allow";
const EMPTY_REFER_DENY: &str = "Deny";

/// A COS bucket seen through the provider-neutral [`CloudBucket`] port.
///
/// Holds no mutable state: every call builds a fresh signed request from the
/// shared client.
#[derive(Debug, Clone)]
pub struct QcloudBucket {
    client: Arc<QcloudClient>,
    name: BucketName,
    app_id: String,
    endpoint: CosEndpoint,
    location: String,
    created_at: Option<DateTime<Utc>>,
}

impl QcloudBucket {
    /// `zone`, when set, scopes every host to the zone instead of the region
    pub fn new(
        client: Arc<QcloudClient>,
        name: BucketName,
        app_id: impl Into<String>,
        region: impl Into<String>,
        zone: Option<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        let region = region.into();
        let endpoint = match zone {
            Some(zone) => client.endpoint(&region).with_zone(zone),
            None => client.endpoint(&region),
        };
        Self {
            endpoint,
            client,
            name,
            app_id: app_id.into(),
            location: region,
            created_at,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn endpoint(&self) -> &CosEndpoint {
        &self.endpoint
    }

    pub fn zone(&self) -> Option<&str> {
        self.endpoint.zone()
    }

    fn cos(&self) -> CosClient {
        self.client
            .cos_client(self.endpoint.bucket_host(&self.full_name()))
    }

    fn bucket_error(&self, operation: &'static str) -> impl Fn(QcloudError) -> CloudError + '_ {
        move |e| e.into_cloud(operation, &self.full_name())
    }

    fn object_error<'a>(
        &'a self,
        operation: &'static str,
        key: &'a ObjectKey,
    ) -> impl Fn(QcloudError) -> CloudError + 'a {
        move |e| e.into_cloud(operation, &format!("{}/{}", self.full_name(), key))
    }

    async fn fetch_acl(&self, ctx: &RequestContext) -> QcloudResult<BucketAcl> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("acl");
        let (_, policy): (_, AccessControlPolicy) = self.cos().send_xml(ctx, request).await?;
        Ok(acl_from_grants(&grants_from_wire(policy)))
    }

    /// The caller's ACL, or the bucket's current one read under a bounded
    /// timeout. Falls back to `private` when the read fails.
    async fn resolve_acl(&self, ctx: &RequestContext, acl: Option<BucketAcl>) -> BucketAcl {
        if let Some(acl) = acl {
            return acl;
        }
        let timeout = self.client.config().acl_lookup_timeout;
        match tokio::time::timeout(timeout, self.fetch_acl(ctx)).await {
            Ok(Ok(acl)) if acl != BucketAcl::Unknown => acl,
            Ok(Ok(_)) => {
                warn!(bucket = %self.full_name(), "Bucket ACL not canned, using private");
                BucketAcl::Private
            }
            Ok(Err(e)) => {
                warn!(bucket = %self.full_name(), error = %e, "Bucket ACL lookup failed, using private");
                BucketAcl::Private
            }
            Err(_) => {
                warn!(bucket = %self.full_name(), "Bucket ACL lookup timed out, using private");
                BucketAcl::Private
            }
        }
    }

    /// ACL, storage class and metadata headers shared by every object write
    async fn write_headers(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        acl: Option<BucketAcl>,
        storage_class: Option<&str>,
        metadata: &HeaderMap,
        with_md5: bool,
    ) -> CloudResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let acl = self.resolve_acl(ctx, acl).await;
        headers.insert(ACL_HEADER, acl_header_value(operation, acl)?);

        if let Some(class) = storage_class.filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(class)
                .map_err(|e| CloudError::invalid_input(operation, e))?;
            headers.insert(STORAGE_CLASS_HEADER, value);
        }

        let mut encoded =
            encode_metadata(metadata).map_err(|e| CloudError::invalid_input(operation, e))?;
        if !with_md5 {
            encoded.content_md5 = None;
        }
        encoded.apply(&mut headers);
        Ok(headers)
    }

    /// `{host}/{key}` of an object in `src_bucket`, which may be given with
    /// or without the client's `-appId` suffix
    fn copy_source(&self, src_bucket: &str, src_key: &ObjectKey) -> String {
        let suffix = format!("-{}", self.client.app_id());
        let full = if src_bucket.ends_with(&suffix) {
            src_bucket.to_string()
        } else {
            full_bucket_name(src_bucket, self.client.app_id())
        };
        format!("{}{}", self.endpoint.bucket_host(&full), src_key.url_path())
    }

    fn check_part_number(operation: &'static str, part_number: u32) -> CloudResult<()> {
        if part_number == 0 || part_number > MAX_PART_NUMBER {
            return Err(CloudError::invalid_input(
                operation,
                format!("part number {} outside 1..={}", part_number, MAX_PART_NUMBER),
            ));
        }
        Ok(())
    }

    async fn fetch_policy(&self, ctx: &RequestContext) -> QcloudResult<Option<PolicyDocument>> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("policy");
        match self.cos().send_json(ctx, request).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_policy(&self, ctx: &RequestContext, doc: &PolicyDocument) -> QcloudResult<()> {
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("policy")
            .json_body(doc)?;
        self.cos().send_empty(ctx, request).await?;
        Ok(())
    }

    /// `"{ownerDisplayName}:{uin}" -> name` for every known user, or `None`
    /// without an identity directory
    async fn principal_names(&self, ctx: &RequestContext) -> CloudResult<Option<HashMap<String, String>>> {
        let Some(directory) = self.client.identity_directory() else {
            return Ok(None);
        };
        let owner = self.client.owner(ctx).await?;
        let users = directory.list_users().await?;
        Ok(Some(
            users
                .into_iter()
                .map(|u| (format!("{}:{}", owner.display_name, u.uin), u.name))
                .collect(),
        ))
    }

    async fn send_config(&self, operation: &'static str, request: CosRequest) -> CloudResult<()> {
        self.cos()
            .send_empty(&RequestContext::background(), request)
            .await
            .map(|_| ())
            .map_err(self.bucket_error(operation))
    }
}

fn website_to_wire(conf: &WebsiteConfig) -> WebsiteConfiguration {
    let rules: Vec<RoutingRule> = conf
        .rules
        .iter()
        .map(|rule| RoutingRule {
            condition: RoutingCondition {
                http_error_code: rule.condition_error_code.clone(),
                key_prefix: rule.condition_prefix.clone(),
            },
            redirect: RoutingRedirect {
                protocol: rule.redirect_protocol.clone(),
                replace_key: rule.redirect_replace_key.clone(),
                replace_key_prefix: rule.redirect_replace_key_prefix.clone(),
            },
        })
        .collect();
    WebsiteConfiguration {
        index_document: Some(IndexDocument {
            suffix: conf.index.clone(),
        }),
        redirect_all_requests_to: Some(RedirectAllRequestsTo {
            protocol: conf.protocol.clone(),
        }),
        error_document: Some(ErrorDocument {
            key: conf.error_document.clone(),
        }),
        routing_rules: (!rules.is_empty()).then_some(RoutingRules { rules }),
    }
}

fn website_from_wire(wire: WebsiteConfiguration, url: String) -> WebsiteConfig {
    WebsiteConfig {
        index: wire.index_document.map(|d| d.suffix).unwrap_or_default(),
        error_document: wire.error_document.map(|d| d.key).unwrap_or_default(),
        protocol: wire
            .redirect_all_requests_to
            .map(|r| r.protocol)
            .unwrap_or_default(),
        rules: wire
            .routing_rules
            .map(|r| r.rules)
            .unwrap_or_default()
            .into_iter()
            .map(|rule| WebsiteRoutingRule {
                condition_error_code: rule.condition.http_error_code,
                condition_prefix: rule.condition.key_prefix,
                redirect_protocol: rule.redirect.protocol,
                redirect_replace_key: rule.redirect.replace_key,
                redirect_replace_key_prefix: rule.redirect.replace_key_prefix,
            })
            .collect(),
        url,
    }
}

fn header_str(headers: &HeaderMap, name: impl http::header::AsHeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[async_trait]
impl CloudBucket for QcloudBucket {
    fn global_id(&self) -> String {
        if self.app_id == self.client.app_id() {
            self.name.to_string()
        } else {
            self.full_name()
        }
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn full_name(&self) -> String {
        full_bucket_name(self.name.as_str(), &self.app_id)
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn region(&self) -> &str {
        self.endpoint.region()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn access_urls(&self) -> Vec<BucketAccessUrl> {
        self.endpoint.access_urls(&self.full_name())
    }

    async fn list_objects(
        &self,
        ctx: &RequestContext,
        filter: &ListFilter,
    ) -> CloudResult<ListObjectResult> {
        let request = CosRequest::new(Method::GET, "/").queries(filter.to_query());
        let (_, listing): (_, ListBucketResult) = self
            .cos()
            .send_xml(ctx, request)
            .await
            .map_err(self.bucket_error("list_objects"))?;

        let objects = listing
            .contents
            .into_iter()
            .map(|entry| CloudObject {
                last_modified: parse_timestamp(&entry.last_modified),
                key: entry.key,
                size_bytes: entry.size,
                etag: entry.etag,
                storage_class: entry.storage_class,
            })
            .collect();
        let common_prefixes = listing
            .common_prefixes
            .into_iter()
            .map(|p| CloudObject::prefix(p.prefix))
            .collect();

        Ok(ListObjectResult {
            objects,
            common_prefixes,
            is_truncated: listing.is_truncated,
            next_marker: listing.next_marker.filter(|m| !m.is_empty()),
        })
    }

    async fn put_object(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        body: RequestBody,
        size: i64,
        options: PutObjectOptions,
    ) -> CloudResult<()> {
        let mut headers = self
            .write_headers(
                ctx,
                "put_object",
                options.acl,
                options.storage_class.as_deref(),
                &options.metadata,
                true,
            )
            .await?;
        if size > 0 {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
        }

        let mut request = CosRequest::new(Method::PUT, key.url_path()).body(body);
        request.headers_mut().extend(headers);
        self.cos()
            .send_empty(ctx, request)
            .await
            .map_err(self.object_error("put_object", key))?;
        debug!(bucket = %self.full_name(), key = %key, size, "Object uploaded");
        Ok(())
    }

    async fn get_object(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        range: Option<ObjectRange>,
    ) -> CloudResult<ResponseBody> {
        let mut request = CosRequest::new(Method::GET, key.url_path());
        if let Some(range) = range {
            let value = HeaderValue::from_str(&range.to_string())
                .map_err(|e| CloudError::invalid_input("get_object", e))?;
            request = request.header(header::RANGE, value);
        }
        let response = self
            .cos()
            .send(ctx, request)
            .await
            .map_err(self.object_error("get_object", key))?;
        Ok(response.into_body())
    }

    async fn get_object_meta(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> CloudResult<ObjectMeta> {
        let headers = self
            .cos()
            .send_empty(ctx, CosRequest::new(Method::HEAD, key.url_path()))
            .await
            .map_err(self.object_error("get_object_meta", key))?;

        let storage_class = match header_str(&headers, STORAGE_CLASS_HEADER) {
            "" => DEFAULT_STORAGE_CLASS.to_string(),
            class => class.to_string(),
        };
        Ok(ObjectMeta {
            size_bytes: header_str(&headers, header::CONTENT_LENGTH)
                .parse()
                .unwrap_or_default(),
            etag: header_str(&headers, header::ETAG).to_string(),
            storage_class,
            last_modified: parse_timestamp(header_str(&headers, header::LAST_MODIFIED)),
            metadata: decode_metadata(&headers),
        })
    }

    async fn copy_object(
        &self,
        ctx: &RequestContext,
        dest_key: &ObjectKey,
        src_bucket: &str,
        src_key: &ObjectKey,
        options: CopyObjectOptions,
    ) -> CloudResult<()> {
        let directive = if options.metadata.is_empty() {
            "Copy"
        } else {
            "Replaced"
        };
        let mut headers = self
            .write_headers(
                ctx,
                "copy_object",
                options.acl,
                options.storage_class.as_deref(),
                &options.metadata,
                false,
            )
            .await?;
        let source = HeaderValue::from_str(&self.copy_source(src_bucket, src_key))
            .map_err(|e| CloudError::invalid_input("copy_object", e))?;
        headers.insert(COPY_SOURCE_HEADER, source);
        headers.insert(METADATA_DIRECTIVE_HEADER, HeaderValue::from_static(directive));

        let mut request = CosRequest::new(Method::PUT, dest_key.url_path());
        request.headers_mut().extend(headers);
        let _: (_, CopyResult) = self
            .cos()
            .send_xml(ctx, request)
            .await
            .map_err(self.object_error("copy_object", dest_key))?;
        Ok(())
    }

    async fn delete_object(&self, ctx: &RequestContext, key: &ObjectKey) -> CloudResult<()> {
        self.cos()
            .send_empty(ctx, CosRequest::new(Method::DELETE, key.url_path()))
            .await
            .map_err(self.object_error("delete_object", key))?;
        Ok(())
    }

    fn get_temp_url(
        &self,
        method: &str,
        key: &ObjectKey,
        expire: Duration,
    ) -> CloudResult<String> {
        let method = match method {
            "GET" => Method::GET,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            other => {
                return Err(CloudError::unsupported(
                    "get_temp_url",
                    format!("method {} cannot be presigned", other),
                ))
            }
        };
        let uri: Uri = format!("{}{}", self.endpoint.bucket_url(&self.full_name()), key.url_path())
            .parse()
            .map_err(|e| CloudError::invalid_input("get_temp_url", e))?;
        self.client
            .signer()
            .presign(&method, &uri, Utc::now().timestamp(), expire)
            .map_err(|e| QcloudError::from(e).into_cloud("get_temp_url", key.as_str()))
    }

    async fn get_acl(&self, ctx: &RequestContext) -> CloudResult<BucketAcl> {
        self.fetch_acl(ctx)
            .await
            .map_err(self.bucket_error("get_acl"))
    }

    async fn set_acl(&self, ctx: &RequestContext, acl: BucketAcl) -> CloudResult<()> {
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("acl")
            .header(ACL_HEADER, acl_header_value("set_acl", acl)?);
        self.cos()
            .send_empty(ctx, request)
            .await
            .map_err(self.bucket_error("set_acl"))?;
        Ok(())
    }

    async fn new_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        options: MultipartOptions,
    ) -> CloudResult<String> {
        let headers = self
            .write_headers(
                ctx,
                "new_multipart_upload",
                options.acl,
                options.storage_class.as_deref(),
                &options.metadata,
                true,
            )
            .await?;
        self.cos()
            .initiate_multipart(ctx, key, headers)
            .await
            .map_err(self.object_error("new_multipart_upload", key))
    }

    async fn upload_part(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        part_number: u32,
        body: RequestBody,
        part_size: i64,
    ) -> CloudResult<String> {
        Self::check_part_number("upload_part", part_number)?;
        self.cos()
            .upload_part(ctx, key, upload_id, part_number, body, part_size)
            .await
            .map_err(self.object_error("upload_part", key))
    }

    #[allow(clippy::too_many_arguments)]
    async fn copy_part(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        part_number: u32,
        src_bucket: &str,
        src_key: &ObjectKey,
        offset: u64,
        length: u64,
    ) -> CloudResult<String> {
        Self::check_part_number("copy_part", part_number)?;
        let range = ObjectRange::with_length(offset, length).ok_or_else(|| {
            CloudError::invalid_input(
                "copy_part",
                format!("no byte range of length {} at offset {}", length, offset),
            )
        })?;
        let source = self.copy_source(src_bucket, src_key);
        self.cos()
            .copy_part(
                ctx,
                key,
                upload_id,
                part_number,
                &source,
                range,
            )
            .await
            .map_err(self.object_error("copy_part", key))
    }

    async fn complete_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        etags: &[String],
    ) -> CloudResult<()> {
        let parts = CompletedPart::from_etags(etags);
        self.complete_parts(ctx, key, upload_id, &parts).await
    }

    async fn complete_parts(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> CloudResult<()> {
        CompletedPart::validate_sequence(parts)
            .map_err(|e| CloudError::invalid_input("complete_multipart_upload", e))?;
        self.cos()
            .complete_multipart(ctx, key, upload_id, parts)
            .await
            .map_err(self.object_error("complete_multipart_upload", key))
    }

    async fn abort_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
    ) -> CloudResult<()> {
        self.cos()
            .abort_multipart(ctx, key, upload_id)
            .await
            .map_err(self.object_error("abort_multipart_upload", key))
    }

    async fn list_multipart_uploads(
        &self,
        ctx: &RequestContext,
    ) -> CloudResult<Vec<MultipartUpload>> {
        self.cos()
            .list_multipart_uploads(ctx)
            .await
            .map_err(self.bucket_error("list_multipart_uploads"))
    }

    async fn set_website(&self, conf: &WebsiteConfig) -> CloudResult<()> {
        if conf.index.is_empty() {
            return Err(CloudError::unsupported("set_website", "missing index document"));
        }
        if conf.error_document.is_empty() {
            return Err(CloudError::unsupported("set_website", "missing error document"));
        }
        if !matches!(conf.protocol.as_str(), "http" | "https") {
            return Err(CloudError::unsupported(
                "set_website",
                format!("protocol {:?} is neither http nor https", conf.protocol),
            ));
        }
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("website")
            .xml_body(&website_to_wire(conf))
            .map_err(self.bucket_error("set_website"))?;
        self.send_config("set_website", request).await
    }

    async fn get_website(&self) -> CloudResult<WebsiteConfig> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("website");
        match self
            .cos()
            .send_xml::<WebsiteConfiguration>(&RequestContext::background(), request)
            .await
        {
            Ok((_, wire)) => Ok(website_from_wire(
                wire,
                self.endpoint.website_url(&self.full_name()),
            )),
            Err(e) if e.is_not_found() => Ok(WebsiteConfig::default()),
            Err(e) => Err(e.into_cloud("get_website", &self.full_name())),
        }
    }

    async fn delete_website(&self) -> CloudResult<()> {
        let request = CosRequest::new(Method::DELETE, "/").sub_resource("website");
        self.send_config("delete_website", request).await
    }

    async fn set_cors(&self, rules: &[CorsRule]) -> CloudResult<()> {
        if rules.is_empty() {
            return Ok(());
        }
        let conf = CorsConfiguration {
            rules: rules
                .iter()
                .map(|rule| CorsRuleEntry {
                    id: rule.id.clone(),
                    allowed_origins: rule.allowed_origins.clone(),
                    allowed_methods: rule.allowed_methods.clone(),
                    allowed_headers: rule.allowed_headers.clone(),
                    max_age_seconds: rule.max_age_seconds,
                    expose_headers: rule.expose_headers.clone(),
                })
                .collect(),
        };
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("cors")
            .xml_body(&conf)
            .map_err(self.bucket_error("set_cors"))?;
        self.send_config("set_cors", request).await
    }

    async fn get_cors(&self) -> CloudResult<Vec<CorsRule>> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("cors");
        let conf = match self
            .cos()
            .send_xml::<CorsConfiguration>(&RequestContext::background(), request)
            .await
        {
            Ok((_, conf)) => conf,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into_cloud("get_cors", &self.full_name())),
        };
        Ok(conf
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| CorsRule {
                id: i.to_string(),
                allowed_origins: rule.allowed_origins,
                allowed_methods: rule.allowed_methods,
                allowed_headers: rule.allowed_headers,
                expose_headers: rule.expose_headers,
                max_age_seconds: rule.max_age_seconds,
            })
            .collect())
    }

    async fn delete_cors(&self) -> CloudResult<()> {
        let request = CosRequest::new(Method::DELETE, "/").sub_resource("cors");
        self.send_config("delete_cors", request).await
    }

    async fn set_referer(&self, conf: &RefererConfig) -> CloudResult<()> {
        let request = CosRequest::new(Method::PUT, "/").sub_resource("referer");
        let request = if conf.enabled {
            let wire = RefererConfiguration {
                status: REFERER_ENABLED.to_string(),
                referer_type: conf.referer_type.clone(),
                domain_list: DomainList {
                    domains: conf.domain_list.clone(),
                },
                empty_refer_configuration: if conf.allow_empty_refer {
                    EMPTY_REFER_ALLOW
                } else {
                    EMPTY_REFER_DENY
                }
                .to_string(),
            };
            request
                .xml_body(&wire)
                .map_err(self.bucket_error("set_referer"))?
        } else {
            request
        };
        self.send_config("set_referer", request).await
    }

    async fn get_referer(&self) -> CloudResult<RefererConfig> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("referer");
        let wire = match self
            .cos()
            .send_xml::<RefererConfiguration>(&RequestContext::background(), request)
            .await
        {
            Ok((_, wire)) => wire,
            Err(e) if e.is_not_found() => return Ok(RefererConfig::default()),
            Err(e) => return Err(e.into_cloud("get_referer", &self.full_name())),
        };
        Ok(RefererConfig {
            enabled: wire.status == REFERER_ENABLED,
            allow_empty_refer: wire.empty_refer_configuration == EMPTY_REFER_ALLOW,
            referer_type: wire.referer_type,
            domain_list: wire.domain_list.domains,
        })
    }

    async fn get_policy(&self) -> CloudResult<Vec<PolicyStatement>> {
        let ctx = RequestContext::background();
        let Some(doc) = self
            .fetch_policy(&ctx)
            .await
            .map_err(self.bucket_error("get_policy"))?
        else {
            return Ok(Vec::new());
        };
        let names = self.principal_names(&ctx).await?;
        Ok(doc
            .statement
            .iter()
            .enumerate()
            .map(|(i, stmt)| statement_to_domain(i, stmt, names.as_ref()))
            .collect())
    }

    async fn set_policy(&self, input: &PolicyStatementInput) -> CloudResult<()> {
        let ctx = RequestContext::background();
        let mut doc = self
            .fetch_policy(&ctx)
            .await
            .map_err(self.bucket_error("set_policy"))?
            .unwrap_or_default();

        let owner = if needs_owner(&input.principal_id) {
            Some(self.client.owner(&ctx).await?.display_name)
        } else {
            None
        };
        let principals = principal_arns(&input.principal_id, owner.as_deref())?;
        let resources = resource_arns(
            self.region(),
            &self.app_id,
            &self.full_name(),
            &input.resource_path,
        );

        doc.statement
            .insert(0, statement_from_input(input, principals, resources));
        if doc.version.is_empty() {
            doc.version = POLICY_VERSION.to_string();
        }
        self.put_policy(&ctx, &doc)
            .await
            .map_err(self.bucket_error("set_policy"))
    }

    async fn delete_policy(&self, ids: &[String]) -> CloudResult<Vec<PolicyStatement>> {
        let ctx = RequestContext::background();
        let Some(doc) = self
            .fetch_policy(&ctx)
            .await
            .map_err(self.bucket_error("delete_policy"))?
        else {
            return Ok(Vec::new());
        };

        let (remaining, removed) = remove_statements(doc, ids);
        if removed.is_empty() {
            return Ok(Vec::new());
        }
        if remaining.statement.is_empty() {
            let request = CosRequest::new(Method::DELETE, "/").sub_resource("policy");
            self.cos()
                .send_empty(&ctx, request)
                .await
                .map_err(self.bucket_error("delete_policy"))?;
        } else {
            self.put_policy(&ctx, &remaining)
                .await
                .map_err(self.bucket_error("delete_policy"))?;
        }
        Ok(removed
            .iter()
            .map(|(i, stmt)| statement_to_domain(*i, stmt, None))
            .collect())
    }

    async fn get_tags(&self) -> CloudResult<BTreeMap<String, String>> {
        let request = CosRequest::new(Method::GET, "/").sub_resource("tagging");
        match self
            .cos()
            .send_xml::<Tagging>(&RequestContext::background(), request)
            .await
        {
            Ok((_, tagging)) => Ok(tagging
                .tag_set
                .tags
                .into_iter()
                .map(|t| (t.key, t.value))
                .collect()),
            Err(e) if e.is_not_found() => Ok(BTreeMap::new()),
            Err(e) => Err(e.into_cloud("get_tags", &self.full_name())),
        }
    }

    async fn set_tags(&self, tags: &BTreeMap<String, String>, replace: bool) -> CloudResult<()> {
        if !replace {
            return Err(CloudError::unsupported(
                "set_tags",
                "tags can only be replaced as a whole",
            ));
        }
        let ctx = RequestContext::background();
        let request = CosRequest::new(Method::DELETE, "/").sub_resource("tagging");
        match self.cos().send_empty(&ctx, request).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into_cloud("set_tags", &self.full_name())),
        }
        if tags.is_empty() {
            return Ok(());
        }

        let tagging = Tagging {
            tag_set: TagSet {
                tags: tags
                    .iter()
                    .map(|(k, v)| Tag {
                        key: k.clone(),
                        value: v.clone(),
                    })
                    .collect(),
            },
        };
        let request = CosRequest::new(Method::PUT, "/")
            .sub_resource("tagging")
            .xml_body(&tagging)
            .map_err(self.bucket_error("set_tags"))?;
        self.send_config("set_tags", request).await
    }

    async fn get_cdn_domains(&self) -> CloudResult<Vec<CdnDomain>> {
        let ctx = RequestContext::background();
        let full_name = self.full_name();
        let mut domains = Vec::new();
        for origin in [
            self.endpoint.bucket_host(&full_name),
            self.endpoint.bucket_website_host(&full_name),
        ] {
            let entries = self
                .client
                .describe_all_cdn_domains(&ctx, &[origin.as_str()], COS_DOMAIN_TYPE)
                .await
                .map_err(self.bucket_error("get_cdn_domains"))?;
            domains.extend(entries.into_iter().map(|e| cdn_domain(e, &origin)));
        }
        Ok(domains)
    }
}
