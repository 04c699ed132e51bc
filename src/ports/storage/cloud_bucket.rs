use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    errors::CloudResult,
    models::{
        BucketAccessUrl, BucketAcl, CdnDomain, CompletedPart, CopyObjectOptions, CorsRule,
        ListFilter, ListObjectResult, MultipartOptions, MultipartUpload, ObjectMeta, ObjectRange,
        PolicyStatement, PolicyStatementInput, PutObjectOptions, RefererConfig, WebsiteConfig,
    },
    value_objects::ObjectKey,
};
use crate::ports::transport::{RequestBody, RequestContext, ResponseBody};

/// Port for a provider's bucket.
///
/// Data-plane calls take a [`RequestContext`] so the caller can cancel them;
/// bucket configuration calls run to completion.
#[async_trait]
pub trait CloudBucket: Send + Sync + 'static {
    /// Short name when the bucket belongs to the client's own tenant,
    /// `{name}-{appId}` otherwise
    fn global_id(&self) -> String;

    fn name(&self) -> &str;

    /// `{name}-{appId}`, as used in every hostname
    fn full_name(&self) -> String;

    fn location(&self) -> &str;

    fn region(&self) -> &str;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    fn access_urls(&self) -> Vec<BucketAccessUrl>;

    async fn list_objects(
        &self,
        ctx: &RequestContext,
        filter: &ListFilter,
    ) -> CloudResult<ListObjectResult>;

    /// Upload `body`; a positive `size` is sent as `Content-Length`,
    /// otherwise the upload is chunked
    async fn put_object(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        body: RequestBody,
        size: i64,
        options: PutObjectOptions,
    ) -> CloudResult<()>;

    /// Stream an object, or the given byte range of it
    async fn get_object(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        range: Option<ObjectRange>,
    ) -> CloudResult<ResponseBody>;

    async fn get_object_meta(&self, ctx: &RequestContext, key: &ObjectKey)
        -> CloudResult<ObjectMeta>;

    async fn copy_object(
        &self,
        ctx: &RequestContext,
        dest_key: &ObjectKey,
        src_bucket: &str,
        src_key: &ObjectKey,
        options: CopyObjectOptions,
    ) -> CloudResult<()>;

    async fn delete_object(&self, ctx: &RequestContext, key: &ObjectKey) -> CloudResult<()>;

    /// Presigned URL for `GET`, `PUT` or `DELETE`
    fn get_temp_url(&self, method: &str, key: &ObjectKey, expire: Duration)
        -> CloudResult<String>;

    async fn get_acl(&self, ctx: &RequestContext) -> CloudResult<BucketAcl>;

    async fn set_acl(&self, ctx: &RequestContext, acl: BucketAcl) -> CloudResult<()>;

    /// Returns the upload id
    async fn new_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        options: MultipartOptions,
    ) -> CloudResult<String>;

    /// Returns the part's ETag
    async fn upload_part(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        part_number: u32,
        body: RequestBody,
        part_size: i64,
    ) -> CloudResult<String>;

    /// Copy `length` bytes at `offset` of another object into a part
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
    ) -> CloudResult<String>;

    /// Complete with `etags[i]` as part `i + 1`
    async fn complete_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        etags: &[String],
    ) -> CloudResult<()>;

    /// Complete with explicit parts, which must be numbered `1..=n` in order
    async fn complete_parts(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> CloudResult<()>;

    async fn abort_multipart_upload(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
    ) -> CloudResult<()>;

    async fn list_multipart_uploads(&self, ctx: &RequestContext)
        -> CloudResult<Vec<MultipartUpload>>;

    async fn set_website(&self, conf: &WebsiteConfig) -> CloudResult<()>;

    /// Empty config when none is set
    async fn get_website(&self) -> CloudResult<WebsiteConfig>;

    async fn delete_website(&self) -> CloudResult<()>;

    /// Replaces all rules; an empty slice leaves the bucket untouched
    async fn set_cors(&self, rules: &[CorsRule]) -> CloudResult<()>;

    /// Empty when no CORS configuration is set
    async fn get_cors(&self) -> CloudResult<Vec<CorsRule>>;

    async fn delete_cors(&self) -> CloudResult<()>;

    async fn set_referer(&self, conf: &RefererConfig) -> CloudResult<()>;

    async fn get_referer(&self) -> CloudResult<RefererConfig>;

    async fn get_policy(&self) -> CloudResult<Vec<PolicyStatement>>;

    async fn set_policy(&self, input: &PolicyStatementInput) -> CloudResult<()>;

    /// Remove statements by positional id and return the removed ones
    async fn delete_policy(&self, ids: &[String]) -> CloudResult<Vec<PolicyStatement>>;

    async fn get_tags(&self) -> CloudResult<BTreeMap<String, String>>;

    /// Only `replace = true` is supported
    async fn set_tags(&self, tags: &BTreeMap<String, String>, replace: bool) -> CloudResult<()>;

    async fn get_cdn_domains(&self) -> CloudResult<Vec<CdnDomain>>;
}
