//! Multipart upload calls.
//!
//! These are thin wire operations; part-number checks happen in the bucket
//! facade before anything is sent.

use http::{header, HeaderMap, HeaderValue, Method, StatusCode};

use super::client::{is_error_document, service_error, CosClient, CosRequest};
use super::codec::parse_timestamp;
use super::error::{QcloudError, QcloudResult};
use super::wire::{
    CompleteMultipartUpload, CompletePart, CopyResult, InitiateMultipartUploadResult,
    ListMultipartUploadsResult,
};
use crate::domain::{
    models::{CompletedPart, MultipartUpload, ObjectRange},
    value_objects::ObjectKey,
};
use crate::ports::{RequestBody, RequestContext};

pub const COPY_SOURCE_HEADER: &str = "x-cos-copy-source";
pub const COPY_SOURCE_RANGE_HEADER: &str = "x-cos-copy-source-range";

fn etag_of(headers: &HeaderMap) -> String {
    headers
        .get(header::ETAG)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn header_value(value: &str) -> QcloudResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| QcloudError::Http(e.into()))
}

impl CosClient {
    /// Start an upload and return its id
    pub async fn initiate_multipart(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        headers: HeaderMap,
    ) -> QcloudResult<String> {
        let mut request = CosRequest::new(Method::POST, key.url_path()).sub_resource("uploads");
        request.headers_mut().extend(headers);
        let (_, result): (_, InitiateMultipartUploadResult) = self.send_xml(ctx, request).await?;
        Ok(result.upload_id)
    }

    pub async fn upload_part(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        part_number: u32,
        body: RequestBody,
        part_size: i64,
    ) -> QcloudResult<String> {
        let mut request = CosRequest::new(Method::PUT, key.url_path())
            .query("partNumber", part_number.to_string())
            .query("uploadId", upload_id)
            .body(body);
        if part_size > 0 {
            request
                .headers_mut()
                .insert(header::CONTENT_LENGTH, HeaderValue::from(part_size));
        }
        let headers = self.send_empty(ctx, request).await?;
        Ok(etag_of(&headers))
    }

    /// Fill a part from `range` of the object at `source` (`host/key`)
    pub async fn copy_part(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        part_number: u32,
        source: &str,
        range: ObjectRange,
    ) -> QcloudResult<String> {
        let request = CosRequest::new(Method::PUT, key.url_path())
            .query("partNumber", part_number.to_string())
            .query("uploadId", upload_id)
            .header(COPY_SOURCE_HEADER, header_value(source)?)
            .header(COPY_SOURCE_RANGE_HEADER, header_value(&range.to_string())?);
        let (_, result): (_, CopyResult) = self.send_xml(ctx, request).await?;
        Ok(result.etag)
    }

    /// Send the part list in the order given
    pub async fn complete_multipart(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> QcloudResult<()> {
        let body = CompleteMultipartUpload {
            parts: parts
                .iter()
                .map(|p| CompletePart {
                    part_number: p.part_number,
                    etag: p.etag.clone(),
                })
                .collect(),
        };
        let request = CosRequest::new(Method::POST, key.url_path())
            .query("uploadId", upload_id)
            .xml_body(&body)?;
        let (headers, data) = self.send_bytes(ctx, request).await?;
        if is_error_document(&data) {
            return Err(service_error(StatusCode::OK, &headers, &data));
        }
        Ok(())
    }

    pub async fn abort_multipart(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
        upload_id: &str,
    ) -> QcloudResult<()> {
        let request = CosRequest::new(Method::DELETE, key.url_path()).query("uploadId", upload_id);
        self.send_empty(ctx, request).await?;
        Ok(())
    }

    /// Every in-flight upload, following both listing markers
    pub async fn list_multipart_uploads(
        &self,
        ctx: &RequestContext,
    ) -> QcloudResult<Vec<MultipartUpload>> {
        let mut uploads = Vec::new();
        let mut key_marker = String::new();
        let mut upload_id_marker = String::new();
        loop {
            let mut request = CosRequest::new(Method::GET, "/").sub_resource("uploads");
            if !key_marker.is_empty() {
                request = request.query("key-marker", key_marker.as_str());
            }
            if !upload_id_marker.is_empty() {
                request = request.query("upload-id-marker", upload_id_marker.as_str());
            }
            let (_, page): (_, ListMultipartUploadsResult) = self.send_xml(ctx, request).await?;

            uploads.extend(page.uploads.into_iter().map(|u| MultipartUpload {
                object_name: u.key,
                upload_id: u.upload_id,
                initiator: u.initiator.display_name,
                initiated: parse_timestamp(&u.initiated),
                storage_class: u.storage_class,
            }));

            if !page.is_truncated {
                break;
            }
            // a truncated page without markers would repeat forever
            if page.next_key_marker == key_marker && page.next_upload_id_marker == upload_id_marker {
                break;
            }
            key_marker = page.next_key_marker;
            upload_id_marker = page.next_upload_id_marker;
        }
        Ok(uploads)
    }
}
