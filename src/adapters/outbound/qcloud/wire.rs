//! XML and JSON bodies exchanged with COS.
//!
//! Decoding is lenient: unknown elements are ignored and missing ones fall
//! back to defaults, so partial responses still parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::models::{ConditionValue, PolicyConditions, PolicyEffect};

#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Resource", default)]
    pub resource: String,
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Owner {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
}

// Service listing

#[derive(Debug, Default, Deserialize)]
pub struct ListAllMyBucketsResult {
    #[serde(rename = "Owner", default)]
    pub owner: Owner,
    #[serde(rename = "Buckets", default)]
    pub buckets: BucketList,
}

#[derive(Debug, Default, Deserialize)]
pub struct BucketList {
    #[serde(rename = "Bucket", default)]
    pub bucket: Vec<BucketEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BucketEntry {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "CreationDate", default)]
    pub creation_date: String,
}

// Object listing

#[derive(Debug, Default, Deserialize)]
pub struct ListBucketResult {
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextMarker", default)]
    pub next_marker: Option<String>,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ObjectEntry>,
    #[serde(rename = "CommonPrefixes", default)]
    pub common_prefixes: Vec<CommonPrefix>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObjectEntry {
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "LastModified", default)]
    pub last_modified: String,
    #[serde(rename = "ETag", default)]
    pub etag: String,
    #[serde(rename = "Size", default)]
    pub size: i64,
    #[serde(rename = "StorageClass", default)]
    pub storage_class: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommonPrefix {
    #[serde(rename = "Prefix", default)]
    pub prefix: String,
}

// ACL

#[derive(Debug, Default, Deserialize)]
pub struct AccessControlPolicy {
    #[serde(rename = "Owner", default)]
    pub owner: Owner,
    #[serde(rename = "AccessControlList", default)]
    pub access_control_list: AccessControlList,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccessControlList {
    #[serde(rename = "Grant", default)]
    pub grant: Vec<GrantEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GrantEntry {
    #[serde(rename = "Grantee", default)]
    pub grantee: Grantee,
    #[serde(rename = "Permission", default)]
    pub permission: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Grantee {
    #[serde(rename = "URI", default)]
    pub uri: String,
    #[serde(rename = "ID", default)]
    pub id: String,
}

// Multipart

#[derive(Debug, Default, Deserialize)]
pub struct InitiateMultipartUploadResult {
    #[serde(rename = "UploadId", default)]
    pub upload_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "CompleteMultipartUpload")]
pub struct CompleteMultipartUpload {
    #[serde(rename = "Part")]
    pub parts: Vec<CompletePart>,
}

#[derive(Debug, Serialize)]
pub struct CompletePart {
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
    #[serde(rename = "ETag")]
    pub etag: String,
}

/// Body of both `CopyObjectResult` and `CopyPartResult`
#[derive(Debug, Default, Deserialize)]
pub struct CopyResult {
    #[serde(rename = "ETag", default)]
    pub etag: String,
    #[serde(rename = "LastModified", default)]
    pub last_modified: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMultipartUploadsResult {
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextKeyMarker", default)]
    pub next_key_marker: String,
    #[serde(rename = "NextUploadIdMarker", default)]
    pub next_upload_id_marker: String,
    #[serde(rename = "Upload", default)]
    pub uploads: Vec<UploadEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadEntry {
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "UploadId", default)]
    pub upload_id: String,
    #[serde(rename = "StorageClass", default)]
    pub storage_class: String,
    #[serde(rename = "Initiator", default)]
    pub initiator: Owner,
    #[serde(rename = "Initiated", default)]
    pub initiated: String,
}

// Website

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "WebsiteConfiguration")]
pub struct WebsiteConfiguration {
    #[serde(rename = "IndexDocument", default, skip_serializing_if = "Option::is_none")]
    pub index_document: Option<IndexDocument>,
    #[serde(
        rename = "RedirectAllRequestsTo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_all_requests_to: Option<RedirectAllRequestsTo>,
    #[serde(rename = "ErrorDocument", default, skip_serializing_if = "Option::is_none")]
    pub error_document: Option<ErrorDocument>,
    #[serde(rename = "RoutingRules", default, skip_serializing_if = "Option::is_none")]
    pub routing_rules: Option<RoutingRules>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(rename = "Suffix", default)]
    pub suffix: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RedirectAllRequestsTo {
    #[serde(rename = "Protocol", default)]
    pub protocol: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorDocument {
    #[serde(rename = "Key", default)]
    pub key: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoutingRules {
    #[serde(rename = "RoutingRule", default)]
    pub rules: Vec<RoutingRule>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoutingRule {
    #[serde(rename = "Condition", default)]
    pub condition: RoutingCondition,
    #[serde(rename = "Redirect", default)]
    pub redirect: RoutingRedirect,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoutingCondition {
    #[serde(
        rename = "HttpErrorCodeReturnedEquals",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub http_error_code: String,
    #[serde(rename = "KeyPrefixEquals", default, skip_serializing_if = "String::is_empty")]
    pub key_prefix: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoutingRedirect {
    #[serde(rename = "Protocol", default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(rename = "ReplaceKeyWith", default, skip_serializing_if = "String::is_empty")]
    pub replace_key: String,
    #[serde(
        rename = "ReplaceKeyPrefixWith",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub replace_key_prefix: String,
}

// CORS

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "CORSConfiguration")]
pub struct CorsConfiguration {
    #[serde(rename = "CORSRule", default)]
    pub rules: Vec<CorsRuleEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CorsRuleEntry {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "AllowedOrigin", default)]
    pub allowed_origins: Vec<String>,
    #[serde(rename = "AllowedMethod", default)]
    pub allowed_methods: Vec<String>,
    #[serde(rename = "AllowedHeader", default)]
    pub allowed_headers: Vec<String>,
    #[serde(rename = "MaxAgeSeconds", default)]
    pub max_age_seconds: i64,
    #[serde(rename = "ExposeHeader", default)]
    pub expose_headers: Vec<String>,
}

// Referer

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "RefererConfiguration")]
pub struct RefererConfiguration {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "RefererType", default)]
    pub referer_type: String,
    #[serde(rename = "DomainList", default)]
    pub domain_list: DomainList,
    #[serde(rename = "EmptyReferConfiguration", default)]
    pub empty_refer_configuration: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DomainList {
    #[serde(rename = "Domain", default)]
    pub domains: Vec<String>,
}

// Tagging

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Tagging")]
pub struct Tagging {
    #[serde(rename = "TagSet", default)]
    pub tag_set: TagSet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TagSet {
    #[serde(rename = "Tag", default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

// Policy (JSON)

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ConditionValue>::deserialize(deserializer)? {
        Some(ConditionValue::One(v)) => vec![v],
        Some(ConditionValue::Many(vs)) => vs,
        None => Vec::new(),
    })
}

fn principal_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, ConditionValue>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| match v {
            ConditionValue::One(v) => (k, vec![v]),
            ConditionValue::Many(vs) => (k, vs),
        })
        .collect())
}

/// Bucket policy document
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(alias = "Version", default)]
    pub version: String,
    #[serde(
        alias = "Principal",
        default,
        deserialize_with = "principal_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub principal: BTreeMap<String, Vec<String>>,
    #[serde(alias = "Statement", default)]
    pub statement: Vec<PolicyStatementEntry>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatementEntry {
    #[serde(alias = "Principal", default, deserialize_with = "principal_map")]
    pub principal: BTreeMap<String, Vec<String>>,
    #[serde(alias = "Effect", default)]
    pub effect: PolicyEffect,
    #[serde(alias = "Action", default, deserialize_with = "one_or_many")]
    pub action: Vec<String>,
    #[serde(alias = "Resource", default, deserialize_with = "one_or_many")]
    pub resource: Vec<String>,
    #[serde(
        alias = "Condition",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub condition: PolicyConditions,
}
