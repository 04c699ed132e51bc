use chrono::{DateTime, Utc};
use http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::domain::{
    errors::ValidationError,
    models::{
        META_HEADER_CACHE_CONTROL, META_HEADER_CONTENT_DISPOSITION, META_HEADER_CONTENT_ENCODING,
        META_HEADER_CONTENT_MD5, META_HEADER_CONTENT_TYPE,
    },
};

/// Wire prefix of user-defined metadata headers
pub const COS_META_PREFIX: &str = "x-cos-meta-";

/// Caller metadata split into typed request fields and prefixed user headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedMetadata {
    pub cache_control: Option<HeaderValue>,
    pub content_type: Option<HeaderValue>,
    pub content_md5: Option<HeaderValue>,
    pub content_encoding: Option<HeaderValue>,
    pub content_disposition: Option<HeaderValue>,
    /// Already carrying the `x-cos-meta-` prefix
    pub user: Vec<(HeaderName, HeaderValue)>,
}

impl EncodedMetadata {
    pub fn is_empty(&self) -> bool {
        self.cache_control.is_none()
            && self.content_type.is_none()
            && self.content_md5.is_none()
            && self.content_encoding.is_none()
            && self.content_disposition.is_none()
            && self.user.is_empty()
    }

    /// Write every field onto an outgoing request's headers
    pub fn apply(&self, headers: &mut HeaderMap) {
        let typed = [
            (header::CACHE_CONTROL, &self.cache_control),
            (header::CONTENT_TYPE, &self.content_type),
            (HeaderName::from_static(META_HEADER_CONTENT_MD5), &self.content_md5),
            (header::CONTENT_ENCODING, &self.content_encoding),
            (header::CONTENT_DISPOSITION, &self.content_disposition),
        ];
        for (name, value) in typed {
            if let Some(value) = value {
                headers.insert(name, value.clone());
            }
        }
        for (name, value) in &self.user {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Classify caller metadata.
///
/// The five canonical names go to typed fields; any other header with a
/// non-empty first value becomes exactly one `x-cos-meta-` header. Empty
/// values are dropped.
pub fn encode_metadata(meta: &HeaderMap) -> Result<EncodedMetadata, ValidationError> {
    let mut out = EncodedMetadata::default();
    for name in meta.keys() {
        let Some(value) = meta.get(name) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let value = value.clone();
        match name.as_str() {
            META_HEADER_CACHE_CONTROL => out.cache_control = Some(value),
            META_HEADER_CONTENT_TYPE => out.content_type = Some(value),
            META_HEADER_CONTENT_MD5 => out.content_md5 = Some(value),
            META_HEADER_CONTENT_ENCODING => out.content_encoding = Some(value),
            META_HEADER_CONTENT_DISPOSITION => out.content_disposition = Some(value),
            other => {
                let wire = if other.starts_with(COS_META_PREFIX) {
                    name.clone()
                } else {
                    HeaderName::try_from(format!("{}{}", COS_META_PREFIX, other)).map_err(
                        |_| ValidationError::InvalidField {
                            field: "metadata".to_string(),
                            value: other.to_string(),
                            expected: "a valid header name".to_string(),
                        },
                    )?
                };
                out.user.push((wire, value));
            }
        }
    }
    Ok(out)
}

/// Public view of wire headers: canonical headers as-is, user metadata with
/// the prefix stripped
pub fn decode_metadata(wire: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in wire {
        match name.as_str() {
            META_HEADER_CACHE_CONTROL
            | META_HEADER_CONTENT_TYPE
            | META_HEADER_CONTENT_MD5
            | META_HEADER_CONTENT_ENCODING
            | META_HEADER_CONTENT_DISPOSITION => {
                out.append(name.clone(), value.clone());
            }
            other => {
                if let Some(stripped) = other.strip_prefix(COS_META_PREFIX) {
                    if let Ok(public) = HeaderName::try_from(stripped) {
                        out.append(public, value.clone());
                    }
                }
            }
        }
    }
    out
}

/// Parse a listing timestamp (RFC 3339) or an HTTP date header
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Base64 of the MD5 digest, as sent in `Content-MD5`
pub fn content_md5(body: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(md5::compute(body).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(
                HeaderName::try_from(*k).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_canonical_headers_go_to_typed_fields() {
        let encoded = encode_metadata(&meta(&[
            ("Content-Type", "text/plain"),
            ("Cache-Control", "no-cache"),
            ("Content-MD5", "abc=="),
            ("Content-Encoding", "gzip"),
            ("Content-Disposition", "attachment"),
        ]))
        .unwrap();
        assert_eq!(encoded.content_type.unwrap(), "text/plain");
        assert_eq!(encoded.cache_control.unwrap(), "no-cache");
        assert_eq!(encoded.content_md5.unwrap(), "abc==");
        assert_eq!(encoded.content_encoding.unwrap(), "gzip");
        assert_eq!(encoded.content_disposition.unwrap(), "attachment");
        assert!(encoded.user.is_empty());
    }

    #[test]
    fn test_user_metadata_prefixed_once() {
        let encoded = encode_metadata(&meta(&[
            ("Project", "alpha"),
            ("project", "beta"),
            ("x-cos-meta-owner", "ops"),
            ("empty", ""),
        ]))
        .unwrap();
        let names: Vec<_> = encoded.user.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x-cos-meta-project", "x-cos-meta-owner"]);
        assert_eq!(encoded.user[0].1, "alpha");

        let mut headers = HeaderMap::new();
        encoded.apply(&mut headers);
        assert_eq!(headers.get_all("x-cos-meta-project").iter().count(), 1);
        assert!(headers.get("x-cos-meta-empty").is_none());
    }

    #[test]
    fn test_decode_strips_prefix() {
        let decoded = decode_metadata(&meta(&[
            ("content-type", "image/png"),
            ("x-cos-meta-project", "alpha"),
            ("x-cos-request-id", "abc"),
            ("etag", "\"e\""),
        ]));
        assert_eq!(decoded["content-type"], "image/png");
        assert_eq!(decoded["project"], "alpha");
        assert!(decoded.get("x-cos-request-id").is_none());
        assert!(decoded.get("etag").is_none());
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2019-05-24T10:56:40.000Z").is_some());
        assert!(parse_timestamp("Thu, 16 May 2019 03:15:06 GMT").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_content_md5() {
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }
}
