use std::time::Duration;

use chrono::DateTime;
use hmac::{Hmac, Mac};
use http::{header, request::Parts, HeaderMap, HeaderValue, Method, Uri};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::ports::transport::{SignError, Signer};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Validity window of a header signature
const SIGN_VALIDITY: Duration = Duration::from_secs(3600);

fn hmac_sha1_hex(key: &[u8], data: &str) -> Result<String, SignError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|e| SignError(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>, SignError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| SignError(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha1_hex(data: &str) -> String {
    hex::encode(Sha1::digest(data.as_bytes()))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn decode_lossy(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Lowercased, percent-encoded and sorted key/value pairs
fn canonical_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = pairs
        .map(|(k, v)| {
            (
                urlencoding::encode(k).to_lowercase(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    out.sort();
    out
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn join_keys(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (decode_lossy(k), decode_lossy(v)),
            None => (decode_lossy(p), String::new()),
        })
        .collect()
}

fn is_signed_header(name: &str) -> bool {
    matches!(
        name,
        "host" | "content-type" | "content-md5" | "content-length" | "range"
    ) || name.starts_with("x-cos-")
}

/// Signs COS requests with `q-sign-algorithm=sha1`
#[derive(Clone)]
pub struct CosSigner {
    secret_id: String,
    secret_key: String,
}

impl std::fmt::Debug for CosSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosSigner")
            .field("secret_id", &self.secret_id)
            .finish_non_exhaustive()
    }
}

impl CosSigner {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// `method\npath\nparams\nheaders\n`
    pub(crate) fn http_string(
        method: &Method,
        path: &str,
        params: &[(String, String)],
        headers: &[(String, String)],
    ) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            method.as_str().to_lowercase(),
            path,
            join_pairs(params),
            join_pairs(headers)
        )
    }

    /// Ordered `q-*` pairs making up an authorization
    fn auth_pairs(
        &self,
        method: &Method,
        path: &str,
        params: &[(String, String)],
        headers: &[(String, String)],
        key_time: &str,
    ) -> Result<Vec<(&'static str, String)>, SignError> {
        let sign_key = hmac_sha1_hex(self.secret_key.as_bytes(), key_time)?;
        let http_string = Self::http_string(method, path, params, headers);
        let string_to_sign = format!("sha1\n{}\n{}\n", key_time, sha1_hex(&http_string));
        let signature = hmac_sha1_hex(sign_key.as_bytes(), &string_to_sign)?;

        Ok(vec![
            ("q-sign-algorithm", "sha1".to_string()),
            ("q-ak", self.secret_id.clone()),
            ("q-sign-time", key_time.to_string()),
            ("q-key-time", key_time.to_string()),
            ("q-header-list", join_keys(headers)),
            ("q-url-param-list", join_keys(params)),
            ("q-signature", signature),
        ])
    }
}

impl Signer for CosSigner {
    fn sign(&self, parts: &mut Parts, now_unix: i64) -> Result<(), SignError> {
        if !parts.headers.contains_key(header::HOST) {
            let host = parts
                .uri
                .host()
                .ok_or_else(|| SignError("request uri has no host".to_string()))?;
            let value = HeaderValue::from_str(host).map_err(|e| SignError(e.to_string()))?;
            parts.headers.insert(header::HOST, value);
        }

        let key_time = format!("{};{}", now_unix, now_unix + SIGN_VALIDITY.as_secs() as i64);
        let path = decode_lossy(parts.uri.path());

        let query = query_pairs(&parts.uri);
        let params = canonical_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let header_values: Vec<(&str, &str)> = parts
            .headers
            .iter()
            .filter(|(name, _)| is_signed_header(name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();
        let headers = canonical_pairs(header_values.into_iter());

        let pairs = self.auth_pairs(&parts.method, &path, &params, &headers, &key_time)?;
        let authorization = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let value = HeaderValue::from_str(&authorization).map_err(|e| SignError(e.to_string()))?;
        parts.headers.insert(header::AUTHORIZATION, value);
        Ok(())
    }

    fn presign(
        &self,
        method: &Method,
        uri: &Uri,
        now_unix: i64,
        expire: Duration,
    ) -> Result<String, SignError> {
        let host = uri
            .host()
            .ok_or_else(|| SignError("presign uri has no host".to_string()))?;
        let scheme = uri.scheme_str().unwrap_or("https");
        let key_time = format!("{};{}", now_unix, now_unix + expire.as_secs() as i64);
        let path = decode_lossy(uri.path());

        let query = query_pairs(uri);
        let params = canonical_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let headers = canonical_pairs(std::iter::once(("host", host)));

        let pairs = self.auth_pairs(method, &path, &params, &headers, &key_time)?;
        let mut query_string: Vec<String> = uri
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| vec![q.to_string()])
            .unwrap_or_default();
        query_string.extend(
            pairs
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v))),
        );

        Ok(format!(
            "{}://{}{}?{}",
            scheme,
            host,
            uri.path(),
            query_string.join("&")
        ))
    }
}

/// Signs JSON cloud API calls with TC3-HMAC-SHA256
#[derive(Clone)]
pub struct Tc3Signer {
    secret_id: String,
    secret_key: String,
}

impl std::fmt::Debug for Tc3Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tc3Signer")
            .field("secret_id", &self.secret_id)
            .finish_non_exhaustive()
    }
}

pub(crate) const TC3_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// One call against the JSON API
pub struct Tc3Request<'a> {
    pub service: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub region: Option<&'a str>,
    pub payload: &'a [u8],
}

impl Tc3Signer {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The `Authorization` value for a POST of `request.payload` to `/`
    pub fn authorization(&self, request: &Tc3Request<'_>, timestamp: i64) -> Result<String, SignError> {
        let date = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| SignError(format!("invalid timestamp {}", timestamp)))?
            .format("%Y-%m-%d")
            .to_string();

        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{}\nhost:{}\n\ncontent-type;host\n{}",
            TC3_CONTENT_TYPE,
            request.host,
            sha256_hex(request.payload)
        );
        let scope = format!("{}/{}/tc3_request", date, request.service);
        let string_to_sign = format!(
            "TC3-HMAC-SHA256\n{}\n{}\n{}",
            timestamp,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key).as_bytes(), &date)?;
        let secret_service = hmac_sha256(&secret_date, request.service)?;
        let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
        let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

        Ok(format!(
            "TC3-HMAC-SHA256 Credential={}/{}, SignedHeaders=content-type;host, Signature={}",
            self.secret_id, scope, signature
        ))
    }

    /// Full header set for the call
    pub fn headers(&self, request: &Tc3Request<'_>, timestamp: i64) -> Result<HeaderMap, SignError> {
        let authorization = self.authorization(request, timestamp)?;
        let mut headers = HeaderMap::new();
        let mut insert = |name: &'static str, value: &str| -> Result<(), SignError> {
            let value = HeaderValue::from_str(value).map_err(|e| SignError(e.to_string()))?;
            headers.insert(name, value);
            Ok(())
        };
        insert("authorization", &authorization)?;
        insert("content-type", TC3_CONTENT_TYPE)?;
        insert("host", request.host)?;
        insert("x-tc-action", request.action)?;
        insert("x-tc-timestamp", &timestamp.to_string())?;
        insert("x-tc-version", request.version)?;
        if let Some(region) = request.region {
            insert("x-tc-region", region)?;
        }
        Ok(headers)
    }
}
