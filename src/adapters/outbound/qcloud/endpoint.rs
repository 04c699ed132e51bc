use crate::domain::models::BucketAccessUrl;

/// Host serving the account-wide bucket listing
pub const COS_SERVICE_HOST: &str = "service.cos.myqcloud.com";

/// Host of the JSON cloud API used for CDN queries
pub const CDN_API_HOST: &str = "cdn.tencentcloudapi.com";

const COS_DOMAIN: &str = "myqcloud.com";

/// `{name}-{appId}`, the form used in every hostname
pub fn full_bucket_name(name: &str, app_id: &str) -> String {
    format!("{}-{}", name, app_id)
}

/// Split a fully-qualified bucket name at its last `-`.
///
/// Returns `None` unless the suffix is a non-empty run of digits.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (name, app_id) = full_name.rsplit_once('-')?;
    if name.is_empty() || app_id.is_empty() || !app_id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((name, app_id))
}

/// Resolves COS hostnames for a region, or a zone inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosEndpoint {
    region: String,
    zone: Option<String>,
    scheme: String,
}

impl CosEndpoint {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            zone: None,
            scheme: "https".to_string(),
        }
    }

    /// Zone-scoped hosts take precedence over region-scoped ones
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    fn scope(&self) -> &str {
        self.zone.as_deref().unwrap_or(&self.region)
    }

    pub fn cos_host(&self) -> String {
        format!("cos.{}.{}", self.scope(), COS_DOMAIN)
    }

    /// Region host, ignoring any zone
    pub fn region_cos_host(&self) -> String {
        format!("cos.{}.{}", self.region, COS_DOMAIN)
    }

    pub fn website_host(&self) -> String {
        format!("cos-website.{}.{}", self.scope(), COS_DOMAIN)
    }

    pub fn bucket_host(&self, full_name: &str) -> String {
        format!("{}.{}", full_name, self.cos_host())
    }

    pub fn bucket_website_host(&self, full_name: &str) -> String {
        format!("{}.{}", full_name, self.website_host())
    }

    pub fn bucket_url(&self, full_name: &str) -> String {
        format!("{}://{}", self.scheme, self.bucket_host(full_name))
    }

    pub fn website_url(&self, full_name: &str) -> String {
        format!("{}://{}", self.scheme, self.bucket_website_host(full_name))
    }

    /// Virtual-host URL first, path-style fallback on the region host second
    pub fn access_urls(&self, full_name: &str) -> Vec<BucketAccessUrl> {
        vec![
            BucketAccessUrl {
                url: self.bucket_url(full_name),
                description: "bucket domain".to_string(),
                primary: true,
            },
            BucketAccessUrl {
                url: format!("{}://{}/{}", self.scheme, self.region_cos_host(), full_name),
                description: "cos domain".to_string(),
                primary: false,
            },
        ]
    }

    /// Recover `(name, appId)` from a virtual-host bucket hostname
    pub fn parse_bucket_host(host: &str) -> Option<(String, String)> {
        let (full_name, rest) = host.split_once('.')?;
        if !(rest.starts_with("cos.") || rest.starts_with("cos-website.")) {
            return None;
        }
        let (name, app_id) = split_full_name(full_name)?;
        Some((name.to_string(), app_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_hosts() {
        let ep = CosEndpoint::new("ap-beijing");
        assert_eq!(
            ep.bucket_host("logs-100001"),
            "logs-100001.cos.ap-beijing.myqcloud.com"
        );
        assert_eq!(
            ep.bucket_website_host("logs-100001"),
            "logs-100001.cos-website.ap-beijing.myqcloud.com"
        );
    }

    #[test]
    fn test_zone_overrides_region() {
        let ep = CosEndpoint::new("ap-shanghai").with_zone("ap-shanghai-fsi");
        assert_eq!(ep.cos_host(), "cos.ap-shanghai-fsi.myqcloud.com");
        assert_eq!(ep.region(), "ap-shanghai");
    }

    #[test]
    fn test_access_urls() {
        let urls = CosEndpoint::new("ap-beijing").access_urls("logs-100001");
        assert_eq!(urls.len(), 2);
        assert!(urls[0].primary);
        assert_eq!(urls[0].url, "https://logs-100001.cos.ap-beijing.myqcloud.com");
        assert!(!urls[1].primary);
        assert_eq!(
            urls[1].url,
            "https://cos.ap-beijing.myqcloud.com/logs-100001"
        );
    }

    #[test]
    fn test_zoned_access_urls_fall_back_to_region() {
        let urls = CosEndpoint::new("ap-shanghai")
            .with_zone("ap-shanghai-fsi")
            .access_urls("logs-100001");
        assert_eq!(
            urls[0].url,
            "https://logs-100001.cos.ap-shanghai-fsi.myqcloud.com"
        );
        assert_eq!(
            urls[1].url,
            "https://cos.ap-shanghai.myqcloud.com/logs-100001"
        );
    }

    #[test]
    fn test_parse_bucket_host_round_trip() {
        let ep = CosEndpoint::new("ap-guangzhou");
        for (name, app_id) in [("logs", "100001"), ("my-data-2", "1250000000")] {
            let host = ep.bucket_host(&full_bucket_name(name, app_id));
            assert_eq!(
                CosEndpoint::parse_bucket_host(&host),
                Some((name.to_string(), app_id.to_string()))
            );
        }
        assert_eq!(CosEndpoint::parse_bucket_host("example.com"), None);
        assert_eq!(
            CosEndpoint::parse_bucket_host("nodigits-abc.cos.ap-beijing.myqcloud.com"),
            None
        );
    }
}
