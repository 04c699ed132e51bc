use http::HeaderMap;

use super::acl::BucketAcl;

/// Options for uploading an object.
///
/// A missing `acl` means "reuse the bucket's current ACL".
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct PutObjectOptions {
    pub acl: Option<BucketAcl>,
    #[builder(into)]
    pub storage_class: Option<String>,
    #[builder(default)]
    pub metadata: HeaderMap,
}

/// Options for a server-side copy.
///
/// Supplying any metadata replaces the source object's metadata; otherwise
/// it is carried over.
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct CopyObjectOptions {
    pub acl: Option<BucketAcl>,
    #[builder(into)]
    pub storage_class: Option<String>,
    #[builder(default)]
    pub metadata: HeaderMap,
}

/// Options for initiating a multipart upload
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct MultipartOptions {
    pub acl: Option<BucketAcl>,
    #[builder(into)]
    pub storage_class: Option<String>,
    #[builder(default)]
    pub metadata: HeaderMap,
}

impl From<MultipartOptions> for PutObjectOptions {
    fn from(value: MultipartOptions) -> Self {
        PutObjectOptions {
            acl: value.acl,
            storage_class: value.storage_class,
            metadata: value.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let opts = PutObjectOptions::builder()
            .acl(BucketAcl::PublicRead)
            .storage_class("STANDARD_IA")
            .build();
        assert_eq!(opts.acl, Some(BucketAcl::PublicRead));
        assert_eq!(opts.storage_class.as_deref(), Some("STANDARD_IA"));
        assert!(opts.metadata.is_empty());

        let copy = CopyObjectOptions::builder().build();
        assert!(copy.acl.is_none());
        assert!(copy.storage_class.is_none());
    }
}
