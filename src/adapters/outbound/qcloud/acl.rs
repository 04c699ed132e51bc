use http::HeaderValue;

use super::wire::AccessControlPolicy;
use crate::domain::{
    errors::CloudError,
    models::{BucketAcl, Grant, Permission},
};

pub const ALL_USERS_URI: &str = "http://cam.qcloud.com/groups/global/AllUsers";
pub const AUTH_USERS_URI: &str = "http://cam.qcloud.com/groups/global/AuthenticatedUsers";

pub const ACL_HEADER: &str = "x-cos-acl";

/// Collapse a grant list into the canned ACL it represents
pub fn acl_from_grants(grants: &[Grant]) -> BucketAcl {
    let has = |uri: &str, permission: Permission| {
        grants
            .iter()
            .any(|g| g.grantee_uri == uri && g.permission == permission)
    };
    match grants.len() {
        1 if grants[0].grantee_uri.is_empty()
            && grants[0].permission == Permission::FullControl =>
        {
            BucketAcl::Private
        }
        2 if has(AUTH_USERS_URI, Permission::Read) => BucketAcl::AuthenticatedRead,
        2 if has(ALL_USERS_URI, Permission::Read) => BucketAcl::PublicRead,
        3 if has(ALL_USERS_URI, Permission::Write) => BucketAcl::PublicReadWrite,
        _ => BucketAcl::Unknown,
    }
}

pub(crate) fn grants_from_wire(policy: AccessControlPolicy) -> Vec<Grant> {
    policy
        .access_control_list
        .grant
        .into_iter()
        .map(|g| Grant {
            grantee_uri: g.grantee.uri,
            grantee_id: g.grantee.id,
            permission: Permission::parse(&g.permission),
        })
        .collect()
}

/// Header value for an ACL; `unknown` is never sent
pub fn acl_header_value(operation: &str, acl: BucketAcl) -> Result<HeaderValue, CloudError> {
    if acl == BucketAcl::Unknown {
        return Err(CloudError::invalid_input(
            operation,
            "the unknown ACL cannot be applied",
        ));
    }
    Ok(HeaderValue::from_static(acl.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // grants COS stores for each canned ACL
    fn grants_for(acl: BucketAcl, owner_id: &str) -> Vec<Grant> {
        let owner = Grant::owner(owner_id);
        match acl {
            BucketAcl::Private => vec![owner],
            BucketAcl::AuthenticatedRead => vec![owner, Grant::new(AUTH_USERS_URI, Permission::Read)],
            BucketAcl::PublicRead => vec![owner, Grant::new(ALL_USERS_URI, Permission::Read)],
            BucketAcl::PublicReadWrite => vec![
                owner,
                Grant::new(ALL_USERS_URI, Permission::Read),
                Grant::new(ALL_USERS_URI, Permission::Write),
            ],
            BucketAcl::Unknown => Vec::new(),
        }
    }

    #[test]
    fn test_private() {
        assert_eq!(
            acl_from_grants(&[Grant::owner("qcs::cam::uin/1:uin/1")]),
            BucketAcl::Private
        );
    }

    #[test]
    fn test_public_read_in_any_order() {
        let grants = vec![
            Grant::new(ALL_USERS_URI, Permission::Read),
            Grant::owner("owner"),
        ];
        assert_eq!(acl_from_grants(&grants), BucketAcl::PublicRead);
    }

    #[test]
    fn test_unrecognized_shapes_are_unknown() {
        assert_eq!(acl_from_grants(&[]), BucketAcl::Unknown);
        assert_eq!(
            acl_from_grants(&[Grant::new(ALL_USERS_URI, Permission::Read)]),
            BucketAcl::Unknown
        );
        let grants = vec![
            Grant::owner("owner"),
            Grant::new(ALL_USERS_URI, Permission::Write),
        ];
        assert_eq!(acl_from_grants(&grants), BucketAcl::Unknown);
    }

    #[test]
    fn test_canned_values_round_trip() {
        for acl in BucketAcl::canned() {
            let parsed = acl_from_grants(&grants_for(acl, "owner"));
            assert!(parsed == acl || parsed == BucketAcl::Unknown);
            assert_eq!(parsed, acl);
        }
    }

    #[test]
    fn test_unknown_is_not_sent() {
        assert!(acl_header_value("set_acl", BucketAcl::Unknown).is_err());
        assert_eq!(
            acl_header_value("set_acl", BucketAcl::PublicRead).unwrap(),
            "public-read"
        );
    }
}
