mod common;

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use qcloud_bucket_adapter::{
    adapters::outbound::qcloud::{acl::ALL_USERS_URI, CosEndpoint},
    domain::models::{CopyObjectOptions, ObjectRange, PutObjectOptions},
    BucketAcl, CloudBucket, CloudError, ListFilter, ObjectKey, RequestBody, RequestContext,
};

use common::{acl_xml, client, logs_bucket, MockTransport, ScriptedResponse, APP_ID, LOGS_HOST};

const EMPTY_CDN_PAGE: &str = r#"{"Response":{"Domains":[],"TotalNumber":0,"RequestId":"req-cdn"}}"#;

const OWNER: &str = "qcs::cam::uin/100000000001:uin/100000000001";

#[tokio::test]
async fn own_bucket_identity_and_hosts() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    assert_eq!(bucket.global_id(), "logs");
    assert_eq!(bucket.name(), "logs");
    assert_eq!(bucket.full_name(), "logs-100001");
    assert_eq!(bucket.region(), "ap-beijing");
    assert_eq!(bucket.endpoint().bucket_host(&bucket.full_name()), LOGS_HOST);

    let urls = bucket.access_urls();
    assert_eq!(urls[0].url, format!("https://{}", LOGS_HOST));

    // host prefix parses back to name and app id
    assert_eq!(
        CosEndpoint::parse_bucket_host(LOGS_HOST),
        Some(("logs".to_string(), APP_ID.to_string()))
    );
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn zoned_bucket_uses_zone_hosts() {
    let transport = MockTransport::new();
    transport
        .push(ScriptedResponse::ok())
        .push(ScriptedResponse::json(EMPTY_CDN_PAGE))
        .push(ScriptedResponse::json(EMPTY_CDN_PAGE));
    let client = client(&transport);
    let bucket = client
        .zoned_bucket("logs", Some(APP_ID), Some("ap-shanghai"), Some("ap-shanghai-fsi"))
        .unwrap();
    assert_eq!(bucket.zone(), Some("ap-shanghai-fsi"));
    assert_eq!(bucket.region(), "ap-shanghai");

    let urls = bucket.access_urls();
    assert_eq!(
        urls[0].url,
        "https://logs-100001.cos.ap-shanghai-fsi.myqcloud.com"
    );
    assert_eq!(urls[1].url, "https://cos.ap-shanghai.myqcloud.com/logs-100001");

    bucket
        .delete_object(&RequestContext::new(), &ObjectKey::new("a.txt").unwrap())
        .await
        .unwrap();
    assert_eq!(
        transport.request(0).host(),
        "logs-100001.cos.ap-shanghai-fsi.myqcloud.com"
    );

    assert!(bucket.get_cdn_domains().await.unwrap().is_empty());
    assert_eq!(
        transport.request(1).body_json()["Filters"][0]["Value"][0],
        "logs-100001.cos.ap-shanghai-fsi.myqcloud.com"
    );
    assert_eq!(
        transport.request(2).body_json()["Filters"][0]["Value"][0],
        "logs-100001.cos-website.ap-shanghai-fsi.myqcloud.com"
    );
}

#[tokio::test]
async fn foreign_bucket_uses_full_name_as_global_id() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let foreign = client.bucket("shared", Some("100002"), None).unwrap();
    assert_eq!(foreign.global_id(), "shared-100002");
    assert_eq!(foreign.region(), "ap-beijing");

    // the suffix in a full name is honoured
    let parsed = client.bucket("shared-100002", None, None).unwrap();
    assert_eq!(parsed.app_id(), "100002");
    assert_eq!(parsed.global_id(), "shared-100002");

    assert!(matches!(
        client.bucket("Bad_Name", None, None),
        Err(CloudError::InvalidInput { .. })
    ));
}

#[tokio::test]
async fn set_acl_then_get_acl() {
    let transport = MockTransport::new();
    transport
        .push(ScriptedResponse::ok())
        .push(ScriptedResponse::xml(&acl_xml(&[
            (OWNER, "FULL_CONTROL"),
            (ALL_USERS_URI, "READ"),
        ])));
    let client = client(&transport);
    let bucket = logs_bucket(&client);
    let ctx = RequestContext::new();

    bucket.set_acl(&ctx, BucketAcl::PublicRead).await.unwrap();
    let acl = bucket.get_acl(&ctx).await.unwrap();
    assert_eq!(acl, BucketAcl::PublicRead);

    let put = transport.request(0);
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.host(), LOGS_HOST);
    assert!(put.has_query("acl"));
    assert_eq!(put.header("x-cos-acl"), Some("public-read"));
    assert!(put.header("authorization").unwrap().starts_with("q-sign-algorithm=sha1"));

    let get = transport.request(1);
    assert_eq!(get.method, Method::GET);
    assert!(get.has_query("acl"));
}

#[tokio::test]
async fn set_unknown_acl_is_rejected_locally() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let err = bucket
        .set_acl(&RequestContext::new(), BucketAcl::Unknown)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::InvalidInput { .. }));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn list_objects_with_delimiter() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::xml(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
    <Name>logs-100001</Name>
    <Prefix>a/</Prefix>
    <MaxKeys>1000</MaxKeys>
    <Delimiter>/</Delimiter>
    <IsTruncated>true</IsTruncated>
    <NextMarker>a/c.txt</NextMarker>
    <CommonPrefixes><Prefix>a/sub/</Prefix></CommonPrefixes>
    <Contents>
        <Key>a/b.txt</Key>
        <LastModified>2019-05-24T10:56:40.000Z</LastModified>
        <ETag>"abc"</ETag>
        <Size>42</Size>
        <StorageClass>STANDARD</StorageClass>
    </Contents>
    <Contents>
        <Key>a/c.txt</Key>
        <LastModified>2019-05-24T10:57:40.000Z</LastModified>
        <ETag>"def"</ETag>
        <Size>7</Size>
        <StorageClass>STANDARD_IA</StorageClass>
    </Contents>
</ListBucketResult>"#,
    ));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let filter = ListFilter::new()
        .with_prefix("a/")
        .with_delimiter("/")
        .with_max_count(1000);
    let result = bucket
        .list_objects(&RequestContext::new(), &filter)
        .await
        .unwrap();

    assert_eq!(result.objects.len(), 2);
    assert!(result.objects.iter().all(|o| o.key.starts_with("a/")));
    assert_eq!(result.objects[0].size_bytes, 42);
    assert!(result.objects[0].last_modified.is_some());
    assert_eq!(result.objects[1].storage_class, "STANDARD_IA");
    assert_eq!(result.common_prefixes.len(), 1);
    assert_eq!(result.common_prefixes[0].key, "a/sub/");
    assert!(result.is_truncated);
    assert_eq!(result.next_marker.as_deref(), Some("a/c.txt"));

    let request = transport.request(0);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path(), "/");
    assert_eq!(request.query_value("prefix").as_deref(), Some("a/"));
    assert_eq!(request.query_value("delimiter").as_deref(), Some("/"));
    assert_eq!(request.query_value("max-keys").as_deref(), Some("1000"));
    assert!(!request.has_query("marker"));
}

#[tokio::test]
async fn temp_url_methods() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let bucket = logs_bucket(&client);
    let key = ObjectKey::new("k").unwrap();

    let err = bucket
        .get_temp_url("PATCH", &key, Duration::from_secs(300))
        .unwrap_err();
    assert!(matches!(err, CloudError::Unsupported { .. }));

    let url = bucket
        .get_temp_url("GET", &key, Duration::from_secs(300))
        .unwrap();
    assert!(url.starts_with(&format!("https://{}/k?", LOGS_HOST)));
    assert!(url.contains("q-sign-algorithm=sha1"));
    assert!(url.contains("q-signature="));

    assert!(bucket
        .get_temp_url("DELETE", &key, Duration::from_secs(300))
        .is_ok());
    // method names are case-sensitive
    for method in ["get", "put", "delete"] {
        let err = bucket
            .get_temp_url(method, &key, Duration::from_secs(300))
            .unwrap_err();
        assert!(matches!(err, CloudError::Unsupported { .. }));
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn put_object_classifies_metadata() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let mut metadata = HeaderMap::new();
    metadata.insert("content-type", HeaderValue::from_static("text/plain"));
    metadata.insert("cache-control", HeaderValue::from_static("no-cache"));
    metadata.insert("x-project", HeaderValue::from_static("demo"));
    metadata.insert("x-empty", HeaderValue::from_static(""));
    let options = PutObjectOptions::builder()
        .acl(BucketAcl::PublicRead)
        .storage_class("STANDARD_IA")
        .metadata(metadata)
        .build();

    let key = ObjectKey::new("docs/readme.txt").unwrap();
    bucket
        .put_object(
            &RequestContext::new(),
            &key,
            RequestBody::from(Bytes::from_static(b"hello")),
            5,
            options,
        )
        .await
        .unwrap();

    // an explicit ACL skips the lookup
    assert_eq!(transport.request_count(), 1);
    let put = transport.request(0);
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.path(), "/docs/readme.txt");
    assert_eq!(put.header("content-type"), Some("text/plain"));
    assert_eq!(put.header("cache-control"), Some("no-cache"));
    assert_eq!(put.header("x-cos-meta-x-project"), Some("demo"));
    assert_eq!(put.headers.get_all("x-cos-meta-x-project").iter().count(), 1);
    assert!(put.header("x-project").is_none());
    assert!(put.header("x-cos-meta-x-empty").is_none());
    assert_eq!(put.header("x-cos-acl"), Some("public-read"));
    assert_eq!(put.header("x-cos-storage-class"), Some("STANDARD_IA"));
    assert_eq!(put.header("content-length"), Some("5"));
    assert_eq!(put.body, Bytes::from_static(b"hello"));
}

#[tokio::test]
async fn put_object_inherits_bucket_acl() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::xml(&acl_xml(&[
        (OWNER, "FULL_CONTROL"),
        (ALL_USERS_URI, "READ"),
    ])));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    bucket
        .put_object(
            &RequestContext::new(),
            &ObjectKey::new("a.txt").unwrap(),
            RequestBody::from(b"abc".to_vec()),
            3,
            PutObjectOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
    assert!(transport.request(0).has_query("acl"));
    assert_eq!(transport.request(1).header("x-cos-acl"), Some("public-read"));
}

#[tokio::test]
async fn put_object_falls_back_to_private_acl() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::error(403, "AccessDenied"));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    bucket
        .put_object(
            &RequestContext::new(),
            &ObjectKey::new("a.txt").unwrap(),
            RequestBody::from(b"abc".to_vec()),
            3,
            PutObjectOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(transport.request(1).header("x-cos-acl"), Some("private"));
}

#[tokio::test]
async fn get_object_ranged() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::status(206, "0123456789"));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let body = bucket
        .get_object(
            &RequestContext::new(),
            &ObjectKey::new("a b.txt").unwrap(),
            Some(ObjectRange::new(0, 9)),
        )
        .await
        .unwrap();
    assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"0123456789"));

    let request = transport.request(0);
    assert_eq!(request.path(), "/a%20b.txt");
    assert_eq!(request.header("range"), Some("bytes=0-9"));
}

#[tokio::test]
async fn get_object_meta_decodes_headers() {
    let transport = MockTransport::new();
    transport.push(
        ScriptedResponse::ok()
            .with_header("content-length", "42")
            .with_header("etag", "\"abc\"")
            .with_header("content-type", "text/plain")
            .with_header("last-modified", "Fri, 24 May 2019 10:56:40 GMT")
            .with_header("x-cos-meta-project", "demo"),
    );
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let meta = bucket
        .get_object_meta(&RequestContext::new(), &ObjectKey::new("a.txt").unwrap())
        .await
        .unwrap();
    assert_eq!(meta.size_bytes, 42);
    assert_eq!(meta.etag, "\"abc\"");
    assert_eq!(meta.storage_class, "STANDARD");
    assert!(meta.last_modified.is_some());
    assert_eq!(meta.metadata.get("content-type").unwrap(), "text/plain");
    assert_eq!(meta.metadata.get("project").unwrap(), "demo");
    assert_eq!(transport.request(0).method, Method::HEAD);
}

#[tokio::test]
async fn copy_object_sets_source_and_directive() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::xml(
        "<CopyObjectResult><ETag>\"abc\"</ETag><LastModified>2019-05-24T10:56:40Z</LastModified></CopyObjectResult>",
    ));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    bucket
        .copy_object(
            &RequestContext::new(),
            &ObjectKey::new("dest.txt").unwrap(),
            "archive",
            &ObjectKey::new("src/a.txt").unwrap(),
            CopyObjectOptions::builder().acl(BucketAcl::Private).build(),
        )
        .await
        .unwrap();

    let request = transport.request(0);
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path(), "/dest.txt");
    assert_eq!(
        request.header("x-cos-copy-source"),
        Some("archive-100001.cos.ap-beijing.myqcloud.com/src/a.txt")
    );
    assert_eq!(request.header("x-cos-metadata-directive"), Some("Copy"));
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::error(404, "NoSuchKey"));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let err = bucket
        .delete_object(&RequestContext::new(), &ObjectKey::new("gone").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.operation(), "delete_object");
}

#[tokio::test]
async fn rejected_acl_is_precondition_failed() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::error(400, "InvalidArgument"));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let err = bucket
        .set_acl(&RequestContext::new(), BucketAcl::PublicRead)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::PreconditionFailed { .. }));
}

#[tokio::test]
async fn slow_down_surfaces_as_transport_error() {
    let transport = MockTransport::new();
    transport.push(ScriptedResponse::error(503, "SlowDown"));
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let err = bucket
        .list_objects(&RequestContext::new(), &ListFilter::new())
        .await
        .unwrap_err();
    match err {
        CloudError::Transport { status, .. } => assert_eq!(status, Some(503)),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn cancelled_context_sends_nothing() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let ctx = RequestContext::new();
    ctx.cancel();
    let err = bucket
        .list_objects(&ctx, &ListFilter::new())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_aborts_in_flight_request() {
    let transport = MockTransport::hanging();
    let client = client(&transport);
    let bucket = logs_bucket(&client);

    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
    let err = bucket
        .get_object(&ctx, &ObjectKey::new("slow").unwrap(), None)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn list_buckets_and_exists() {
    let transport = MockTransport::new();
    transport
        .push(ScriptedResponse::xml(
            r#"<ListAllMyBucketsResult>
    <Owner><ID>qcs::cam::uin/100000000001:uin/100000000001</ID><DisplayName>100000000001</DisplayName></Owner>
    <Buckets>
        <Bucket><Name>logs-100001</Name><Location>ap-beijing</Location><CreationDate>2019-05-24T10:56:40Z</CreationDate></Bucket>
        <Bucket><Name>media-100001</Name><Location>ap-guangzhou</Location><CreationDate>2020-01-01T00:00:00Z</CreationDate></Bucket>
    </Buckets>
</ListAllMyBucketsResult>"#,
        ))
        .push(ScriptedResponse::ok())
        .push(ScriptedResponse::error(404, "NoSuchBucket"));
    let client = client(&transport);
    let ctx = RequestContext::new();

    let buckets = client.buckets(&ctx).await.unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].name(), "logs");
    assert_eq!(buckets[0].app_id(), APP_ID);
    assert_eq!(buckets[1].location(), "ap-guangzhou");
    assert!(buckets[1].created_at().is_some());
    assert_eq!(transport.request(0).host(), "service.cos.myqcloud.com");

    assert!(client.bucket_exists(&ctx, "logs", None).await.unwrap());
    assert!(!client.bucket_exists(&ctx, "missing", None).await.unwrap());
    let head = transport.request(2);
    assert_eq!(head.method, Method::HEAD);
    assert_eq!(head.host(), "missing-100001.cos.ap-beijing.myqcloud.com");
}
