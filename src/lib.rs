pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

// Re-export key types for convenience

// Domain types - core models and value objects
pub use domain::{
    AppId,
    // Models
    BucketAcl,
    // Value objects
    BucketName,
    CdnDomain,
    // Errors
    CloudError,
    CloudResult,
    CorsRule,
    ListFilter,
    ObjectKey,
    ObjectMeta,
    ObjectRange,
    PolicyStatement,
    PolicyStatementInput,
    RefererConfig,
    ValidationError,
    WebsiteConfig,
};

// Port types - interfaces for external systems
pub use ports::{
    CloudBucket, HttpTransport, Identity, IdentityDirectory, RequestBody, RequestContext,
    ResponseBody, Signer,
};

// Application factory and configuration
pub use app::{create_client_from_env, AppBuilder, AppConfig, AppError};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    identity::StaticIdentityDirectory,
    qcloud::{QcloudBucket, QcloudClient, QcloudConfig, QcloudError},
    transport::ReqwestTransport,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_client_from_env, AppBuilder, AppConfig, BucketAcl, BucketName, CloudBucket,
        CloudError, ListFilter, ObjectKey, QcloudBucket, QcloudClient, RequestBody,
        RequestContext, ReqwestTransport,
    };
}
