use std::sync::Arc;
use std::time::Duration;

use crate::{
    adapters::outbound::{
        qcloud::{QcloudClient, QcloudConfig, DEFAULT_ACL_LOOKUP_TIMEOUT},
        transport::ReqwestTransport,
    },
    domain::value_objects::AppId,
    ports::{HttpTransport, IdentityDirectory},
};

pub const DEFAULT_REGION: &str = "ap-guangzhou";

/// Configuration for the application
#[derive(Clone)]
pub struct AppConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub app_id: String,
    pub region: String,
    pub scheme: String,
    pub acl_lookup_timeout: Duration,
    /// Whole-request timeout applied by the default transport
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret_id", &self.secret_id)
            .field("app_id", &self.app_id)
            .field("region", &self.region)
            .field("scheme", &self.scheme)
            .field("acl_lookup_timeout", &self.acl_lookup_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            app_id: app_id.into(),
            region: DEFAULT_REGION.to_string(),
            scheme: "https".to_string(),
            acl_lookup_timeout: DEFAULT_ACL_LOOKUP_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Load `.env` if present, then read the `QCLOUD_*` variables
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", name),
            })
        };

        let app_id = required("QCLOUD_APP_ID")?;
        AppId::new(app_id.as_str()).map_err(|e| AppError::Configuration {
            message: format!("QCLOUD_APP_ID: {}", e),
        })?;

        let mut config = Self::new(
            required("QCLOUD_SECRET_ID")?,
            required("QCLOUD_SECRET_KEY")?,
            app_id,
        );
        if let Some(region) = get("QCLOUD_REGION") {
            config.region = region;
        }
        if let Some(scheme) = get("QCLOUD_COS_SCHEME") {
            match scheme.as_str() {
                "http" | "https" => config.scheme = scheme,
                other => {
                    return Err(AppError::Configuration {
                        message: format!("QCLOUD_COS_SCHEME must be http or https, got {}", other),
                    })
                }
            }
        }
        if let Some(secs) = get("QCLOUD_ACL_LOOKUP_TIMEOUT_SECS") {
            config.acl_lookup_timeout = Duration::from_secs(parse_secs(
                "QCLOUD_ACL_LOOKUP_TIMEOUT_SECS",
                &secs,
            )?);
        }
        if let Some(secs) = get("QCLOUD_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Some(Duration::from_secs(parse_secs(
                "QCLOUD_REQUEST_TIMEOUT_SECS",
                &secs,
            )?));
        }
        Ok(config)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, AppError> {
    value.trim().parse().map_err(|_| AppError::Configuration {
        message: format!("{} must be a whole number of seconds, got {}", name, value),
    })
}

/// Application builder for dependency injection
#[derive(Default)]
pub struct AppBuilder {
    config: Option<AppConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    identity: Option<Arc<dyn IdentityDirectory>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default reqwest transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_identity_directory(mut self, directory: Arc<dyn IdentityDirectory>) -> Self {
        self.identity = Some(directory);
        self
    }

    /// Build the shared client every bucket facade hangs off
    pub fn build(self) -> Result<Arc<QcloudClient>, AppError> {
        let config = self.config.ok_or_else(|| AppError::Configuration {
            message: "no configuration supplied".to_string(),
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.request_timeout).map_err(|e| {
                AppError::TransportInit {
                    message: e.to_string(),
                }
            })?),
        };

        let qcloud_config = QcloudConfig::new(config.app_id.as_str(), config.region.as_str())
            .with_scheme(config.scheme.as_str())
            .with_acl_lookup_timeout(config.acl_lookup_timeout);
        let mut client = QcloudClient::new(
            qcloud_config,
            config.secret_id,
            config.secret_key,
            transport,
        );
        if let Some(identity) = self.identity {
            client = client.with_identity_directory(identity);
        }
        Ok(Arc::new(client))
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Transport initialization error: {message}")]
    TransportInit { message: String },
}

/// Create a client from environment variables
pub fn create_client_from_env() -> Result<Arc<QcloudClient>, AppError> {
    AppBuilder::new().with_config(AppConfig::from_env()?).build()
}
