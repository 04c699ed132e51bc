use crate::domain::errors::CloudError;
use crate::ports::transport::{SignError, TransportError};
use http::StatusCode;
use std::io;
use thiserror::Error as ThisError;

/// Wire-level failure talking to COS or the cloud API
#[derive(ThisError, Debug)]
pub enum QcloudError {
    #[error("Service error: {status} {code} - {message} (request id: {request_id})")]
    Service {
        status: StatusCode,
        code: String,
        message: String,
        request_id: String,
    },

    #[error("API error: {code} - {message} (request id: {request_id})")]
    Api {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("Request signing error: {0}")]
    Signing(#[from] SignError),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<quick_xml::DeError> for QcloudError {
    fn from(err: quick_xml::DeError) -> Self {
        QcloudError::Xml(err.to_string())
    }
}

impl QcloudError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            QcloudError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider error code, e.g. `NoSuchKey`
    pub fn code(&self) -> Option<&str> {
        match self {
            QcloudError::Service { code, .. } | QcloudError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            QcloudError::Service { status, code, .. } => {
                *status == StatusCode::NOT_FOUND || code.starts_with("NoSuch")
            }
            QcloudError::Api { code, .. } => code.starts_with("ResourceNotFound"),
            _ => false,
        }
    }

    fn is_precondition(&self) -> bool {
        match self {
            QcloudError::Service { status, code, .. } => {
                *status == StatusCode::PRECONDITION_FAILED
                    || (*status == StatusCode::BAD_REQUEST
                        && (code.starts_with("Malformed")
                            || code == "InvalidArgument"
                            || code == "InvalidPolicyDocument"))
            }
            _ => false,
        }
    }

    /// Classify into the domain error taxonomy, tagging the failed operation
    /// and the bucket or key it ran against
    pub fn into_cloud(self, operation: &str, resource: &str) -> CloudError {
        let operation = operation.to_string();
        let resource = resource.to_string();
        if matches!(self, QcloudError::Cancelled) {
            return CloudError::Cancelled {
                operation,
                resource,
            };
        }
        if self.is_not_found() {
            return CloudError::NotFound {
                operation,
                resource,
                message: self.to_string(),
            };
        }
        if self.is_precondition() {
            return CloudError::PreconditionFailed {
                operation,
                resource,
                message: self.to_string(),
            };
        }
        CloudError::Transport {
            operation,
            resource,
            status: self.status().map(|s| s.as_u16()),
            message: self.to_string(),
        }
    }
}

pub type QcloudResult<T> = Result<T, QcloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn service(status: u16, code: &str) -> QcloudError {
        QcloudError::Service {
            status: StatusCode::from_u16(status).unwrap(),
            code: code.to_string(),
            message: "message".to_string(),
            request_id: "req-1".to_string(),
        }
    }

    #[test]
    fn test_not_found_classification() {
        let err = service(404, "NoSuchKey").into_cloud("get_object", "logs/a.txt");
        assert!(err.is_not_found());
        assert_eq!(err.operation(), "get_object");

        // A NoSuch* code wins even when the status is unusual
        assert!(service(409, "NoSuchUpload").into_cloud("op", "r").is_not_found());
    }

    #[test]
    fn test_precondition_classification() {
        for (status, code) in [
            (412, "PreconditionFailed"),
            (400, "MalformedXML"),
            (400, "InvalidArgument"),
            (400, "InvalidPolicyDocument"),
        ] {
            let err = service(status, code).into_cloud("set_acl", "logs");
            assert!(
                matches!(err, CloudError::PreconditionFailed { .. }),
                "{} {}",
                status,
                code
            );
        }
    }

    #[test]
    fn test_other_errors_are_transport() {
        match service(503, "SlowDown").into_cloud("put_object", "k") {
            CloudError::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(QcloudError::Cancelled.into_cloud("op", "r").is_cancelled());
        assert!(matches!(
            QcloudError::Xml("bad".to_string()).into_cloud("op", "r"),
            CloudError::Transport { status: None, .. }
        ));
    }
}
