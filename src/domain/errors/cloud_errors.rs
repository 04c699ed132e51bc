/// Errors surfaced by bucket operations.
///
/// Every variant names the operation that failed and, where one applies, the
/// bucket or key it failed on. Messages never carry credentials or signed URLs.
#[derive(Debug, Clone, PartialEq)]
pub enum CloudError {
    /// The wire reported 404 or a `NoSuch*` code for the operation's resource
    NotFound {
        operation: String,
        resource: String,
        message: String,
    },

    /// The adapter refuses the requested capability
    Unsupported { operation: String, reason: String },

    /// The wire rejected ACL or policy input as malformed
    PreconditionFailed {
        operation: String,
        resource: String,
        message: String,
    },

    /// Network, DNS, TLS or unclassified non-2xx failure
    Transport {
        operation: String,
        resource: String,
        status: Option<u16>,
        message: String,
    },

    /// The caller's context was cancelled or its deadline passed
    Cancelled { operation: String, resource: String },

    /// Input rejected before anything was sent
    InvalidInput { operation: String, reason: String },
}

impl CloudError {
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CloudError::Unsupported {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        CloudError::InvalidInput {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CloudError::Cancelled { .. })
    }

    /// Name of the operation that produced this error
    pub fn operation(&self) -> &str {
        match self {
            CloudError::NotFound { operation, .. }
            | CloudError::Unsupported { operation, .. }
            | CloudError::PreconditionFailed { operation, .. }
            | CloudError::Transport { operation, .. }
            | CloudError::Cancelled { operation, .. }
            | CloudError::InvalidInput { operation, .. } => operation,
        }
    }
}

impl std::fmt::Display for CloudError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudError::NotFound {
                operation,
                resource,
                message,
            } => {
                write!(f, "{}: resource not found: {} ({})", operation, resource, message)
            }
            CloudError::Unsupported { operation, reason } => {
                write!(f, "{}: not supported: {}", operation, reason)
            }
            CloudError::PreconditionFailed {
                operation,
                resource,
                message,
            } => {
                write!(
                    f,
                    "{}: precondition failed on {}: {}",
                    operation, resource, message
                )
            }
            CloudError::Transport {
                operation,
                resource,
                status,
                message,
            } => match status {
                Some(status) => write!(
                    f,
                    "{}: transport error on {} (HTTP {}): {}",
                    operation, resource, status, message
                ),
                None => write!(f, "{}: transport error on {}: {}", operation, resource, message),
            },
            CloudError::Cancelled {
                operation,
                resource,
            } => {
                write!(f, "{}: cancelled while operating on {}", operation, resource)
            }
            CloudError::InvalidInput { operation, reason } => {
                write!(f, "{}: invalid input: {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for CloudError {}

/// Result type for bucket operations
pub type CloudResult<T> = Result<T, CloudError>;
