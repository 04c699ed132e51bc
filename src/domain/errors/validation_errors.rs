/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectKeyCharacter(char),

    // BucketName validation errors
    EmptyBucketName,
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),

    // AppId validation errors
    EmptyAppId,
    InvalidAppIdCharacter(char),

    // Multipart validation errors
    InvalidPartNumber(u32),
    PartOutOfOrder {
        position: usize,
        part_number: u32,
    },
    NoParts,

    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectKey errors
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Invalid character in object key: {:?}", c)
            }

            // BucketName errors
            ValidationError::EmptyBucketName => write!(f, "Bucket name cannot be empty"),
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, and hyphens allowed",
                    c
                )
            }

            // AppId errors
            ValidationError::EmptyAppId => write!(f, "AppId cannot be empty"),
            ValidationError::InvalidAppIdCharacter(c) => {
                write!(f, "Invalid character in AppId: '{}'. Only digits allowed", c)
            }

            // Multipart errors
            ValidationError::InvalidPartNumber(n) => {
                write!(f, "Invalid part number {} (expected 1..=10000)", n)
            }
            ValidationError::PartOutOfOrder {
                position,
                part_number,
            } => {
                write!(
                    f,
                    "Part at position {} has number {} (expected {})",
                    position,
                    part_number,
                    position + 1
                )
            }
            ValidationError::NoParts => {
                write!(f, "At least one part is required to complete an upload")
            }

            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
