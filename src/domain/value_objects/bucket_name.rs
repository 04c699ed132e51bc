use crate::domain::errors::ValidationError;

/// A validated short bucket name, without the `-{appId}` suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    const MAX_LEN: usize = 50;

    /// Create a new BucketName with COS naming rules
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyBucketName);
        }

        if value.len() > Self::MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: Self::MAX_LEN,
            });
        }

        if !value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if !value
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(ValidationError::BucketNameInvalidCharacter(c));
            }
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("logs").is_ok());
        assert!(BucketName::new("my-bucket").is_ok());
        assert!(BucketName::new("123bucket").is_ok());
        assert!(BucketName::new("a").is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert_eq!(BucketName::new(""), Err(ValidationError::EmptyBucketName));
        assert!(BucketName::new("a".repeat(51)).is_err());
        assert_eq!(
            BucketName::new("-bucket"),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new("bucket-"),
            Err(ValidationError::BucketNameInvalidEnd)
        );
        assert_eq!(
            BucketName::new("my_bucket"),
            Err(ValidationError::BucketNameInvalidCharacter('_'))
        );
        assert!(BucketName::new("Bucket").is_err());
        assert!(BucketName::new("my.bucket").is_err());
    }
}
