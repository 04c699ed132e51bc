use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{errors::ValidationError, value_objects::ObjectKey};

/// Largest part number the provider accepts
pub const MAX_PART_NUMBER: u32 = 10_000;

/// Completed part information for multipart uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    pub part_number: u32,
    pub etag: String,
}

impl CompletedPart {
    /// Parts for `etags[i]` numbered `i + 1`
    pub fn from_etags(etags: &[String]) -> Vec<CompletedPart> {
        etags
            .iter()
            .enumerate()
            .map(|(i, etag)| CompletedPart {
                part_number: i as u32 + 1,
                etag: etag.clone(),
            })
            .collect()
    }

    /// Checks that `parts` is non-empty and numbered exactly `1..=n` in order
    pub fn validate_sequence(parts: &[CompletedPart]) -> Result<(), ValidationError> {
        if parts.is_empty() {
            return Err(ValidationError::NoParts);
        }
        for (position, part) in parts.iter().enumerate() {
            if part.part_number == 0 || part.part_number > MAX_PART_NUMBER {
                return Err(ValidationError::InvalidPartNumber(part.part_number));
            }
            if part.part_number as usize != position + 1 {
                return Err(ValidationError::PartOutOfOrder {
                    position,
                    part_number: part.part_number,
                });
            }
        }
        Ok(())
    }
}

/// An in-flight upload as reported by the provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultipartUpload {
    pub object_name: String,
    pub upload_id: String,
    pub initiator: String,
    pub initiated: Option<DateTime<Utc>>,
    pub storage_class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Initiated,
    PartsReceived,
    Completed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Aborted)
    }
}

/// Client-side record of a multipart upload.
///
/// The upload itself lives on the server; this only tracks the upload id and
/// the ETags the caller has collected so far.
#[derive(Debug, Clone)]
pub struct MultipartSession {
    bucket: String,
    key: ObjectKey,
    upload_id: String,
    parts: BTreeMap<u32, String>,
    state: SessionState,
}

impl MultipartSession {
    pub fn new(bucket: impl Into<String>, key: ObjectKey, upload_id: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key,
            upload_id: upload_id.into(),
            parts: BTreeMap::new(),
            state: SessionState::Initiated,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Record the ETag of an uploaded part; re-recording a number replaces it
    pub fn record_part(
        &mut self,
        part_number: u32,
        etag: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.ensure_open("record a part")?;
        if part_number == 0 || part_number > MAX_PART_NUMBER {
            return Err(ValidationError::InvalidPartNumber(part_number));
        }
        self.parts.insert(part_number, etag.into());
        self.state = SessionState::PartsReceived;
        Ok(())
    }

    /// Parts in ascending order, ready for completion
    pub fn completed_parts(&self) -> Vec<CompletedPart> {
        self.parts
            .iter()
            .map(|(part_number, etag)| CompletedPart {
                part_number: *part_number,
                etag: etag.clone(),
            })
            .collect()
    }

    pub fn mark_completed(&mut self) -> Result<(), ValidationError> {
        self.ensure_open("complete")?;
        if self.state != SessionState::PartsReceived {
            return Err(ValidationError::NoParts);
        }
        self.state = SessionState::Completed;
        Ok(())
    }

    pub fn mark_aborted(&mut self) -> Result<(), ValidationError> {
        self.ensure_open("abort")?;
        self.state = SessionState::Aborted;
        Ok(())
    }

    fn ensure_open(&self, action: &str) -> Result<(), ValidationError> {
        if self.state.is_terminal() {
            return Err(ValidationError::InvalidField {
                field: "state".to_string(),
                value: format!("{:?}", self.state),
                expected: format!("a non-terminal state to {}", action),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MultipartSession {
        MultipartSession::new("logs", ObjectKey::new("big.bin").unwrap(), "upload-1")
    }

    #[test]
    fn test_from_etags_numbers_from_one() {
        let parts = CompletedPart::from_etags(&["a".to_string(), "b".to_string()]);
        assert_eq!(parts[0].part_number, 1);
        assert_eq!(parts[1].part_number, 2);
        assert!(CompletedPart::validate_sequence(&parts).is_ok());
    }

    #[test]
    fn test_validate_sequence_rejects_permutation() {
        let parts = vec![
            CompletedPart {
                part_number: 2,
                etag: "b".to_string(),
            },
            CompletedPart {
                part_number: 1,
                etag: "a".to_string(),
            },
        ];
        assert_eq!(
            CompletedPart::validate_sequence(&parts),
            Err(ValidationError::PartOutOfOrder {
                position: 0,
                part_number: 2
            })
        );
        assert_eq!(
            CompletedPart::validate_sequence(&[]),
            Err(ValidationError::NoParts)
        );
    }

    #[test]
    fn test_session_state_machine() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Initiated);
        assert_eq!(s.mark_completed(), Err(ValidationError::NoParts));

        s.record_part(2, "etag2").unwrap();
        s.record_part(1, "etag1").unwrap();
        assert_eq!(s.state(), SessionState::PartsReceived);
        let parts = s.completed_parts();
        assert_eq!(parts[0].etag, "etag1");
        assert_eq!(parts[1].etag, "etag2");

        s.mark_completed().unwrap();
        assert!(s.record_part(3, "etag3").is_err());
        assert!(s.mark_aborted().is_err());
    }

    #[test]
    fn test_abort_from_initiated() {
        let mut s = session();
        s.mark_aborted().unwrap();
        assert_eq!(s.state(), SessionState::Aborted);
        assert!(s.record_part(1, "x").is_err());
    }

    #[test]
    fn test_invalid_part_number() {
        let mut s = session();
        assert_eq!(
            s.record_part(0, "x"),
            Err(ValidationError::InvalidPartNumber(0))
        );
        assert!(s.record_part(MAX_PART_NUMBER + 1, "x").is_err());
    }
}
