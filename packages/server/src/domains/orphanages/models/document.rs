//! Legal documents attached to a care center (registration, permits, ...).
//!
//! Files go to object storage; the center keeps a JSON list of records
//! pointing at them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::common::{ApiError, OrphanageId};

/// Upload ceiling: 10 MB.
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub storage_path: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
}

/// Reject empty files, disallowed types and files over the size ceiling.
pub fn validate_upload(content_type: &str, size: usize) -> Result<(), ApiError> {
    let normalized = normalize_content_type(content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&normalized.as_str()) {
        return Err(ApiError::UnsupportedMediaType(
            "Type de fichier non autorisé (PDF, JPEG ou PNG uniquement)".to_string(),
        ));
    }
    if size == 0 {
        return Err(ApiError::bad_request("Le fichier est vide"));
    }
    if size > MAX_DOCUMENT_SIZE {
        return Err(ApiError::PayloadTooLarge(
            "Fichier trop volumineux (max 10 Mo)".to_string(),
        ));
    }
    Ok(())
}

/// Lowercased MIME type without parameters (`image/PNG; q=1` → `image/png`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

/// `{orphanage}/{document_type}/{sha256 prefix}-{file name}`
///
/// The content hash keeps re-uploads of the same file at the same path.
pub fn storage_path(
    orphanage_id: OrphanageId,
    document_type: &str,
    file_name: &str,
    bytes: &[u8],
) -> String {
    let digest = Sha256::digest(bytes);
    let prefix = &hex::encode(digest)[..12];
    format!(
        "{}/{}/{}-{}",
        orphanage_id,
        sanitize_file_name(document_type),
        prefix,
        sanitize_file_name(file_name)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    Valid,
    ExpiringSoon { days_left: i64 },
    Expired,
}

impl DocumentRecord {
    pub fn expiry_state(&self, today: NaiveDate, warning_days: i64) -> ExpiryState {
        match self.expires_at {
            None => ExpiryState::Valid,
            Some(expires_at) if expires_at < today => ExpiryState::Expired,
            Some(expires_at) => {
                let days_left = (expires_at - today).num_days();
                if days_left <= warning_days {
                    ExpiryState::ExpiringSoon { days_left }
                } else {
                    ExpiryState::Valid
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at: Option<NaiveDate>) -> DocumentRecord {
        DocumentRecord {
            id: Uuid::new_v4(),
            document_type: "agrement".into(),
            file_name: "agrement.pdf".into(),
            content_type: "application/pdf".into(),
            size: 10,
            storage_path: "x".into(),
            url: "http://x".into(),
            uploaded_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_allowed_types() {
        for ty in ALLOWED_CONTENT_TYPES {
            assert!(validate_upload(ty, 1024).is_ok(), "{} should be allowed", ty);
        }
        assert!(validate_upload("IMAGE/PNG; charset=binary", 1024).is_ok());
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let err = validate_upload("application/x-msdownload", 1024).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType(_)));
        assert!(validate_upload("image/gif", 1024).is_err());
        assert!(validate_upload("", 1024).is_err());
    }

    #[test]
    fn test_size_limits() {
        assert!(validate_upload("application/pdf", MAX_DOCUMENT_SIZE).is_ok());
        let err = validate_upload("application/pdf", MAX_DOCUMENT_SIZE + 1).unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));
        assert!(matches!(
            validate_upload("application/pdf", 0).unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("Agrément officiel.pdf"), "Agr_ment_officiel.pdf");
        assert_eq!(sanitize_file_name("..."), "document");
    }

    #[test]
    fn test_storage_path_is_content_addressed() {
        let id = OrphanageId::new();
        let a = storage_path(id, "agrement", "a.pdf", b"same");
        let b = storage_path(id, "agrement", "a.pdf", b"same");
        let c = storage_path(id, "agrement", "a.pdf", b"other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(&format!("{}/agrement/", id)));
    }

    #[test]
    fn test_expiry_state() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(record(None).expiry_state(today, 30), ExpiryState::Valid);
        assert_eq!(
            record(NaiveDate::from_ymd_opt(2025, 5, 31)).expiry_state(today, 30),
            ExpiryState::Expired
        );
        assert_eq!(
            record(NaiveDate::from_ymd_opt(2025, 6, 11)).expiry_state(today, 30),
            ExpiryState::ExpiringSoon { days_left: 10 }
        );
        assert_eq!(
            record(NaiveDate::from_ymd_opt(2025, 9, 1)).expiry_state(today, 30),
            ExpiryState::Valid
        );
    }
}
