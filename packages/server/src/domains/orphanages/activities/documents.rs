//! Legal document upload and removal

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::registry::center_not_found;
use crate::common::{required, ApiError, ApiResult, OrphanageId};
use crate::domains::orphanages::data::DocumentUpload;
use crate::domains::orphanages::models::{
    normalize_content_type, sanitize_file_name, storage_path, validate_upload, DocumentRecord,
    Orphanage,
};
use crate::kernel::ServerDeps;

/// A validated upload, ready to be stored
#[derive(Debug)]
pub struct CheckedUpload {
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub expires_at: Option<chrono::NaiveDate>,
}

/// Field and file checks. Runs before any database or storage access.
pub fn check_upload(upload: DocumentUpload) -> ApiResult<CheckedUpload> {
    let bytes = upload
        .bytes
        .ok_or_else(|| ApiError::bad_request("Aucun fichier fourni"))?;
    let content_type = normalize_content_type(upload.content_type.as_deref().unwrap_or_default());
    validate_upload(&content_type, bytes.len())?;

    let document_type = required(
        upload.document_type.as_deref().unwrap_or_default(),
        "document_type",
    )?;
    let file_name = sanitize_file_name(upload.file_name.as_deref().unwrap_or("document"));

    Ok(CheckedUpload {
        document_type,
        file_name,
        content_type,
        bytes,
        expires_at: upload.expires_at,
    })
}

pub async fn upload_document(
    id: OrphanageId,
    upload: DocumentUpload,
    deps: &ServerDeps,
) -> ApiResult<DocumentRecord> {
    let upload = check_upload(upload)?;

    if !Orphanage::exists(id, &deps.db_pool).await? {
        return Err(center_not_found());
    }

    let path = storage_path(id, &upload.document_type, &upload.file_name, &upload.bytes);
    let size = upload.bytes.len() as u64;
    let stored = deps
        .storage
        .put(&path, &upload.content_type, upload.bytes)
        .await
        .map_err(|e| {
            warn!(orphanage_id = %id, path = %path, error = %e, "Document upload failed");
            ApiError::Upstream("Échec de l'envoi du document".to_string())
        })?;

    let record = DocumentRecord {
        id: Uuid::new_v4(),
        document_type: upload.document_type,
        file_name: upload.file_name,
        content_type: upload.content_type,
        size,
        storage_path: stored.path,
        url: stored.url,
        uploaded_at: Utc::now(),
        expires_at: upload.expires_at,
    };

    if !Orphanage::append_document(id, &record, &deps.db_pool).await? {
        return Err(center_not_found());
    }

    info!(
        orphanage_id = %id,
        document_id = %record.id,
        document_type = %record.document_type,
        size,
        "Document uploaded"
    );
    Ok(record)
}

/// Drops the record; the stored object is removed best-effort.
pub async fn delete_document(
    id: OrphanageId,
    document_id: Uuid,
    deps: &ServerDeps,
) -> ApiResult<()> {
    let removed = match Orphanage::remove_document(id, document_id, &deps.db_pool).await? {
        Some(removed) => removed,
        None if Orphanage::exists(id, &deps.db_pool).await? => {
            return Err(ApiError::not_found("Document introuvable"))
        }
        None => return Err(center_not_found()),
    };

    if let Err(e) = deps.storage.delete(&removed.storage_path).await {
        warn!(
            orphanage_id = %id,
            path = %removed.storage_path,
            error = %e,
            "Stored document could not be removed"
        );
    }

    info!(orphanage_id = %id, %document_id, "Document deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, bytes: Vec<u8>) -> DocumentUpload {
        DocumentUpload {
            document_type: Some("agrement".into()),
            file_name: Some("Agrément 2024.pdf".into()),
            content_type: Some(content_type.into()),
            bytes: Some(bytes),
            expires_at: None,
        }
    }

    #[test]
    fn test_check_upload_accepts_pdf() {
        let checked = check_upload(upload("application/pdf", vec![1, 2, 3])).unwrap();
        assert_eq!(checked.file_name, "Agr_ment_2024.pdf");
        assert_eq!(checked.content_type, "application/pdf");
    }

    #[test]
    fn test_check_upload_requires_file() {
        let mut missing = upload("application/pdf", vec![]);
        missing.bytes = None;
        assert!(matches!(check_upload(missing), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_check_upload_type_checked_before_document_type() {
        let mut bad = upload("text/html", vec![1]);
        bad.document_type = None;
        assert!(matches!(
            check_upload(bad),
            Err(ApiError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_check_upload_requires_document_type() {
        let mut bad = upload("image/png", vec![1]);
        bad.document_type = Some("   ".into());
        assert!(matches!(check_upload(bad), Err(ApiError::BadRequest(_))));
    }
}
