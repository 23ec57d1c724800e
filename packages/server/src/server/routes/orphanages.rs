//! Care center registry endpoints, including legal document uploads.

use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, Path},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::common::{parse_id, ApiError, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::orphanages::activities;
use crate::domains::orphanages::{
    DocumentRecord, DocumentUpload, LegalStatusInput, OrphanageData, OrphanageInput,
    OrphanageListQuery, OrphanagePatch,
};
use crate::server::app::AppState;
use crate::server::middleware::{AdminUser, AuthUser};

pub async fn list_orphanages_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<OrphanageListQuery>,
) -> ApiResult<Json<Paginated<OrphanageData>>> {
    Ok(Json(activities::list_orphanages(query, &state.deps).await?))
}

pub async fn get_orphanage_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrphanageData>> {
    let id = parse_id(&id)?;
    Ok(Json(activities::get_orphanage(id, &state.deps).await?))
}

pub async fn create_orphanage_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<OrphanageInput>,
) -> ApiResult<(StatusCode, Json<OrphanageData>)> {
    let orphanage = activities::create_orphanage(input, user.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(orphanage)))
}

pub async fn update_orphanage_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<OrphanagePatch>,
) -> ApiResult<Json<OrphanageData>> {
    let id = parse_id(&id)?;
    Ok(Json(activities::update_orphanage(id, patch, &state.deps).await?))
}

pub async fn delete_orphanage_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    activities::delete_orphanage(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_legal_status_handler(
    Extension(state): Extension<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<LegalStatusInput>,
) -> ApiResult<Json<OrphanageData>> {
    let id = parse_id(&id)?;
    Ok(Json(
        activities::update_legal_status(id, input, &state.deps).await?,
    ))
}

/// Multipart fields: `file` (required), `document_type` (required), `expires_at` (optional)
pub async fn upload_document_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<DocumentRecord>)> {
    let id = parse_id(&id)?;
    let upload = read_upload(multipart).await?;
    let document = activities::upload_document(id, upload, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn delete_document_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path((id, document_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let document_id = Uuid::parse_str(&document_id)
        .map_err(|_| ApiError::bad_request("Identifiant invalide"))?;
    activities::delete_document(id, document_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<DocumentUpload> {
    let mut upload = DocumentUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "document_type" => {
                upload.document_type = Some(field.text().await.map_err(multipart_error)?);
            }
            "expires_at" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                        ApiError::bad_request("Date d'expiration invalide (format AAAA-MM-JJ)")
                    })?;
                    upload.expires_at = Some(date);
                }
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Fichier trop volumineux (max 10 Mo)".to_string())
    } else {
        ApiError::bad_request(format!("Formulaire invalide: {}", err.body_text()))
    }
}
