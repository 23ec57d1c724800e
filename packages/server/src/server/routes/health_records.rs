use axum::{extract::Extension, extract::Path, http::StatusCode, Json};

use crate::common::{parse_id, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::health::activities;
use crate::domains::health::{
    ChildDisease, DiseaseListQuery, HealthRecordData, HealthRecordInput, HealthRecordListQuery,
};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

pub async fn list_health_records_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<HealthRecordListQuery>,
) -> ApiResult<Json<Paginated<HealthRecordData>>> {
    Ok(Json(activities::list_health_records(query, &state.deps).await?))
}

pub async fn create_health_record_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<HealthRecordInput>,
) -> ApiResult<(StatusCode, Json<HealthRecordData>)> {
    let record = activities::create_health_record(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete_health_record_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    activities::delete_health_record(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_diseases_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<DiseaseListQuery>,
) -> ApiResult<Json<Paginated<ChildDisease>>> {
    Ok(Json(activities::list_diseases(query, &state.deps).await?))
}
