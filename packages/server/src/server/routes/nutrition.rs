use axum::{extract::Extension, extract::Path, http::StatusCode, Json};

use crate::common::{parse_id, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::nutrition::activities;
use crate::domains::nutrition::{NutritionInput, NutritionListQuery, NutritionPatch, NutritionRecord};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

pub async fn list_nutrition_records_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<NutritionListQuery>,
) -> ApiResult<Json<Paginated<NutritionRecord>>> {
    Ok(Json(
        activities::list_nutrition_records(query, &state.deps).await?,
    ))
}

pub async fn create_nutrition_record_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<NutritionInput>,
) -> ApiResult<(StatusCode, Json<NutritionRecord>)> {
    let record = activities::create_nutrition_record(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_nutrition_record_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<NutritionPatch>,
) -> ApiResult<Json<NutritionRecord>> {
    let id = parse_id(&id)?;
    Ok(Json(
        activities::update_nutrition_record(id, patch, &state.deps).await?,
    ))
}

pub async fn delete_nutrition_record_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    activities::delete_nutrition_record(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
