use axum::{extract::Extension, extract::Path, http::StatusCode, Json};

use crate::common::{parse_id, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::children::activities;
use crate::domains::children::{ChildData, ChildInput, ChildListQuery, ChildPatch};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

pub async fn list_children_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<ChildListQuery>,
) -> ApiResult<Json<Paginated<ChildData>>> {
    Ok(Json(activities::list_children(query, &state.deps).await?))
}

pub async fn get_child_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ChildData>> {
    let id = parse_id(&id)?;
    Ok(Json(activities::get_child(id, &state.deps).await?))
}

pub async fn add_child_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<ChildInput>,
) -> ApiResult<(StatusCode, Json<ChildData>)> {
    let child = activities::add_child(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

pub async fn update_child_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ChildPatch>,
) -> ApiResult<Json<ChildData>> {
    let id = parse_id(&id)?;
    Ok(Json(activities::update_child(id, patch, &state.deps).await?))
}

/// Removes the child together with its health, disease and nutrition records
pub async fn delete_child_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    activities::delete_child(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
