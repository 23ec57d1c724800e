use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::{parse_id, ApiJson, ApiQuery, ApiResult, Paginated};
use crate::domains::partner_requests::activities;
use crate::domains::partner_requests::{
    PartnerRequest, PartnerRequestInput, PartnerRequestListQuery, ReviewInput,
};
use crate::server::app::AppState;
use crate::server::middleware::{AdminUser, ClientIp};

/// Public: no token required
pub async fn submit_partner_request_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    ApiJson(input): ApiJson<PartnerRequestInput>,
) -> ApiResult<(StatusCode, Json<PartnerRequest>)> {
    if let Some(Extension(ClientIp(ip))) = client_ip {
        tracing::info!(client_ip = %ip, "Partner request submitted");
    }
    let request = activities::submit_partner_request(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_partner_requests_handler(
    Extension(state): Extension<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(query): ApiQuery<PartnerRequestListQuery>,
) -> ApiResult<Json<Paginated<PartnerRequest>>> {
    Ok(Json(
        activities::list_partner_requests(query, &state.deps).await?,
    ))
}

pub async fn review_partner_request_handler(
    Extension(state): Extension<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> ApiResult<Json<PartnerRequest>> {
    let id = parse_id(&id)?;
    Ok(Json(
        activities::review_partner_request(id, input, admin.user_id, &state.deps).await?,
    ))
}
