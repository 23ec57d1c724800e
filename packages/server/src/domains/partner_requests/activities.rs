//! Partner request workflow: public submission, admin review

use serde::Deserialize;
use tracing::{info, warn};

use crate::common::{
    optional, required, validate_email, ApiError, ApiResult, Paginated, PaginationArgs,
    PartnerRequestId, UserId,
};
use crate::domains::notifications::activities::create_notification;
use crate::domains::notifications::models::{kinds, NewNotification, Priority};
use crate::domains::partner_requests::models::{
    CreatePartnerRequest, PartnerRequest, PartnerStatus,
};
use crate::kernel::email::text_to_html;
use crate::kernel::{EmailMessage, ServerDeps};

/// Body of `POST /api/partner-requests`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerRequestInput {
    #[serde(default)]
    pub organization_name: String,
    pub organization_type: Option<String>,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerRequestListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<PartnerStatus>,
}

/// Body of `PATCH /api/partner-requests/:id/status`
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub status: PartnerStatus,
    pub note: Option<String>,
}

pub fn validate_partner_request(input: PartnerRequestInput) -> ApiResult<CreatePartnerRequest> {
    let email = required(&input.email, "email")?;
    validate_email(&email)?;

    Ok(CreatePartnerRequest {
        organization_name: required(&input.organization_name, "organization_name")?,
        organization_type: optional(input.organization_type),
        contact_person: required(&input.contact_person, "contact_person")?,
        email,
        phone: optional(input.phone),
        message: optional(input.message),
    })
}

pub async fn submit_partner_request(
    input: PartnerRequestInput,
    deps: &ServerDeps,
) -> ApiResult<PartnerRequest> {
    let input = validate_partner_request(input)?;
    let request = PartnerRequest::create(input, &deps.db_pool).await?;
    info!(
        partner_request_id = %request.id,
        organization = %request.organization_name,
        "Partner request submitted"
    );

    let notification = NewNotification {
        user_id: None,
        orphanage_id: None,
        kind: kinds::PARTNER_REQUEST.to_string(),
        title: "Nouvelle demande de partenariat".to_string(),
        message: format!(
            "{} ({}) souhaite devenir partenaire.",
            request.organization_name, request.contact_person
        ),
        priority: Priority::Low,
    };
    if let Err(e) = create_notification(notification, deps).await {
        warn!(partner_request_id = %request.id, error = %e, "Failed to notify admins");
    }

    Ok(request)
}

pub async fn list_partner_requests(
    query: PartnerRequestListQuery,
    deps: &ServerDeps,
) -> ApiResult<Paginated<PartnerRequest>> {
    let page = PaginationArgs {
        page: query.page,
        limit: query.limit,
    }
    .validate()?;
    let (rows, total) = PartnerRequest::find_paginated(query.status, page, &deps.db_pool).await?;
    Ok(Paginated::new(rows, page, total))
}

/// Approve or reject a pending request and tell the requester by e-mail.
pub async fn review_partner_request(
    id: PartnerRequestId,
    input: ReviewInput,
    reviewer: UserId,
    deps: &ServerDeps,
) -> ApiResult<PartnerRequest> {
    if input.status == PartnerStatus::Pending {
        return Err(ApiError::bad_request(
            "Le statut doit être 'approved' ou 'rejected'",
        ));
    }

    let note = optional(input.note);
    let reviewed = PartnerRequest::review(id, input.status, note, reviewer, &deps.db_pool).await?;
    let request = match reviewed {
        Some(request) => request,
        None => {
            return match PartnerRequest::find_by_id(id, &deps.db_pool).await? {
                Some(_) => Err(ApiError::Conflict(
                    "Cette demande a déjà été traitée".to_string(),
                )),
                None => Err(ApiError::not_found("Demande introuvable")),
            };
        }
    };

    info!(partner_request_id = %id, status = %request.status, "Partner request reviewed");

    if let Err(e) = deps.email.send(decision_email(&request)).await {
        warn!(partner_request_id = %id, error = %e, "Decision e-mail failed");
    }

    Ok(request)
}

pub fn decision_email(request: &PartnerRequest) -> EmailMessage {
    let (subject, verdict) = match request.status {
        PartnerStatus::Approved => (
            "Votre demande de partenariat a été acceptée",
            "a été acceptée. Vous pouvez désormais accéder à la plateforme.",
        ),
        _ => (
            "Votre demande de partenariat",
            "n'a pas été retenue.",
        ),
    };

    let mut body = format!(
        "Bonjour {},\n\nLa demande de partenariat de {} {}",
        request.contact_person, request.organization_name, verdict
    );
    if let Some(note) = &request.review_note {
        body.push_str(&format!("\n\nCommentaire : {}", note));
    }
    body.push_str("\n\nL'équipe CareWatch RDC");

    EmailMessage {
        to: request.email.clone(),
        subject: subject.to_string(),
        html: text_to_html(&body),
    }
}
