//! Admin-triggered e-mail / SMS delivery

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::common::{optional, required, validate_email, ApiError, ApiResult};
use crate::kernel::email::text_to_html;
use crate::kernel::{EmailMessage, ServerDeps};

/// Body of `POST /api/notifications/send`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendNotificationInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOutcome {
    Sent,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub email: ChannelOutcome,
    pub sms: ChannelOutcome,
}

impl DeliveryReport {
    /// True when at least one channel was attempted and none succeeded
    pub fn all_failed(&self) -> bool {
        let attempted = [self.email, self.sms]
            .into_iter()
            .filter(|o| *o != ChannelOutcome::Skipped)
            .collect::<Vec<_>>();
        !attempted.is_empty() && attempted.iter().all(|o| *o == ChannelOutcome::Failed)
    }
}

/// Validated recipients and content
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

pub fn validate_outbound(input: SendNotificationInput) -> ApiResult<Outbound> {
    let email = optional(input.email);
    let phone = optional(input.phone);

    if email.is_none() && phone.is_none() {
        return Err(ApiError::bad_request(
            "Au moins un destinataire (e-mail ou téléphone) est requis",
        ));
    }
    if let Some(email) = &email {
        validate_email(email)?;
    }
    let phone = match phone {
        Some(raw) => Some(
            twilio::normalize_phone(&raw)
                .ok_or_else(|| ApiError::bad_request("Numéro de téléphone invalide"))?,
        ),
        None => None,
    };

    Ok(Outbound {
        email,
        phone,
        subject: required(&input.subject, "subject")?,
        message: required(&input.message, "message")?,
    })
}

/// Sends on each requested channel independently. Fails with 502 only
/// when every requested channel failed.
pub async fn send_notification(
    input: SendNotificationInput,
    deps: &ServerDeps,
) -> ApiResult<DeliveryReport> {
    let outbound = validate_outbound(input)?;

    let email = match &outbound.email {
        Some(to) => {
            let message = EmailMessage {
                to: to.clone(),
                subject: outbound.subject.clone(),
                html: text_to_html(&outbound.message),
            };
            match deps.email.send(message).await {
                Ok(id) => {
                    info!(message_id = %id, "Notification e-mail sent");
                    ChannelOutcome::Sent
                }
                Err(e) => {
                    warn!(error = %e, "Notification e-mail failed");
                    ChannelOutcome::Failed
                }
            }
        }
        None => ChannelOutcome::Skipped,
    };

    let sms = match &outbound.phone {
        Some(phone) => {
            let body = format!("{}\n{}", outbound.subject, outbound.message);
            match deps.sms.send_sms(phone, &body).await {
                Ok(sid) => {
                    info!(message_sid = %sid, "Notification SMS sent");
                    ChannelOutcome::Sent
                }
                Err(e) => {
                    warn!(error = %e, "Notification SMS failed");
                    ChannelOutcome::Failed
                }
            }
        }
        None => ChannelOutcome::Skipped,
    };

    let report = DeliveryReport { email, sms };
    if report.all_failed() {
        return Err(ApiError::Upstream(
            "L'envoi de la notification a échoué".to_string(),
        ));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: Option<&str>, phone: Option<&str>) -> SendNotificationInput {
        SendNotificationInput {
            email: email.map(Into::into),
            phone: phone.map(Into::into),
            subject: "Alerte".into(),
            message: "Message".into(),
        }
    }

    #[test]
    fn test_requires_a_recipient() {
        assert!(validate_outbound(input(None, None)).is_err());
        assert!(validate_outbound(input(Some(" "), Some(""))).is_err());
    }

    #[test]
    fn test_phone_normalized() {
        let outbound = validate_outbound(input(None, Some("0812345678"))).unwrap();
        assert_eq!(outbound.phone.as_deref(), Some("+243812345678"));
        assert!(validate_outbound(input(None, Some("abc"))).is_err());
    }

    #[test]
    fn test_subject_and_message_required() {
        let mut no_subject = input(Some("a@b.cd"), None);
        no_subject.subject = String::new();
        assert!(validate_outbound(no_subject).is_err());
    }

    #[test]
    fn test_all_failed() {
        use ChannelOutcome::*;
        assert!(DeliveryReport { email: Failed, sms: Skipped }.all_failed());
        assert!(DeliveryReport { email: Failed, sms: Failed }.all_failed());
        assert!(!DeliveryReport { email: Failed, sms: Sent }.all_failed());
        assert!(!DeliveryReport { email: Skipped, sms: Skipped }.all_failed());
    }
}
