//! Transactional e-mail through the provider's REST API (`POST /emails`).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{BaseEmailService, EmailMessage};

const API_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl BaseEmailService for EmailClient {
    async fn send(&self, message: EmailMessage) -> Result<String> {
        let request = SendEmailRequest {
            from: &self.from,
            to: vec![&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http_client
            .post(format!("{}/emails", API_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach e-mail provider")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "E-mail provider error");
            bail!("E-mail provider returned {}: {}", status, body);
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .context("Failed to parse e-mail provider response")?;

        debug!(message_id = %sent.id, "E-mail sent");
        Ok(sent.id)
    }
}

/// Escape text for inclusion in an HTML e-mail body, keeping line breaks.
pub fn text_to_html(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!("<p>{}</p>", escaped.replace('\n', "<br>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_html_escapes() {
        assert_eq!(
            text_to_html("<b>Alerte</b>\nCentre & co"),
            "<p>&lt;b&gt;Alerte&lt;/b&gt;<br>Centre &amp; co</p>"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = SendEmailRequest {
            from: "a@b.cd",
            to: vec!["c@d.cd"],
            subject: "Sujet",
            html: "<p>x</p>",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"][0], "c@d.cd");
        assert_eq!(json["subject"], "Sujet");
    }
}
