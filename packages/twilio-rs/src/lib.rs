// Minimal Twilio client: outbound SMS through the Programmable Messaging API.

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{MessageResponse, TwilioErrorBody};

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format (or a messaging service SID starting with `MG`).
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
    base_url: String,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at another host (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{base}/Accounts/{sid}/Messages.json",
            base = self.base_url,
            sid = self.options.account_sid
        )
    }

    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, String> {
        let recipient = normalize_phone(recipient).ok_or("Invalid recipient phone number")?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        // Messaging service SIDs go in a different form field than plain numbers.
        let sender_field = if self.options.from.starts_with("MG") {
            "MessagingServiceSid"
        } else {
            "From"
        };

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", &recipient);
        form_body.insert(sender_field, &self.options.from);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await
            .map_err(|e| format!("Request to Twilio failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TwilioErrorBody>(&text)
                .map(|body| match body.code {
                    Some(code) => format!("{} (code {})", body.message, code),
                    None => body.message,
                })
                .unwrap_or(text);
            return Err(format!("Twilio returned {}: {}", status, detail));
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| format!("Failed to parse Twilio response: {}", e))
    }
}

/// Normalise a phone number to E.164.
///
/// Local Congolese numbers (`0XXXXXXXXX`, 10 digits) get the `+243` prefix.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let normalized = if let Some(rest) = cleaned.strip_prefix("00") {
        format!("+{}", rest)
    } else if cleaned.starts_with('+') {
        cleaned
    } else if cleaned.len() == 10 && cleaned.starts_with('0') {
        format!("+243{}", &cleaned[1..])
    } else {
        format!("+{}", cleaned)
    };

    let digits = &normalized[1..];
    if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_local_number() {
        assert_eq!(
            normalize_phone("0812 345 678").as_deref(),
            Some("+243812345678")
        );
    }

    #[test]
    fn test_normalize_international_forms() {
        assert_eq!(
            normalize_phone("+243 81-234-5678").as_deref(),
            Some("+243812345678")
        );
        assert_eq!(
            normalize_phone("00243812345678").as_deref(),
            Some("+243812345678")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_phone("hello").is_none());
        assert!(normalize_phone("+12").is_none());
    }

    #[test]
    fn test_messages_url() {
        let service = TwilioService::new(TwilioOptions {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from: "+15550000000".to_string(),
        })
        .with_base_url("http://localhost:9999");

        assert_eq!(
            service.messages_url(),
            "http://localhost:9999/Accounts/AC123/Messages.json"
        );
    }
}
