//! Input validation helpers shared by the domain activities.

use chrono::{NaiveDate, Utc};

use super::errors::ApiError;
use super::id::Id;

/// Parse a path/body identifier, rejecting anything that is not a UUID.
pub fn parse_id<T>(raw: &str) -> Result<Id<T>, ApiError> {
    Id::parse(raw).map_err(|_| ApiError::bad_request("Identifiant invalide"))
}

/// Trimmed value of a required text field.
pub fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Le champ '{}' est obligatoire",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional text; blank strings become `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Only the `@` is checked; deliverability is the provider's concern.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(ApiError::bad_request("Adresse e-mail invalide"))
    }
}

pub fn not_in_future(date: NaiveDate, field: &str) -> Result<(), ApiError> {
    if date > Utc::now().date_naive() {
        return Err(ApiError::bad_request(format!(
            "Le champ '{}' ne peut pas être dans le futur",
            field
        )));
    }
    Ok(())
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChildId;

    #[test]
    fn test_parse_id_rejects_non_uuid() {
        let err = parse_id::<crate::common::Child>("123").unwrap_err();
        assert_eq!(err.public_message(), "Identifiant invalide");
    }

    #[test]
    fn test_parse_id_accepts_uuid() {
        let id = ChildId::new();
        assert_eq!(parse_id::<crate::common::Child>(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Maison  ", "name").unwrap(), "Maison");
        assert!(required("   ", "name").is_err());
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" a ".into())), Some("a".into()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("contact@centre.cd").is_ok());
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("contact.centre.cd").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_not_in_future() {
        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(not_in_future(tomorrow, "date").is_err());
        assert!(not_in_future(Utc::now().date_naive(), "date").is_ok());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_a"), "%50\\%\\_a%");
    }
}
