use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::UserId;

/// Role value marking platform administrators in `app_metadata.role`.
pub const ADMIN_ROLE: &str = "admin";

/// JWT Claims issued by the auth provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<AppMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId> {
        UserId::parse(&self.sub).map_err(|_| anyhow!("Token subject is not a UUID"))
    }

    pub fn is_admin(&self) -> bool {
        self.app_metadata
            .as_ref()
            .and_then(|m| m.role.as_deref())
            .is_some_and(|role| role == ADMIN_ROLE)
    }
}

/// Decodes bearer tokens issued by the auth provider.
///
/// With a secret the HS256 signature is verified. Without one the token is
/// only decoded; expiry is enforced in both modes.
#[derive(Clone)]
pub struct JwtService {
    secret: Option<Vec<u8>>,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Some(secret.as_bytes().to_vec()),
        }
    }

    /// Decode-only mode for deployments behind a gateway that already checked the signature.
    pub fn unverified() -> Self {
        Self { secret: None }
    }

    pub fn verifies_signature(&self) -> bool {
        self.secret.is_some()
    }

    /// Sign a token (tests and local tooling).
    pub fn create_token(
        &self,
        user_id: Uuid,
        email: Option<String>,
        role: Option<&str>,
        ttl: chrono::Duration,
    ) -> Result<String> {
        let secret = self.secret.as_deref().unwrap_or(b"unsigned");
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
            email,
            app_metadata: Some(AppMetadata {
                role: role.map(str::to_string),
            }),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(Into::into)
    }

    /// Decode a token and check expiry (and the signature when a secret is set).
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;

        let key = match &self.secret {
            Some(secret) => DecodingKey::from_secret(secret),
            None => {
                validation.insecure_disable_signature_validation();
                DecodingKey::from_secret(&[])
            }
        };

        let claims = decode::<Claims>(token, &key, &validation)?.claims;
        claims.user_id()?;
        Ok(claims)
    }
}
