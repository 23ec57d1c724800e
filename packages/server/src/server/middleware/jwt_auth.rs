use crate::common::{ApiError, UserId};
use crate::domains::auth::JwtService;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Authenticated user information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// An `AuthUser` whose token carries the admin role
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser; protected handlers
/// reject it through the `AuthUser` extractor.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(request.headers(), &jwt_service);

    if let Some(user) = auth_user {
        debug!(user_id = %user.user_id, is_admin = user.is_admin, "Authenticated user");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;

    // Handle both "Bearer <token>" and raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
    (!token.is_empty()).then_some(token)
}

/// Verify a raw token and build the caller identity
pub fn auth_user_from_token(token: &str, jwt_service: &JwtService) -> Option<AuthUser> {
    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id().ok()?,
        email: claims.email.clone(),
        is_admin: claims.is_admin(),
    })
}

fn extract_auth_user(headers: &HeaderMap, jwt_service: &JwtService) -> Option<AuthUser> {
    auth_user_from_token(bearer_token(headers)?, jwt_service)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::admin_required());
        }
        Ok(AdminUser(user))
    }
}
