//! Auth domain - decoding of bearer tokens issued by the auth provider.
//!
//! Sign-up, sign-in and password flows stay with the provider; this service
//! only needs the caller's id, e-mail and role.

pub mod jwt;

pub use jwt::{AppMetadata, Claims, JwtService, ADMIN_ROLE};
