//! Authentication and session lifecycle
//!
//! Credential verification, JWT issuance, refresh-token rotation, email
//! verification, and password reset. `service` holds the business logic,
//! `api` the HTTP surface; `jwt`, `refresh`, and `cookie` are the token
//! mechanics underneath.

pub mod api;
pub mod cookie;
pub mod jwt;
pub mod refresh;
pub mod service;

pub use api::{AuthApiState, auth_api_router};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use refresh::{IssuedRefreshToken, RefreshTokenError, RefreshTokenManager};
pub use service::{AuthError, AuthService, AuthenticatedTokens, RegisterOutcome};
