//! Access-token issuance and validation
//!
//! Access tokens are HS256-signed JWTs carrying the user's identity claims
//! with an absolute expiry (24 hours by default). Validity is determined by
//! signature and expiry alone, never by a store lookup, so an issued token
//! cannot be revoked early; the short-ish lifetime is the accepted trade-off
//! for lookup-free authentication.
//!
//! Refresh tokens are NOT JWTs; see [`crate::core::auth::refresh`].

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::db::models::User;

/// Default access token lifetime (24 hours)
const ACCESS_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token lifetime in hours
    pub access_token_expiration_hours: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl JwtConfig {
    /// Create a new JWT configuration with defaults
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_hours: ACCESS_TOKEN_EXPIRATION_HOURS,
            issuer: "cosmoverse".to_string(),
            audience: "cosmoverse-client".to_string(),
        }
    }

    /// Create config from environment variables.
    ///
    /// A missing `JWT_SECRET` is fatal here, at startup, so a misconfigured
    /// deployment never gets as far as serving requests.
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| JwtError::MissingSecret)?;

        let access_exp = std::env::var("JWT_ACCESS_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(ACCESS_TOKEN_EXPIRATION_HOURS);

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "cosmoverse".to_string());
        let audience =
            std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "cosmoverse-client".to_string());

        Ok(Self {
            secret,
            access_token_expiration_hours: access_exp,
            issuer,
            audience,
        })
    }

    /// Set access token expiration
    pub fn access_token_expiration(mut self, hours: i64) -> Self {
        self.access_token_expiration_hours = hours;
        self
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set audience
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT_SECRET environment variable not set")]
    MissingSecret,

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience => JwtError::InvalidToken,
            _ => JwtError::DecodingError(err.to_string()),
        }
    }
}

/// Access-token claims; all keys are plain strings, no framework constants
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// User email
    pub email: String,
    /// Role string ("User" or "Admin")
    pub role: String,
    /// Whether the email address has been verified
    pub email_verified: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique per issued token)
    pub jti: String,
}

impl Claims {
    /// Get user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }

    /// Whether this token grants admin access
    pub fn is_admin(&self) -> bool {
        self.role == crate::core::db::models::roles::ADMIN
    }
}

/// JWT service for access-token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Create JWT service from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let config = JwtConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Issue an access token for a user; returns the token and its expiry
    /// as a Unix timestamp
    pub fn issue_access_token(&self, user: &User) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.config.access_token_expiration_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            email_verified: user.is_email_verified,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, exp.timestamp()))
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        // Zero leeway: an expired token is expired
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::models::roles;
    use chrono::Utc;

    fn create_test_service() -> JwtService {
        let config = JwtConfig::new("test_secret_key_for_testing_only_32bytes!");
        JwtService::new(config)
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: roles::USER.to_string(),
            is_email_verified: true,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // ========================================================================
    // JwtConfig Tests
    // ========================================================================

    #[test]
    fn test_jwt_config_new() {
        let config = JwtConfig::new("my_secret");

        assert_eq!(config.secret, "my_secret");
        assert_eq!(
            config.access_token_expiration_hours,
            ACCESS_TOKEN_EXPIRATION_HOURS
        );
        assert_eq!(config.issuer, "cosmoverse");
        assert_eq!(config.audience, "cosmoverse-client");
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("secret")
            .access_token_expiration(1)
            .issuer("my_app")
            .audience("my_client");

        assert_eq!(config.access_token_expiration_hours, 1);
        assert_eq!(config.issuer, "my_app");
        assert_eq!(config.audience, "my_client");
    }

    #[test]
    fn test_jwt_config_from_env_missing_secret() {
        let original = std::env::var("JWT_SECRET").ok();
        // SAFETY: test environment
        unsafe { std::env::remove_var("JWT_SECRET") };

        let result = JwtConfig::from_env();
        assert!(matches!(result, Err(JwtError::MissingSecret)));

        if let Some(val) = original {
            // SAFETY: test environment
            unsafe { std::env::set_var("JWT_SECRET", val) };
        }
    }

    // ========================================================================
    // Issue / Validate Tests
    // ========================================================================

    #[test]
    fn test_issue_access_token() {
        let service = create_test_service();
        let user = test_user();

        let (token, exp) = service.issue_access_token(&user).unwrap();

        assert!(!token.is_empty());
        assert!(exp > Utc::now().timestamp());
    }

    #[test]
    fn test_claims_round_trip() {
        let service = create_test_service();
        let user = test_user();

        let (token, _) = service.issue_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, roles::USER);
        assert!(claims.email_verified);
        assert_eq!(claims.iss, "cosmoverse");
        assert_eq!(claims.aud, "cosmoverse-client");
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret_one"));
        let service2 = JwtService::new(JwtConfig::new("secret_two"));

        let (token, _) = service1.issue_access_token(&test_user()).unwrap();

        let result = service2.validate_access_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_token_wrong_issuer() {
        let issuing =
            JwtService::new(JwtConfig::new("shared_secret").issuer("somewhere-else"));
        let validating = JwtService::new(JwtConfig::new("shared_secret"));

        let (token, _) = issuing.issue_access_token(&test_user()).unwrap();

        let result = validating.validate_access_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let service = create_test_service();

        let result = service.validate_access_token("not.a.token");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative expiration makes the token already expired at issue time
        let config = JwtConfig::new("test_secret").access_token_expiration(-1);
        let service = JwtService::new(config);

        let (token, _) = service.issue_access_token(&test_user()).unwrap();

        let result = service.validate_access_token(&token);
        assert!(
            matches!(result, Err(JwtError::Expired)),
            "Expected Expired error, got: {:?}",
            result
        );
    }

    #[test]
    fn test_tokens_carry_unique_jti() {
        let service = create_test_service();
        let user = test_user();

        let (token1, _) = service.issue_access_token(&user).unwrap();
        let (token2, _) = service.issue_access_token(&user).unwrap();

        let claims1 = service.validate_access_token(&token1).unwrap();
        let claims2 = service.validate_access_token(&token2).unwrap();

        assert_ne!(claims1.jti, claims2.jti);
    }

    #[test]
    fn test_claims_is_admin() {
        let service = create_test_service();
        let mut user = test_user();
        user.role = roles::ADMIN.to_string();

        let (token, _) = service.issue_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert!(claims.is_admin());
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn test_jwt_error_display() {
        assert_eq!(
            format!("{}", JwtError::MissingSecret),
            "JWT_SECRET environment variable not set"
        );
        assert_eq!(format!("{}", JwtError::Expired), "Token expired");
        assert_eq!(format!("{}", JwtError::InvalidToken), "Invalid token");
    }
}
