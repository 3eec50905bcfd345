//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/auth/register - Register a new user, trigger verification email
//! - POST /api/auth/login - Verify credentials, set token cookies
//! - GET  /api/auth/user-info?id= - Fetch a user profile
//! - POST /api/auth/refresh-token - Rotate refresh token, reissue access token
//! - POST /api/auth/send-verification - Resend the verification email
//! - POST /api/auth/verify-email - Consume a verification token
//! - POST /api/auth/request-password-reset - Issue a reset code
//! - POST /api/auth/reset-password - Consume a reset code, replace the password
//! - POST /api/auth/logout - Revoke the refresh token, clear cookies
//!
//! The token pair is delivered both in the JSON body (for non-browser
//! clients) and as `AccessToken`/`RefreshToken` cookies for the front-end.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::cookie::{
    ACCESS_TOKEN_COOKIE, CookieConfig, REFRESH_TOKEN_COOKIE, delete_cookie_header, extract_cookie,
    set_cookie_header,
};
use crate::core::auth::service::{AuthError, AuthService, AuthenticatedTokens, RegisterOutcome};
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::RefreshTokenInvalid => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            AuthError::EmailSendFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "EMAIL_UNAVAILABLE"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Internal details are logged, never sent to the client
        let message = if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal error in auth endpoint");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoQuery {
    pub id: Uuid,
}

/// Token pair as delivered in the JSON body
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
}

/// Response wrapper for login and refresh
#[derive(Debug, Serialize)]
pub struct AuthApiResponse {
    pub user: UserResponse,
    pub tokens: TokenPairResponse,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/user-info", get(user_info_handler))
        .route("/api/auth/refresh-token", post(refresh_handler))
        .route("/api/auth/send-verification", post(send_verification_handler))
        .route("/api/auth/verify-email", post(verify_email_handler))
        .route(
            "/api/auth/request-password-reset",
            post(request_password_reset_handler),
        )
        .route("/api/auth/reset-password", post(reset_password_handler))
        .route("/api/auth/logout", post(logout_handler))
        .with_state(state)
}

/// POST /api/auth/register
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterOutcome>), AuthError> {
    tracing::info!(email = %request.email, "registration attempt");

    let outcome = state
        .auth_service
        .register(&request.name, &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/auth/login
/// Verify credentials and set the token cookies
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    tracing::info!(email = %request.email, "login attempt");

    let tokens = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(token_pair_response(tokens))
}

/// GET /api/auth/user-info?id=
/// Fetch a user profile; requires a valid access token
async fn user_info_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
    Query(query): Query<UserInfoQuery>,
) -> Result<Json<UserResponse>, AuthError> {
    let token = extract_access_token(&headers)?;
    state.auth_service.validate_access_token(&token)?;

    let user = state.auth_service.user_info(query.id).await?;

    Ok(Json(user))
}

/// POST /api/auth/refresh-token
/// Rotate the refresh token, taken from the cookie or the JSON body
async fn refresh_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<Response, AuthError> {
    let presented = extract_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .or_else(|| body.map(|Json(req)| req.refresh_token))
        .ok_or(AuthError::RefreshTokenInvalid)?;

    let tokens = state.auth_service.refresh(&presented).await?;

    Ok(token_pair_response(tokens))
}

/// POST /api/auth/send-verification
async fn send_verification_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    state.auth_service.send_verification(&request.email).await?;

    Ok(Json(SuccessResponse::new("Verification email sent")))
}

/// POST /api/auth/verify-email
async fn verify_email_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    state
        .auth_service
        .verify_email(&request.email, &request.token)
        .await?;

    Ok(Json(SuccessResponse::new("Email verified successfully")))
}

/// POST /api/auth/request-password-reset
/// Answers identically whether or not the email has an account
async fn request_password_reset_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let sent = state
        .auth_service
        .request_password_reset(&request.email)
        .await?;

    tracing::debug!(sent, "password reset requested");

    Ok(Json(SuccessResponse::new(
        "If the email exists, a reset code has been sent",
    )))
}

/// POST /api/auth/reset-password
async fn reset_password_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, AuthError> {
    state
        .auth_service
        .reset_password(&request.email, &request.token, &request.new_password)
        .await?;

    Ok(Json(SuccessResponse::new(
        "Password reset successfully. Please login again.",
    )))
}

/// POST /api/auth/logout
/// Revoke the refresh token and clear both cookies
async fn logout_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let token = extract_access_token(&headers)?;
    let claims = state.auth_service.validate_access_token(&token)?;
    let user_id = claims.user_id()?;

    state.auth_service.logout(user_id).await?;

    tracing::info!(%user_id, "user logged out");

    let headers = AppendHeaders([
        (
            header::SET_COOKIE,
            delete_cookie_header(&CookieConfig::access_token(0)),
        ),
        (
            header::SET_COOKIE,
            delete_cookie_header(&CookieConfig::refresh_token(0)),
        ),
    ]);

    Ok((
        headers,
        Json(SuccessResponse::new("Logged out successfully")),
    )
        .into_response())
}

/// Build the login/refresh response: JSON body plus both token cookies
fn token_pair_response(tokens: AuthenticatedTokens) -> Response {
    let refresh_max_age = (tokens.refresh_token.expires_at - Utc::now()).num_seconds();

    let access_cookie = CookieConfig::access_token(tokens.access_expires_in);
    let refresh_cookie = CookieConfig::refresh_token(refresh_max_age);

    let headers = AppendHeaders([
        (
            header::SET_COOKIE,
            set_cookie_header(&access_cookie, &tokens.access_token),
        ),
        (
            header::SET_COOKIE,
            set_cookie_header(&refresh_cookie, &tokens.refresh_token.token),
        ),
    ]);

    let body = AuthApiResponse {
        user: tokens.user,
        tokens: TokenPairResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.token,
            expires_in: tokens.access_expires_in,
        },
    };

    (headers, Json(body)).into_response()
}

/// Extract the access token from the Authorization header or the cookie
pub fn extract_access_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        return Ok(token.to_string());
    }

    extract_cookie(headers, ACCESS_TOKEN_COOKIE).ok_or(AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::{JwtConfig, JwtService};
    use crate::core::auth::refresh::RefreshTokenManager;
    use crate::core::db::repositories::{
        ResetTokenRepository, UserRepository, VerificationTokenRepository,
    };
    use crate::core::email::LogMailer;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        // These tests never reach the database; a lazy pool that nothing
        // connects to is enough
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/auth_router_tests")
            .expect("lazy pool");

        let user_repo = UserRepository::new(pool.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            VerificationTokenRepository::new(pool.clone()),
            ResetTokenRepository::new(pool),
            JwtService::new(JwtConfig::new("test_secret_for_router_tests")),
            RefreshTokenManager::new(user_repo),
            std::sync::Arc::new(LogMailer),
            "http://localhost:3000",
        );

        auth_api_router(AuthApiState { auth_service })
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Alice","email":"not-an-email","password":"Sup3r!pass"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Alice","email":"alice@example.com","password":"short"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_info_without_token_is_unauthorized() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/auth/user-info?id={}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_with_garbage_token_is_unauthorized() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_extract_access_token_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer my_token_123"),
        );

        let token = extract_access_token(&headers).unwrap();
        assert_eq!(token, "my_token_123");
    }

    #[test]
    fn test_extract_access_token_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("AccessToken=cookie_token_456"),
        );

        let token = extract_access_token(&headers).unwrap();
        assert_eq!(token, "cookie_token_456");
    }

    #[test]
    fn test_extract_access_token_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header_token"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("AccessToken=cookie_token"),
        );

        let token = extract_access_token(&headers).unwrap();
        assert_eq!(token, "header_token");
    }

    #[test]
    fn test_extract_access_token_missing() {
        let headers = HeaderMap::new();

        let result = extract_access_token(&headers);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_extract_access_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic base64credentials"),
        );

        let result = extract_access_token(&headers);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_auth_error_status_mapping() {
        let resp = AuthError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::EmailAlreadyExists.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AuthError::UserNotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AuthError::Validation("bad input".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AuthError::EmailSendFailed("smtp down".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = AuthError::Internal("secret detail".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
