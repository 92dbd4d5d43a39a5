/// Authentication routes.
///
/// Handles registration, login, token refresh, logout, password change, and
/// the current-user lookup. Tokens travel only as HttpOnly cookies; response
/// bodies carry a small JSON message.

use actix_web::{
    cookie::{time::Duration, Cookie},
    web, HttpRequest, HttpResponse, HttpResponseBuilder,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    SessionIssuer, SessionTokens, ACCESS_TOKEN_AGE, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_AGE,
    REFRESH_TOKEN_COOKIE,
};
use crate::error::{AppError, AuthError};
use crate::middleware::CurrentUser;
use crate::users::UserStore;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

fn message(msg: &str) -> MessageResponse {
    MessageResponse {
        message: msg.to_string(),
    }
}

fn session_cookie(name: &'static str, value: String, age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(age_seconds))
        .finish()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .finish()
}

fn session_response(
    mut builder: HttpResponseBuilder,
    tokens: SessionTokens,
    msg: &str,
) -> HttpResponse {
    builder
        .cookie(session_cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token,
            ACCESS_TOKEN_AGE,
        ))
        .cookie(session_cookie(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token,
            REFRESH_TOKEN_AGE,
        ))
        .json(message(msg))
}

/// POST /api/v1/register
///
/// # Errors
/// - 400: invalid email, name, or password
/// - 409: email already registered
/// - 500: hashing or storage failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let name = is_valid_name(&form.name)?;
    is_valid_password(&form.password)?;

    let tokens = issuer.register(&name, &email, &form.password).await?;

    Ok(session_response(
        HttpResponse::Created(),
        tokens,
        "Registration successful",
    ))
}

/// POST /api/v1/login
///
/// # Errors
/// - 400: invalid email format
/// - 404: no user with that email
/// - 401: wrong password
pub async fn login(
    form: web::Json<LoginRequest>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let tokens = issuer.login(&email, &form.password).await?;

    Ok(session_response(HttpResponse::Ok(), tokens, "Login successful"))
}

/// POST /api/v1/refresh
///
/// Reads the refresh token from its cookie and, when it is still valid for
/// the user's current token version, answers with a fresh cookie pair. The
/// rotated-out refresh token is not blacklisted.
///
/// # Errors
/// - 401: cookie absent, signature invalid, expired, or version mismatch
/// - 400: structurally invalid token
/// - 404: user no longer exists
pub async fn refresh(
    req: HttpRequest,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .ok_or(AuthError::Unauthorized)?;

    let tokens = issuer.refresh(cookie.value()).await?;

    Ok(session_response(HttpResponse::Ok(), tokens, "Tokens refreshed"))
}

/// POST /api/v1/logout
///
/// Stateless: clears the two session cookies and changes nothing server
/// side. Outstanding tokens remain cryptographically valid until their own
/// expiry.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(expired_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(expired_cookie(REFRESH_TOKEN_COOKIE))
        .json(message("Logged out"))
}

/// POST /api/v1/change_password (protected)
///
/// # Errors
/// - 401: current password mismatch
/// - 400: new password equals the current one, or fails the policy
/// - 404: user no longer exists
pub async fn change_password(
    user: web::ReqData<CurrentUser>,
    form: web::Json<ChangePasswordRequest>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    is_valid_password(&form.new_password)?;

    issuer
        .change_password(user.id, &form.current_password, &form.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(message("Password updated")))
}

/// GET /api/v1/me (protected)
pub async fn me(
    user: web::ReqData<CurrentUser>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let record = store
        .find_by_id(user.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: record.id.to_string(),
        name: record.name,
        email: record.email,
        created_at: record.created_at.to_rfc3339(),
    }))
}
