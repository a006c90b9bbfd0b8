//! Account endpoints
//!
//! Endpoints:
//!   POST /auth/register -> create an account, returns a token
//!   POST /auth/login    -> exchange credentials for a token

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::auth::{AuthError, hash_password, verify_password};
use crate::community::starting_communities;
use crate::error::{ApiError, StoreError};
use crate::models::{User, UserProfile};

const MISSING_CREDENTIALS: &str = "Missing email or password";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input after validation.
#[derive(Debug, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Login input after validation.
#[derive(Debug, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Non-empty local part and domain around a single `@`.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn required(field: Option<String>) -> Result<String, ApiError> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(MISSING_CREDENTIALS.to_string()))
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ApiError> {
        let email = normalize_email(&required(self.email)?);
        let password = required(self.password)?;
        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }
        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Registration {
            email,
            password,
            name,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        Ok(Credentials {
            email: normalize_email(&required(self.email)?),
            password: required(self.password)?,
        })
    }
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::Validation("Invalid request body".to_string())
        }
    })
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

fn issue_response(state: &AppState, user: &User, context: &str) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| ApiError::internal(context, e))?;
    Ok(AuthResponse {
        token,
        user: user.profile(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    const FAILED: &str = "Failed to register";

    let registration = parse_body(payload)?.validate()?;

    let existing = state
        .store
        .find_user_by_email(&registration.email)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_blocking(registration.password)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    let username = registration
        .email
        .split_once('@')
        .map(|(local, _)| local.to_string())
        .unwrap_or_default();
    let communities = starting_communities(&registration.email);
    let user = User::new(
        registration.email,
        username,
        password_hash,
        communities,
        registration.name,
    );

    match state.store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Conflict(detail)) => {
            warn!(detail = %detail, "Registration conflict");
            return Err(ApiError::Conflict("Account already exists".to_string()));
        }
        Err(e) => return Err(ApiError::internal(FAILED, e)),
    }

    info!(user_id = %user.id, communities = ?user.communities, "User registered");
    issue_response(&state, &user, FAILED).map(Json)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    const FAILED: &str = "Failed to login";

    let credentials = parse_body(payload)?.validate()?;

    let Some(user) = state
        .store
        .find_user_by_email(&credentials.email)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
    else {
        return Err(ApiError::InvalidCredentials);
    };

    let valid = verify_blocking(credentials.password, user.password_hash.clone())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    if !valid {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    state
        .store
        .record_login(user.id, Utc::now())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    info!(user_id = %user.id, "User logged in");
    issue_response(&state, &user, FAILED).map(Json)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
