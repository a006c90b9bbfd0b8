//! Bearer-token extractor

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

use crate::api::state::AppState;
use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::models::User;

/// The account behind a valid `Authorization: Bearer` token.
///
/// Rejects with 401 when the header is missing, the token does not verify,
/// or the account it names no longer exists.
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            warn!(path = %parts.uri.path(), error = %e, "Rejected bearer token");
            ApiError::Unauthorized
        })?;
        let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;

        match state.store.find_user_by_id(user_id).await {
            Ok(Some(user)) => Ok(AuthenticatedUser(user)),
            Ok(None) => {
                warn!(user_id = %user_id, "Token for unknown user");
                Err(ApiError::Unauthorized)
            }
            Err(e) => Err(ApiError::internal("Internal server error", e)),
        }
    }
}
