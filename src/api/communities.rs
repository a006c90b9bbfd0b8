//! Community feed for the signed-in user

use axum::{Json, Router, extract::State, routing::get};

use crate::api::extract::AuthenticatedUser;
use crate::api::state::AppState;
use crate::error::ApiError;
use crate::models::CommunityPost;

const POSTS_LIMIT: usize = 20;

/// Newest posts from the forums the caller belongs to.
pub async fn list_posts(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<CommunityPost>>, ApiError> {
    state
        .store
        .posts_for_forums(&user.communities, POSTS_LIMIT)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to fetch community posts", e))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_posts))
}
