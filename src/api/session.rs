//! Current session

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::api::extract::AuthenticatedUser;
use crate::api::state::AppState;
use crate::community::{ProviderId, RawSession, Session, membership_for_forum, normalize_session};
use crate::models::{User, UserProfile};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub session: Session,
}

/// Canonical session for a stored account signed in with email.
pub fn session_for_user(user: &User) -> Session {
    let raw = RawSession {
        name: user.name.clone().unwrap_or_default(),
        email: Some(user.email.clone()),
        provider: ProviderId::Email,
        communities: user
            .communities
            .iter()
            .map(|forum| membership_for_forum(forum))
            .collect(),
    };
    normalize_session(&raw, None)
}

pub async fn get_session(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: session_for_user(&user),
        user: user.profile(),
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(get_session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_merges_stored_and_derived_forums() {
        let user = User::new(
            "ana@alumni.unav.es".to_string(),
            "ana".to_string(),
            "hash".to_string(),
            vec!["global".to_string(), "regional".to_string()],
            None,
        );
        let session = session_for_user(&user);

        assert_eq!(session.name, "Ana");
        assert_eq!(session.provider, ProviderId::Email);
        let ids: Vec<_> = session.communities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["fg-global", "fg-emea", "fg-uni-navarra", "global", "regional"]);
        assert_eq!(session.communities[4].label, "Regional Community");
    }
}
