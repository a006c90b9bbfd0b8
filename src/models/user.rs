use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Forum id every account belongs to.
pub const DEFAULT_COMMUNITY: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Moderator,
    Admin,
    Analyst,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::Analyst => "analyst",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    /// Forum ids, see [`crate::community::enrollment`]
    pub communities: Vec<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub headline: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh account with default roles; `communities` falls back to the global forum.
    pub fn new(
        email: String,
        username: String,
        password_hash: String,
        communities: Vec<String>,
        name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let communities = if communities.is_empty() {
            vec![DEFAULT_COMMUNITY.to_string()]
        } else {
            communities
        };

        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            roles: vec![Role::Member],
            communities,
            name,
            bio: None,
            avatar_url: None,
            headline: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            username: self.username.clone(),
            communities: self.communities.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public view of a [`User`] returned by the auth and session endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
    pub communities: Vec<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(
            "jane@example.com".into(),
            "jane".into(),
            "hash".into(),
            Vec::new(),
            None,
        );
        assert_eq!(user.roles, vec![Role::Member]);
        assert_eq!(user.communities, vec!["global".to_string()]);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "jane@example.com".into(),
            "jane".into(),
            "$argon2id$secret".into(),
            vec!["global".into()],
            Some("Jane".into()),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
    }
}
