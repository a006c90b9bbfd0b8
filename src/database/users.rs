//! User Repository - PostgreSQL operations for accounts using sqlx

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Role, User};

const USER_COLUMNS: &str = "id, email, username, password_hash, roles, communities, name, bio, \
                            avatar_url, headline, last_login_at, created_at, updated_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let roles: Vec<&str> = user.roles.iter().map(Role::as_str).collect();

        sqlx::query(
            r#"
            INSERT INTO accounts.users
            (id, email, username, password_hash, roles, communities, name, bio,
             avatar_url, headline, last_login_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&roles)
        .bind(&user.communities)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(&user.headline)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user.id, "User inserted");
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts.users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts.users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE accounts.users SET last_login_at = $2, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let roles: Vec<String> = row.get("roles");
    let roles = roles
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::Serialization)?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        roles,
        communities: row.get("communities"),
        name: row.get("name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        headline: row.get("headline"),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
