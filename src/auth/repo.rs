use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;

/// Row in the "Users" table. The `password` column always holds an argon2
/// digest; raw input never reaches the store.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub role: String,
    pub refresh_token: Option<String>,
    #[sqlx(rename = "createdAt")]
    pub created_at: OffsetDateTime,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: OffsetDateTime,
}

/// Insert payload. `password_hash` is already hashed by the caller.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// What an insert hands back: the assigned id and the stored role.
#[derive(Debug, Clone, FromRow)]
pub struct CreatedUser {
    pub id: Uuid,
    pub role: String,
}

/// Credential store seam. The auth service only sees this trait; Postgres
/// lives below it and tests wire an in-memory double instead.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Fails with `EmailInUse` when the email is already registered. The
    /// unique constraint arbitrates races, so two concurrent inserts for
    /// one email cannot both succeed.
    async fn insert(&self, new: NewUser<'_>) -> Result<CreatedUser, AuthError>;

    /// Overwrites the user's stored refresh token and bumps "updatedAt".
    async fn update_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, refresh_token, "createdAt", "updatedAt"
            FROM "Users"
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser<'_>) -> Result<CreatedUser, AuthError> {
        let created = sqlx::query_as::<_, CreatedUser>(
            r#"
            INSERT INTO "Users" (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, role
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailInUse;
                }
            }
            AuthError::from(e)
        })?;
        Ok(created)
    }

    async fn update_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE "Users"
            SET refresh_token = $1, "updatedAt" = now()
            WHERE id = $2
            "#,
        )
        .bind(token)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-memory store mirroring the Postgres semantics, unique-email
    /// arbitration included.
    #[derive(Default)]
    pub(crate) struct MemoryUserStore {
        rows: Mutex<Vec<User>>,
    }

    impl MemoryUserStore {
        pub(crate) fn get(&self, email: &str) -> Option<User> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned()
        }

        pub(crate) fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            Ok(self.get(email))
        }

        async fn insert(&self, new: NewUser<'_>) -> Result<CreatedUser, AuthError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|u| u.email == new.email) {
                return Err(AuthError::EmailInUse);
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: Uuid::new_v4(),
                name: new.name.to_string(),
                email: new.email.to_string(),
                password_hash: new.password_hash.to_string(),
                role: new.role.to_string(),
                refresh_token: None,
                created_at: now,
                updated_at: now,
            };
            let created = CreatedUser {
                id: user.id,
                role: user.role.clone(),
            };
            rows.push(user);
            Ok(created)
        }

        async fn update_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(user) = rows.iter_mut().find(|u| u.id == user_id) {
                user.refresh_token = Some(token.to_string());
                user.updated_at = OffsetDateTime::now_utc();
            }
            Ok(())
        }
    }
}
