use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{NewUser, UserStore};
use crate::config::DEFAULT_ROLE;
use crate::error::AuthError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AuthError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingField(field))
}

// Passwords keep their whitespace; trimming would silently change the
// credential.
fn required_password(value: Option<String>) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingField("password"))
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub role: String,
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
}

/// Orchestrates the credential flows. Holds no state of its own; all
/// durable data lives behind the store.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisteredUser, AuthError> {
        let name = required(req.name, "name")?;
        let email = required(req.email, "email")?.to_lowercase();
        let password = required_password(req.password)?;

        if !is_valid_email(&email) {
            warn!("registration with malformed email");
            return Err(AuthError::InvalidEmail);
        }

        // Friendly pre-check; the unique constraint still decides races.
        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "registration for an email already in use");
            return Err(AuthError::EmailInUse);
        }

        let role = req
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let password_hash = hash_password(&password)?;
        let created = self
            .users
            .insert(NewUser {
                name: &name,
                email: &email,
                password_hash: &password_hash,
                role: &role,
            })
            .await?;

        info!(user_id = %created.id, role = %created.role, "user registered");
        Ok(RegisteredUser {
            id: created.id,
            role: created.role,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<IssuedTokens, AuthError> {
        let email = required(req.email, "email")?.to_lowercase();
        let password = required_password(req.password)?;

        // Unknown email and wrong password fall out identically, so a
        // caller cannot probe which addresses are registered.
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("login for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(&password, &user.password_hash)? {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.keys.sign_access(user.id, &user.email, &user.role)?;
        let refresh_token = self.keys.sign_refresh(user.id)?;
        self.users.update_refresh_token(user.id, &refresh_token).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(IssuedTokens {
            access_token,
            refresh_token,
            role: user.role,
        })
    }
}
