use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, error::AuthError};

/// Claims carried by an access token. Wire names stay as existing API
/// clients expect them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Claims carried by a refresh token: identity only, nothing a client
/// could present as proof of role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing and verification keys plus the two token lifetimes. One shared
/// secret signs both token kinds.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            access_ttl: Duration::from_secs((cfg.access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_days as u64) * 24 * 3600),
        }
    }

    fn timestamps(&self, ttl: Duration) -> (usize, usize) {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        (
            now.unix_timestamp() as usize,
            exp.unix_timestamp() as usize,
        )
    }

    pub fn sign_access(&self, user_id: Uuid, email: &str, role: &str) -> Result<String, AuthError> {
        let (iat, exp) = self.timestamps(self.access_ttl);
        let claims = AccessClaims {
            user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat,
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        debug!(user_id = %user_id, "access token signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        let (iat, exp) = self.timestamps(self.refresh_ttl);
        let claims = RefreshClaims { user_id, iat, exp };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    /// Verification half of the token contract. No route consumes these
    /// yet; the session-refresh flow will.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::default())
            .map_err(map_jwt_error)?;
        debug!(user_id = %data.claims.user_id, "access token verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let data = decode::<RefreshClaims>(token, &self.decoding, &Validation::default())
            .map_err(map_jwt_error)?;
        debug!(user_id = %data.claims.user_id, "refresh token verified");
        Ok(data.claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidToken,
    }
}
