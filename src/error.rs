use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Everything the credential flows can fail with. Each variant maps onto
/// exactly one HTTP status, and server-side variants never leak their
/// cause to the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("credential store failure: {0}")]
    Store(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AuthError::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingField(_) | AuthError::InvalidEmail | AuthError::EmailInUse => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::Expired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Store(e) => tracing::error!(error = %e, "credential store failure"),
            AuthError::Internal(msg) => tracing::error!(error = %msg, "internal failure"),
            _ => {}
        }
        let body = ErrorBody {
            message: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AuthError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn statuses_match_the_contract() {
        assert_eq!(
            AuthError::MissingField("email").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailInUse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn missing_field_names_the_field() {
        let body = body_json(AuthError::MissingField("name")).await;
        assert_eq!(body["message"], "name is required");
    }

    #[tokio::test]
    async fn server_side_failures_stay_generic() {
        let body = body_json(AuthError::internal("argon2 exploded")).await;
        assert_eq!(body["message"], "Internal server error");

        let body = body_json(AuthError::Store(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
