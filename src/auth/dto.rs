use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for user registration. Fields are optional at the wire
/// level so a missing one becomes a 400 with a named field instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub role: String,
    pub message: &'static str,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_tolerates_absent_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email": "a@b.io"}"#).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.email.as_deref(), Some("a@b.io"));
        assert!(req.password.is_none());
        assert!(req.role.is_none());
    }

    #[test]
    fn responses_serialize_with_camel_case_keys() {
        let body = serde_json::to_value(RegisterResponse {
            user_id: Uuid::nil(),
            role: "user".into(),
            message: "User registered",
        })
        .unwrap();
        assert!(body.get("userId").is_some());
        assert!(body.get("user_id").is_none());

        let body = serde_json::to_value(LoginResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            role: "user".into(),
            message: "Login successful",
        })
        .unwrap();
        assert!(body.get("accessToken").is_some());
        assert!(body.get("refreshToken").is_some());
        assert_eq!(body["message"], "Login successful");
    }
}
