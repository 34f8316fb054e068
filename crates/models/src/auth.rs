use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Credentials submitted to `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload returned by a successful login. `club_id` is only present for
/// faculty accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_student_login_response() {
        let body = r#"{
            "token": "eyJhbGciOi...",
            "role": "STUDENT",
            "userId": 7,
            "firstName": "Asha",
            "email": "asha@gmail.com"
        }"#;
        let auth: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(auth.role, Role::Student);
        assert_eq!(auth.user_id, 7);
        assert!(auth.club_id.is_none());
    }

    #[test]
    fn decodes_faculty_login_response_with_club() {
        let body = r#"{"token":"t","role":"FACULTY","userId":3,"clubId":"C01","firstName":"Ravi"}"#;
        let auth: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(auth.club_id.as_deref(), Some("C01"));
    }
}
