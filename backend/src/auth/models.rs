use serde::{Deserialize, Serialize};
use shared::Role;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String, // User ID
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Identity attached to a request once its token has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl AuthResponse {
    pub fn new(token: String, role: Role) -> Self {
        Self {
            success: true,
            token,
            role,
            redirect_url: None,
        }
    }
}
