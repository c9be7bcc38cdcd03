use crate::models::ProfileResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /register/`. Fields are optional so a missing username or
/// password is reported with a single message instead of a parse error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub success: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile: Option<ProfileResponse>,
}
