use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub post: i64,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub post: i64,
    pub content: String,
    pub commented_by: UserResponse,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
