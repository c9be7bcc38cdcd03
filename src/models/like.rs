use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLikeRequest {
    pub post: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub id: i64,
    pub post: i64,
    pub liked_by: UserResponse,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
