use crate::entities::post::PostType;
use crate::models::{MediaResponse, UserResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub post_type: PostType,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub feeling: String,
    #[serde(default)]
    pub media_ids: Vec<i64>,
    #[serde(default)]
    pub tagged_people_ids: Vec<i64>,
}

/// Body of `PUT`/`PATCH /posts/{id}/`. With PUT, omitted scalar fields fall
/// back to their defaults; with PATCH they are left alone. Attachment lists
/// replace the current sets only when supplied.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub post_type: Option<PostType>,
    pub location: Option<String>,
    pub feeling: Option<String>,
    pub media_ids: Option<Vec<i64>>,
    pub tagged_people_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub content: String,
    pub post_type: PostType,
    pub location: String,
    pub feeling: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: UserResponse,
    pub media: Vec<MediaResponse>,
    pub tagged_people: Vec<UserResponse>,
    pub likes_count: u64,
    pub comments_count: u64,
}
