use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub user: i64,
    pub bio: String,
    pub avatar: Option<String>,
    /// Ids of the profiles following this one.
    pub followers: Vec<i64>,
    pub followers_count: u64,
    pub following_count: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
}

/// Multipart variant of the profile update, used to replace the avatar.
#[derive(Debug, MultipartForm)]
pub struct ProfileUploadForm {
    pub bio: Option<Text<String>>,
    pub avatar: Option<TempFile>,
}
