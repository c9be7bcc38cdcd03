use crate::entities::media::{self, MediaType};
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponse {
    pub id: i64,
    pub file: String,
    pub media_type: MediaType,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub uploaded_by: i64,
}

impl From<media::Model> for MediaResponse {
    fn from(media: media::Model) -> Self {
        MediaResponse {
            id: media.id,
            file: media.file,
            media_type: media.media_type,
            uploaded_at: media.uploaded_at,
            uploaded_by: media.uploaded_by_id,
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct MediaUploadForm {
    pub files: Vec<TempFile>,
    /// Applied to every file in the batch; inferred per file when absent.
    pub media_type: Option<Text<String>>,
}

/// OpenAPI description of the multipart upload body.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct MediaUploadSchema {
    /// One or more binary parts named `files`.
    files: Vec<String>,
    /// `image`, `video` or `gif`.
    media_type: Option<String>,
}
