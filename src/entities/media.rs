use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "gif")]
    Gif,
}

impl MediaType {
    /// Infers the media type from a MIME type such as `image/png`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("image/gif") {
            Some(MediaType::Gif)
        } else if content_type.starts_with("image/") {
            Some(MediaType::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "gif" => Some(MediaType::Gif),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file: String,
    pub media_type: MediaType,
    pub uploaded_at: DateTimeUtc,
    pub uploaded_by_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedById",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_media::Relation::Post.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_media::Relation::Media.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
