use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    #[sea_orm(string_value = "status")]
    Status,
    #[sea_orm(string_value = "photo")]
    Photo,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "location")]
    Location,
    #[sea_orm(string_value = "gif")]
    Gif,
    #[sea_orm(string_value = "live_event")]
    LiveEvent,
    #[sea_orm(string_value = "feeling")]
    Feeling,
    #[sea_orm(string_value = "tagged")]
    Tagged,
}

pub const LOCATION_MAX_LEN: usize = 255;
pub const FEELING_MAX_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub post_type: PostType,
    #[sea_orm(column_type = "String(Some(255))")]
    pub location: String,
    #[sea_orm(column_type = "String(Some(50))")]
    pub feeling: String,
    pub created_at: DateTimeUtc,
    pub created_by_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_media::Relation::Media.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_media::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
