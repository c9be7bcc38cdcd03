use crate::entities::media::{self, MediaType};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

pub struct MediaRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MediaRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> AppResult<media::Model> {
        media::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Media", id))
    }

    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<media::Model>> {
        Ok(media::Entity::find()
            .order_by_asc(media::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    /// Stored file URLs of everything a user uploaded.
    pub async fn files_by_uploader(&self, user_id: i64) -> AppResult<Vec<String>> {
        Ok(media::Entity::find()
            .select_only()
            .column(media::Column::File)
            .filter(media::Column::UploadedById.eq(user_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    pub async fn create(
        &self,
        file: String,
        media_type: MediaType,
        uploaded_by: i64,
    ) -> AppResult<media::Model> {
        let model = media::ActiveModel {
            file: Set(file),
            media_type: Set(media_type),
            uploaded_at: Set(Utc::now()),
            uploaded_by_id: Set(uploaded_by),
            ..Default::default()
        };
        Ok(model.insert(self.db).await?)
    }

    pub async fn delete(&self, media: media::Model) -> AppResult<()> {
        media.delete(self.db).await?;
        Ok(())
    }
}
