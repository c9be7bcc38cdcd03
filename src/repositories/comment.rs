use crate::entities::comment;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder,
    QuerySelect, Set,
};

pub struct CommentRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CommentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> AppResult<comment::Model> {
        comment::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", id))
    }

    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<comment::Model>> {
        Ok(comment::Entity::find()
            .order_by_asc(comment::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    pub async fn create(
        &self,
        post_id: i64,
        commented_by: i64,
        content: String,
    ) -> AppResult<comment::Model> {
        let model = comment::ActiveModel {
            post_id: Set(post_id),
            content: Set(content),
            commented_by_id: Set(commented_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(self.db).await.map_err(|e| {
            if AppError::is_foreign_key_violation(&e) {
                AppError::invalid_pk("post", post_id)
            } else {
                e.into()
            }
        })
    }

    pub async fn update_content(
        &self,
        comment: comment::Model,
        content: String,
    ) -> AppResult<comment::Model> {
        let mut model = comment.into_active_model();
        model.content = Set(content);
        Ok(model.update(self.db).await?)
    }

    pub async fn delete(&self, comment: comment::Model) -> AppResult<()> {
        comment.delete(self.db).await?;
        Ok(())
    }
}
