use crate::entities::like;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, QuerySelect, Set,
};

pub struct LikeRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> LikeRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> AppResult<like::Model> {
        like::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Like", id))
    }

    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<like::Model>> {
        Ok(like::Entity::find()
            .order_by_asc(like::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    /// Inserts the like unless the user already liked the post.
    ///
    /// The check is the unique index on `(post_id, liked_by_id)`, so two
    /// concurrent identical requests cannot both succeed. A post deleted
    /// after the caller looked it up fails the foreign key instead.
    pub async fn create(&self, post_id: i64, liked_by: i64) -> AppResult<like::Model> {
        let model = like::ActiveModel {
            post_id: Set(post_id),
            liked_by_id: Set(liked_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(self.db).await.map_err(|e| {
            if AppError::is_unique_violation(&e) {
                AppError::Conflict("Already liked".to_string())
            } else if AppError::is_foreign_key_violation(&e) {
                AppError::invalid_pk("post", post_id)
            } else {
                e.into()
            }
        })
    }

    pub async fn delete(&self, like: like::Model) -> AppResult<()> {
        like.delete(self.db).await?;
        Ok(())
    }
}
