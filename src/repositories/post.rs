use crate::entities::post::{self, PostType};
use crate::entities::{comment, like, media, post_media, post_tagged_user, user};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, JoinType,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

pub struct NewPost {
    pub content: String,
    pub post_type: PostType,
    pub location: String,
    pub feeling: String,
}

/// Editable post fields. `None` leaves the stored value as it is.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub content: Option<String>,
    pub post_type: Option<PostType>,
    pub location: Option<String>,
    pub feeling: Option<String>,
}

impl PostChanges {
    fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.post_type.is_none()
            && self.location.is_none()
            && self.feeling.is_none()
    }
}

pub struct PostRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PostRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        Ok(post::Entity::find_by_id(id).one(self.db).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post", id))
    }

    /// Newest first.
    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<post::Model>> {
        Ok(post::Entity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    pub async fn create(&self, author_id: i64, new_post: NewPost) -> AppResult<post::Model> {
        let model = post::ActiveModel {
            content: Set(new_post.content),
            post_type: Set(new_post.post_type),
            location: Set(new_post.location),
            feeling: Set(new_post.feeling),
            created_at: Set(Utc::now()),
            created_by_id: Set(author_id),
            ..Default::default()
        };
        Ok(model.insert(self.db).await?)
    }

    /// Author and creation time are never touched.
    pub async fn update(&self, post: post::Model, changes: PostChanges) -> AppResult<post::Model> {
        if changes.is_empty() {
            return Ok(post);
        }

        let mut model = post.into_active_model();
        if let Some(content) = changes.content {
            model.content = Set(content);
        }
        if let Some(post_type) = changes.post_type {
            model.post_type = Set(post_type);
        }
        if let Some(location) = changes.location {
            model.location = Set(location);
        }
        if let Some(feeling) = changes.feeling {
            model.feeling = Set(feeling);
        }
        Ok(model.update(self.db).await?)
    }

    pub async fn delete(&self, post: post::Model) -> AppResult<()> {
        post.delete(self.db).await?;
        Ok(())
    }

    /// Replaces the attached media with the ids that exist; unknown ids are dropped.
    pub async fn set_media(&self, post_id: i64, media_ids: &[i64]) -> AppResult<Vec<i64>> {
        post_media::Entity::delete_many()
            .filter(post_media::Column::PostId.eq(post_id))
            .exec(self.db)
            .await?;

        if media_ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i64> = media::Entity::find()
            .filter(media::Column::Id.is_in(media_ids.iter().copied()))
            .order_by_asc(media::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(|media| media.id)
            .collect();

        if !found.is_empty() {
            post_media::Entity::insert_many(found.iter().map(|&media_id| {
                post_media::ActiveModel {
                    post_id: Set(post_id),
                    media_id: Set(media_id),
                }
            }))
            .exec_without_returning(self.db)
            .await?;
        }

        Ok(found)
    }

    /// Replaces the tagged users with the ids that exist; unknown ids are dropped.
    pub async fn set_tagged_people(&self, post_id: i64, user_ids: &[i64]) -> AppResult<Vec<i64>> {
        post_tagged_user::Entity::delete_many()
            .filter(post_tagged_user::Column::PostId.eq(post_id))
            .exec(self.db)
            .await?;

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i64> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids.iter().copied()))
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();

        if !found.is_empty() {
            post_tagged_user::Entity::insert_many(found.iter().map(|&user_id| {
                post_tagged_user::ActiveModel {
                    post_id: Set(post_id),
                    user_id: Set(user_id),
                }
            }))
            .exec_without_returning(self.db)
            .await?;
        }

        Ok(found)
    }

    pub async fn media(&self, post: &post::Model) -> AppResult<Vec<media::Model>> {
        Ok(post
            .find_related(media::Entity)
            .order_by_asc(media::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn tagged_people(&self, post_id: i64) -> AppResult<Vec<user::Model>> {
        Ok(user::Entity::find()
            .join(
                JoinType::InnerJoin,
                post_tagged_user::Relation::User.def().rev(),
            )
            .filter(post_tagged_user::Column::PostId.eq(post_id))
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn count_likes(&self, post_id: i64) -> AppResult<u64> {
        Ok(like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(self.db)
            .await?)
    }

    pub async fn count_comments(&self, post_id: i64) -> AppResult<u64> {
        Ok(comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(self.db)
            .await?)
    }
}
