use crate::entities::{profile, profile_follower};
use crate::error::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
    /// Target and follower are the same profile.
    Unchanged,
}

pub struct ProfileRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProfileRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<profile::Model>> {
        Ok(profile::Entity::find_by_id(id).one(self.db).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", id))
    }

    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Option<profile::Model>> {
        Ok(profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.db)
            .await?)
    }

    /// Profile of the requesting user; every social action needs one.
    pub async fn get_by_user(&self, user_id: i64) -> AppResult<profile::Model> {
        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found for this user".to_string()))
    }

    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<profile::Model>> {
        Ok(profile::Entity::find()
            .order_by_asc(profile::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    pub async fn create(&self, user_id: i64, bio: String) -> AppResult<profile::Model> {
        let model = profile::ActiveModel {
            user_id: Set(user_id),
            bio: Set(bio),
            avatar: Set(None),
            ..Default::default()
        };

        model.insert(self.db).await.map_err(|e| {
            if AppError::is_unique_violation(&e) {
                AppError::Validation("Profile already exists for this user".to_string())
            } else {
                e.into()
            }
        })
    }

    /// Applies the supplied changes; `None` leaves a field untouched.
    pub async fn update(
        &self,
        profile: profile::Model,
        bio: Option<String>,
        avatar: Option<String>,
    ) -> AppResult<profile::Model> {
        if bio.is_none() && avatar.is_none() {
            return Ok(profile);
        }

        let mut model = profile.into_active_model();
        if let Some(bio) = bio {
            model.bio = Set(bio);
        }
        if let Some(avatar) = avatar {
            model.avatar = Set(Some(avatar));
        }
        Ok(model.update(self.db).await?)
    }

    pub async fn delete(&self, profile: profile::Model) -> AppResult<()> {
        profile.delete(self.db).await?;
        Ok(())
    }

    /// Ids of the profiles following `profile_id`.
    pub async fn follower_ids(&self, profile_id: i64) -> AppResult<Vec<i64>> {
        let edges = profile_follower::Entity::find()
            .filter(profile_follower::Column::ProfileId.eq(profile_id))
            .order_by_asc(profile_follower::Column::FollowerId)
            .all(self.db)
            .await?;
        Ok(edges.into_iter().map(|edge| edge.follower_id).collect())
    }

    pub async fn count_followers(&self, profile_id: i64) -> AppResult<u64> {
        Ok(profile_follower::Entity::find()
            .filter(profile_follower::Column::ProfileId.eq(profile_id))
            .count(self.db)
            .await?)
    }

    pub async fn count_following(&self, profile_id: i64) -> AppResult<u64> {
        Ok(profile_follower::Entity::find()
            .filter(profile_follower::Column::FollowerId.eq(profile_id))
            .count(self.db)
            .await?)
    }

    /// Follows `target_id` as `follower_id`, or unfollows when the edge exists.
    ///
    /// Concurrent toggles of the same pair are last-writer-wins; a concurrent
    /// insert of the same edge counts as followed.
    pub async fn toggle_follow(
        &self,
        target_id: i64,
        follower_id: i64,
    ) -> AppResult<FollowOutcome> {
        if target_id == follower_id {
            return Ok(FollowOutcome::Unchanged);
        }

        let existing = profile_follower::Entity::find_by_id((target_id, follower_id))
            .one(self.db)
            .await?;

        if let Some(edge) = existing {
            edge.delete(self.db).await?;
            return Ok(FollowOutcome::Unfollowed);
        }

        let edge = profile_follower::ActiveModel {
            profile_id: Set(target_id),
            follower_id: Set(follower_id),
        };
        match profile_follower::Entity::insert(edge)
            .exec_without_returning(self.db)
            .await
        {
            Ok(_) => Ok(FollowOutcome::Followed),
            Err(e) if AppError::is_unique_violation(&e) => Ok(FollowOutcome::Followed),
            Err(e) => Err(e.into()),
        }
    }
}
