use crate::entities::blacklisted_token;
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistOutcome {
    Added,
    AlreadyBlacklisted,
}

pub struct TokenBlacklistRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TokenBlacklistRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn is_blacklisted(&self, jti: &str) -> AppResult<bool> {
        Ok(blacklisted_token::Entity::find()
            .filter(blacklisted_token::Column::Jti.eq(jti))
            .one(self.db)
            .await?
            .is_some())
    }

    pub async fn blacklist(
        &self,
        jti: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<BlacklistOutcome> {
        let model = blacklisted_token::ActiveModel {
            jti: Set(jti.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            blacklisted_at: Set(Utc::now()),
            ..Default::default()
        };

        match model.insert(self.db).await {
            Ok(_) => Ok(BlacklistOutcome::Added),
            Err(e) if crate::error::AppError::is_unique_violation(&e) => {
                Ok(BlacklistOutcome::AlreadyBlacklisted)
            }
            Err(e) => Err(e.into()),
        }
    }
}
