use crate::entities::{profile, user};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::repositories::ProfileRepository;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

pub struct UserRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(self.db).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await?)
    }

    pub async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<user::Model>> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await?)
    }

    /// Inserts the user; a taken username is reported against the `username` field.
    pub async fn create(&self, new_user: NewUser) -> AppResult<user::Model> {
        if self.find_by_username(&new_user.username).await?.is_some() {
            return Err(duplicate_username());
        }

        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(self.db).await.map_err(|e| {
            if AppError::is_unique_violation(&e) {
                duplicate_username()
            } else {
                e.into()
            }
        })
    }

    /// Removes the user; profile, media, posts, likes and comments go with it.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = user::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("User", id));
        }
        Ok(())
    }
}

fn duplicate_username() -> AppError {
    let mut errors = FieldErrors::new();
    errors.add("username", "A user with that username already exists.");
    AppError::InvalidFields(errors)
}

/// Creates a user together with its empty profile, or neither.
pub async fn create_account(
    db: &DatabaseConnection,
    new_user: NewUser,
) -> AppResult<(user::Model, profile::Model)> {
    let txn = db.begin().await?;

    let user = UserRepository::new(&txn).create(new_user).await?;
    let profile = ProfileRepository::new(&txn).create(user.id, String::new()).await?;

    txn.commit().await?;

    log::info!("Created account {} ({})", user.username, user.id);
    Ok((user, profile))
}
