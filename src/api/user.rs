use crate::api::{discard_blobs, ensure_owner};
use crate::auth::{hash_password, AuthenticatedUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, FieldErrors};
use crate::models::{CreateUserRequest, ListQuery, UserResponse};
use crate::repositories::{
    create_account, MediaRepository, NewUser, ProfileRepository, UserRepository,
};
use crate::services::{Representer, StorageBackend};
use actix_web::{web, HttpResponse, Result as ActixResult};

#[utoipa::path(
    get,
    path = "/users/",
    params(ListQuery),
    responses(
        (status = 200, description = "List of users with their profiles", body = Vec<UserResponse>)
    ),
    tag = "users"
)]
pub async fn list_users(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let db = pool.get_ref();

    let users = UserRepository::new(db).list(offset, limit).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).users(users).await?))
}

#[utoipa::path(
    post,
    path = "/users/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created with an empty profile", body = UserResponse),
        (status = 400, description = "Missing fields or username taken")
    ),
    tag = "users"
)]
pub async fn create_user(
    req: web::Json<CreateUserRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    let mut errors = FieldErrors::new();
    if req.username.trim().is_empty() {
        errors.add("username", "This field may not be blank.");
    }
    if req.password.is_empty() {
        errors.add("password", "This field may not be blank.");
    }
    errors.into_result()?;

    let password_hash =
        hash_password(&req.password, config.auth.bcrypt_cost).map_err(AppError::from)?;

    let db = pool.get_ref();
    let (user, _) = create_account(
        db,
        NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(Representer::new(db).user(user).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(path: web::Path<i64>, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let response = Representer::new(db).user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deleted along with everything it owns"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Cannot delete another user"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn delete_user(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn StorageBackend>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let users = UserRepository::new(db);
    let target = users.get(path.into_inner()).await?;
    ensure_owner(target.id, &user, "user")?;

    // Collected up front: the cascade removes the rows that reference the blobs.
    let mut files = MediaRepository::new(db).files_by_uploader(target.id).await?;
    if let Some(avatar) = ProfileRepository::new(db)
        .find_by_user(target.id)
        .await?
        .and_then(|profile| profile.avatar)
    {
        files.push(avatar);
    }

    users.delete(target.id).await?;
    log::info!("Deleted account {} ({})", target.username, target.id);
    discard_blobs(storage.get_ref(), files).await;

    Ok(HttpResponse::NoContent().finish())
}
