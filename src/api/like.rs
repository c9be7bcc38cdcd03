use crate::api::ensure_owner;
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateLikeRequest, LikeResponse, ListQuery};
use crate::repositories::{LikeRepository, PostRepository};
use crate::services::Representer;
use actix_web::{web, HttpResponse, Result as ActixResult};

/// A related post given by id must exist; otherwise the `post` field is invalid.
///
/// The repositories report the same error if the post disappears before the insert.
pub(crate) async fn require_post(db: &DbPool, post_id: i64) -> AppResult<()> {
    if PostRepository::new(db).find_by_id(post_id).await?.is_none() {
        return Err(AppError::invalid_pk("post", post_id));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/likes/",
    params(ListQuery),
    responses(
        (status = 200, description = "List of likes", body = Vec<LikeResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "likes"
)]
pub async fn list_likes(
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let db = pool.get_ref();

    let likes = LikeRepository::new(db).list(offset, limit).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).likes(likes).await?))
}

#[utoipa::path(
    post,
    path = "/likes/",
    request_body = CreateLikeRequest,
    responses(
        (status = 201, description = "Like recorded for the requesting user", body = LikeResponse),
        (status = 400, description = "Already liked, or the post does not exist"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "likes"
)]
pub async fn create_like(
    req: web::Json<CreateLikeRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    require_post(db, req.post).await?;

    let like = LikeRepository::new(db).create(req.post, user.user_id).await?;
    log::info!("User {} liked post {}", user.user_id, like.post_id);

    Ok(HttpResponse::Created().json(Representer::new(db).like(like).await?))
}

#[utoipa::path(
    get,
    path = "/likes/{id}/",
    params(("id" = i64, Path, description = "Like ID")),
    responses(
        (status = 200, description = "Like detail", body = LikeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Like not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "likes"
)]
pub async fn get_like(
    path: web::Path<i64>,
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let like = LikeRepository::new(db).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).like(like).await?))
}

#[utoipa::path(
    delete,
    path = "/likes/{id}/",
    params(("id" = i64, Path, description = "Like ID")),
    responses(
        (status = 204, description = "Like removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your like"),
        (status = 404, description = "Like not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "likes"
)]
pub async fn delete_like(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let likes = LikeRepository::new(pool.get_ref());
    let like = likes.get(path.into_inner()).await?;
    ensure_owner(like.liked_by_id, &user, "like")?;
    likes.delete(like).await?;
    Ok(HttpResponse::NoContent().finish())
}
