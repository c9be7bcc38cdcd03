use crate::api::{ensure_owner, is_partial};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::entities::post::{FEELING_MAX_LEN, LOCATION_MAX_LEN};
use crate::error::{AppResult, FieldErrors};
use crate::models::{CreatePostRequest, ListQuery, PostResponse, UpdatePostRequest};
use crate::repositories::{NewPost, PostChanges, PostRepository};
use crate::services::Representer;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use sea_orm::TransactionTrait;

fn validate_lengths(location: Option<&str>, feeling: Option<&str>) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(location) = location {
        if location.chars().count() > LOCATION_MAX_LEN {
            errors.add(
                "location",
                format!("Ensure this field has no more than {} characters.", LOCATION_MAX_LEN),
            );
        }
    }
    if let Some(feeling) = feeling {
        if feeling.chars().count() > FEELING_MAX_LEN {
            errors.add(
                "feeling",
                format!("Ensure this field has no more than {} characters.", FEELING_MAX_LEN),
            );
        }
    }
    errors.into_result()
}

#[utoipa::path(
    get,
    path = "/posts/",
    params(ListQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = Vec<PostResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn list_posts(
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let db = pool.get_ref();

    let posts = PostRepository::new(db).list(offset, limit).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).posts(posts).await?))
}

#[utoipa::path(
    post,
    path = "/posts/",
    request_body = CreatePostRequest,
    responses(
        (
            status = 201,
            description = "Post created; unknown media or user ids are ignored",
            body = PostResponse
        ),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn create_post(
    req: web::Json<CreatePostRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    validate_lengths(Some(&req.location), Some(&req.feeling))?;

    let db = pool.get_ref();
    let txn = db.begin().await.map_err(crate::error::AppError::from)?;
    let posts = PostRepository::new(&txn);

    let post = posts
        .create(
            user.user_id,
            NewPost {
                content: req.content,
                post_type: req.post_type,
                location: req.location,
                feeling: req.feeling,
            },
        )
        .await?;
    let media = posts.set_media(post.id, &req.media_ids).await?;
    let tagged = posts.set_tagged_people(post.id, &req.tagged_people_ids).await?;
    txn.commit().await.map_err(crate::error::AppError::from)?;

    log::info!(
        "User {} created post {} ({} media, {} tagged)",
        user.user_id,
        post.id,
        media.len(),
        tagged.len()
    );

    Ok(HttpResponse::Created().json(Representer::new(db).post(post).await?))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post detail", body = PostResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn get_post(
    path: web::Path<i64>,
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let post = PostRepository::new(db).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).post(post).await?))
}

#[utoipa::path(
    put,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (
            status = 200,
            description = "Post updated (also PATCH for partial updates)",
            body = PostResponse
        ),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn update_post(
    http_req: HttpRequest,
    path: web::Path<i64>,
    req: web::Json<UpdatePostRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    validate_lengths(req.location.as_deref(), req.feeling.as_deref())?;

    let db = pool.get_ref();
    let post = PostRepository::new(db).get(path.into_inner()).await?;
    ensure_owner(post.created_by_id, &user, "post")?;

    let changes = if is_partial(&http_req) {
        PostChanges {
            content: req.content,
            post_type: req.post_type,
            location: req.location,
            feeling: req.feeling,
        }
    } else {
        PostChanges {
            content: Some(req.content.unwrap_or_default()),
            post_type: Some(req.post_type.unwrap_or_default()),
            location: Some(req.location.unwrap_or_default()),
            feeling: Some(req.feeling.unwrap_or_default()),
        }
    };

    let txn = db.begin().await.map_err(crate::error::AppError::from)?;
    let posts = PostRepository::new(&txn);
    let post = posts.update(post, changes).await?;
    if let Some(media_ids) = &req.media_ids {
        posts.set_media(post.id, media_ids).await?;
    }
    if let Some(user_ids) = &req.tagged_people_ids {
        posts.set_tagged_people(post.id, user_ids).await?;
    }
    txn.commit().await.map_err(crate::error::AppError::from)?;

    Ok(HttpResponse::Ok().json(Representer::new(db).post(post).await?))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted with its likes and comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn delete_post(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let posts = PostRepository::new(pool.get_ref());
    let post = posts.get(path.into_inner()).await?;
    ensure_owner(post.created_by_id, &user, "post")?;
    posts.delete(post).await?;
    Ok(HttpResponse::NoContent().finish())
}
