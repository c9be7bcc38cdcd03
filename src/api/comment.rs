use crate::api::like::require_post;
use crate::api::{ensure_owner, is_partial};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{CommentResponse, CreateCommentRequest, ListQuery, UpdateCommentRequest};
use crate::repositories::CommentRepository;
use crate::services::Representer;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};

fn non_blank(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("content", "This field may not be blank.");
        return Err(AppError::InvalidFields(errors));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/comments/",
    params(ListQuery),
    responses(
        (status = 200, description = "List of comments", body = Vec<CommentResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "comments"
)]
pub async fn list_comments(
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let db = pool.get_ref();

    let comments = CommentRepository::new(db).list(offset, limit).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).comments(comments).await?))
}

#[utoipa::path(
    post,
    path = "/comments/",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Blank content or unknown post"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "comments"
)]
pub async fn create_comment(
    req: web::Json<CreateCommentRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    non_blank(&req.content)?;

    let db = pool.get_ref();
    require_post(db, req.post).await?;

    let comment = CommentRepository::new(db)
        .create(req.post, user.user_id, req.content)
        .await?;
    log::info!("User {} commented on post {}", user.user_id, comment.post_id);

    Ok(HttpResponse::Created().json(Representer::new(db).comment(comment).await?))
}

#[utoipa::path(
    get,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment detail", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "comments"
)]
pub async fn get_comment(
    path: web::Path<i64>,
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let comment = CommentRepository::new(db).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).comment(comment).await?))
}

#[utoipa::path(
    put,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (
            status = 200,
            description = "Comment updated (also PATCH); the post cannot change",
            body = CommentResponse
        ),
        (status = 400, description = "Blank or missing content"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "comments"
)]
pub async fn update_comment(
    http_req: HttpRequest,
    path: web::Path<i64>,
    req: web::Json<UpdateCommentRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let content = match (req.into_inner().content, is_partial(&http_req)) {
        (Some(content), _) => {
            non_blank(&content)?;
            Some(content)
        }
        (None, true) => None,
        (None, false) => {
            let mut errors = FieldErrors::new();
            errors.add("content", "This field is required.");
            return Err(AppError::InvalidFields(errors).into());
        }
    };

    let db = pool.get_ref();
    let comments = CommentRepository::new(db);
    let comment = comments.get(path.into_inner()).await?;
    ensure_owner(comment.commented_by_id, &user, "comment")?;

    let comment = match content {
        Some(content) => comments.update_content(comment, content).await?,
        None => comment,
    };
    Ok(HttpResponse::Ok().json(Representer::new(db).comment(comment).await?))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let comments = CommentRepository::new(pool.get_ref());
    let comment = comments.get(path.into_inner()).await?;
    ensure_owner(comment.commented_by_id, &user, "comment")?;
    comments.delete(comment).await?;
    Ok(HttpResponse::NoContent().finish())
}
