use crate::api::{discard_blobs, ensure_owner};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::entities::media::{self, MediaType};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{ListQuery, MediaResponse, MediaUploadForm, MediaUploadSchema};
use crate::repositories::MediaRepository;
use crate::services::{StorageBackend, StoredFile};
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Result as ActixResult};
use sea_orm::TransactionTrait;

#[utoipa::path(
    get,
    path = "/media/",
    params(ListQuery),
    responses(
        (status = 200, description = "List of media", body = Vec<MediaResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "media"
)]
pub async fn list_media(
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let media: Vec<MediaResponse> = MediaRepository::new(pool.get_ref())
        .list(offset, limit)
        .await?
        .into_iter()
        .map(MediaResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(media))
}

#[utoipa::path(
    get,
    path = "/media/{id}/",
    params(("id" = i64, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media detail", body = MediaResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Media not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "media"
)]
pub async fn get_media(
    path: web::Path<i64>,
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let media = MediaRepository::new(pool.get_ref())
        .get(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MediaResponse::from(media)))
}

/// Resolves the type of every file before anything is written.
fn plan_batch(form: &MediaUploadForm) -> AppResult<Vec<(&TempFile, MediaType)>> {
    if form.files.is_empty() {
        return Err(AppError::Validation("No files were submitted".to_string()));
    }

    let mut errors = FieldErrors::new();

    let explicit = match &form.media_type {
        Some(value) => match MediaType::parse(value.as_str()) {
            Some(media_type) => Some(media_type),
            None => {
                errors.add(
                    "media_type",
                    format!("\"{}\" is not a valid choice.", value.as_str()),
                );
                None
            }
        },
        None => None,
    };

    let mut plan = Vec::with_capacity(form.files.len());
    for (index, file) in form.files.iter().enumerate() {
        let name = file
            .file_name
            .clone()
            .unwrap_or_else(|| format!("file {}", index + 1));

        if file.size == 0 {
            errors.add("files", format!("{}: the submitted file is empty.", name));
            continue;
        }

        let media_type = explicit.or_else(|| {
            file.content_type
                .as_ref()
                .and_then(|mime| MediaType::from_content_type(mime.essence_str()))
        });
        match media_type {
            Some(media_type) => plan.push((file, media_type)),
            None => errors.add("files", format!("{}: unsupported media type.", name)),
        }
    }

    errors.into_result()?;
    Ok(plan)
}

async fn persist_batch(
    db: &DbPool,
    storage: &dyn StorageBackend,
    plan: &[(&TempFile, MediaType)],
    stored: &mut Vec<StoredFile>,
    uploaded_by: i64,
) -> AppResult<Vec<media::Model>> {
    for (file, _) in plan {
        let blob = storage
            .store("posts_files", file.file_name.as_deref(), file.file.path())
            .await?;
        stored.push(blob);
    }

    let txn = db.begin().await?;
    let repo = MediaRepository::new(&txn);
    let mut created = Vec::with_capacity(plan.len());
    for ((_, media_type), blob) in plan.iter().zip(stored.iter()) {
        created.push(repo.create(blob.url.clone(), *media_type, uploaded_by).await?);
    }
    txn.commit().await?;

    Ok(created)
}

#[utoipa::path(
    post,
    path = "/media/",
    request_body(content = MediaUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "All files stored", body = Vec<MediaResponse>),
        (status = 400, description = "Empty batch or an empty/unsupported file; nothing stored"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "media"
)]
pub async fn upload_media(
    form: MultipartForm<MediaUploadForm>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn StorageBackend>,
) -> ActixResult<HttpResponse> {
    let form = form.into_inner();
    let plan = plan_batch(&form)?;

    let mut stored = Vec::new();
    let created = match persist_batch(
        pool.get_ref(),
        storage.get_ref(),
        &plan,
        &mut stored,
        user.user_id,
    )
    .await
    {
        Ok(created) => created,
        Err(e) => {
            // All-or-nothing: drop blobs written before the failure.
            for blob in &stored {
                if let Err(cleanup) = storage.delete(&blob.key).await {
                    log::warn!("Failed to remove orphaned upload {}: {}", blob.key, cleanup);
                }
            }
            return Err(e.into());
        }
    };

    log::info!("User {} uploaded {} media files", user.user_id, created.len());

    let response: Vec<MediaResponse> = created.into_iter().map(MediaResponse::from).collect();
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    delete,
    path = "/media/{id}/",
    params(("id" = i64, Path, description = "Media ID")),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the uploader"),
        (status = 404, description = "Media not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "media"
)]
pub async fn delete_media(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn StorageBackend>,
) -> ActixResult<HttpResponse> {
    let repo = MediaRepository::new(pool.get_ref());
    let media = repo.get(path.into_inner()).await?;
    ensure_owner(media.uploaded_by_id, &user, "media")?;

    let file = media.file.clone();
    repo.delete(media).await?;
    discard_blobs(storage.get_ref(), [file]).await;

    Ok(HttpResponse::NoContent().finish())
}
