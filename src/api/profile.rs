use crate::api::{discard_blobs, ensure_owner, is_partial};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::entities::profile;
use crate::error::{AppResult, FieldErrors};
use crate::models::{
    CreateProfileRequest, ListQuery, ProfileResponse, ProfileUploadForm, UpdateProfileRequest,
};
use crate::repositories::{FollowOutcome, ProfileRepository};
use crate::services::{Representer, StorageBackend};
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};

#[utoipa::path(
    get,
    path = "/profiles/",
    params(ListQuery),
    responses(
        (status = 200, description = "List of profiles", body = Vec<ProfileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn list_profiles(
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let (offset, limit) = query.window();
    let db = pool.get_ref();

    let profiles = ProfileRepository::new(db).list(offset, limit).await?;
    let responses = Representer::new(db).profiles(profiles).await?;

    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    post,
    path = "/profiles/",
    request_body = CreateProfileRequest,
    responses(
        (
            status = 201,
            description = "Profile created for the requesting user",
            body = ProfileResponse
        ),
        (status = 400, description = "The user already has a profile"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn create_profile(
    req: web::Json<CreateProfileRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let profile = ProfileRepository::new(db)
        .create(user.user_id, req.into_inner().bio)
        .await?;

    log::info!("Created profile {} for user {}", profile.id, user.user_id);
    Ok(HttpResponse::Created().json(Representer::new(db).profile(profile).await?))
}

#[utoipa::path(
    get,
    path = "/profiles/{id}/",
    params(("id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile detail", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    path: web::Path<i64>,
    _user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let profile = ProfileRepository::new(db).get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).profile(profile).await?))
}

async fn owned_profile(
    db: &DbPool,
    profile_id: i64,
    user: &AuthenticatedUser,
) -> AppResult<profile::Model> {
    let profile = ProfileRepository::new(db).get(profile_id).await?;
    ensure_owner(profile.user_id, user, "profile")?;
    Ok(profile)
}

#[utoipa::path(
    put,
    path = "/profiles/{id}/",
    params(("id" = i64, Path, description = "Profile ID")),
    request_body = UpdateProfileRequest,
    responses(
        (
            status = 200,
            description = "Profile updated (PATCH applies only supplied fields)",
            body = ProfileResponse
        ),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this profile"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn update_profile(
    http_req: HttpRequest,
    path: web::Path<i64>,
    req: web::Json<UpdateProfileRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let profile = owned_profile(db, path.into_inner(), &user).await?;

    let bio = match (req.into_inner().bio, is_partial(&http_req)) {
        (Some(bio), _) => Some(bio),
        (None, true) => None,
        (None, false) => Some(String::new()),
    };

    let profile = ProfileRepository::new(db).update(profile, bio, None).await?;
    Ok(HttpResponse::Ok().json(Representer::new(db).profile(profile).await?))
}

#[utoipa::path(
    patch,
    path = "/profiles/{id}/",
    params(("id" = i64, Path, description = "Profile ID")),
    request_body(
        content = UpdateProfileRequest,
        content_type = "multipart/form-data",
        description = "`bio` text field and optional `avatar` image file; also accepted with PUT"
    ),
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Avatar is not an image"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this profile"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn upload_profile(
    http_req: HttpRequest,
    path: web::Path<i64>,
    form: MultipartForm<ProfileUploadForm>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn StorageBackend>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let profile = owned_profile(db, path.into_inner(), &user).await?;
    let form = form.into_inner();

    let mut errors = FieldErrors::new();
    if let Some(avatar) = &form.avatar {
        let is_image = avatar
            .content_type
            .as_ref()
            .map_or(false, |mime| mime.type_() == "image");
        if avatar.size == 0 {
            errors.add("avatar", "The submitted file is empty.");
        } else if !is_image {
            errors.add("avatar", "Upload a valid image.");
        }
    }
    errors.into_result()?;

    let avatar = match &form.avatar {
        Some(file) => {
            let stored = storage
                .store("avatars", file.file_name.as_deref(), file.file.path())
                .await?;
            Some(stored.url)
        }
        None => None,
    };

    let bio = match (form.bio, is_partial(&http_req)) {
        (Some(bio), _) => Some(bio.into_inner()),
        (None, true) => None,
        (None, false) => Some(String::new()),
    };

    // The previous avatar goes only when a new one took its place.
    let replaced = avatar.as_ref().and(profile.avatar.clone());
    let uploaded = avatar.clone();
    let profile = match ProfileRepository::new(db).update(profile, bio, avatar).await {
        Ok(profile) => profile,
        Err(e) => {
            discard_blobs(storage.get_ref(), uploaded).await;
            return Err(e.into());
        }
    };
    discard_blobs(storage.get_ref(), replaced).await;

    Ok(HttpResponse::Ok().json(Representer::new(db).profile(profile).await?))
}

#[utoipa::path(
    delete,
    path = "/profiles/{id}/",
    params(("id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this profile"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn delete_profile(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn StorageBackend>,
) -> ActixResult<HttpResponse> {
    let db = pool.get_ref();
    let profile = owned_profile(db, path.into_inner(), &user).await?;

    let avatar = profile.avatar.clone();
    ProfileRepository::new(db).delete(profile).await?;
    discard_blobs(storage.get_ref(), avatar).await;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/profiles/{id}/follow/",
    params(("id" = i64, Path, description = "Profile to follow or unfollow")),
    responses(
        (status = 200, description = "Follow state toggled (no-op on your own profile)"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "profiles"
)]
pub async fn follow_profile(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let profiles = ProfileRepository::new(pool.get_ref());
    let target = profiles.get(path.into_inner()).await?;
    let own = profiles.get_by_user(user.user_id).await?;

    let outcome = profiles.toggle_follow(target.id, own.id).await?;
    match outcome {
        FollowOutcome::Followed => log::info!("Profile {} followed {}", own.id, target.id),
        FollowOutcome::Unfollowed => log::info!("Profile {} unfollowed {}", own.id, target.id),
        FollowOutcome::Unchanged => log::debug!("Profile {} tried to follow itself", own.id),
    }

    Ok(HttpResponse::Ok().finish())
}
