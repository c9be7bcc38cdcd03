pub mod auth;
pub mod comment;
pub mod like;
pub mod media;
pub mod post;
pub mod profile;
pub mod token;
pub mod user;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    CommentResponse, CreateCommentRequest, CreateLikeRequest, CreatePostRequest,
    CreateProfileRequest, CreateUserRequest, LikeResponse, ListQuery, LogoutRequest,
    MediaResponse, MediaUploadSchema, PostResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
    TokenRefreshResponse, UpdateCommentRequest, UpdatePostRequest, UpdateProfileRequest,
    UserResponse,
};
use crate::services::StorageBackend;
use actix_multipart::form::MultipartFormConfig;
use actix_web::guard::{self, GuardContext};
use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Profile endpoints
        profile::list_profiles,
        profile::create_profile,
        profile::get_profile,
        profile::update_profile,
        profile::upload_profile,
        profile::delete_profile,
        profile::follow_profile,
        // Media endpoints
        media::list_media,
        media::upload_media,
        media::get_media,
        media::delete_media,
        // Post endpoints
        post::list_posts,
        post::create_post,
        post::get_post,
        post::update_post,
        post::delete_post,
        // Like endpoints
        like::list_likes,
        like::create_like,
        like::get_like,
        like::delete_like,
        // Comment endpoints
        comment::list_comments,
        comment::create_comment,
        comment::get_comment,
        comment::update_comment,
        comment::delete_comment,
        // User endpoints
        user::list_users,
        user::create_user,
        user::get_user,
        user::delete_user,
        // Session endpoints
        auth::register,
        auth::logout,
        token::obtain_token,
        token::refresh_token,
    ),
    components(schemas(
        ProfileResponse,
        CreateProfileRequest,
        UpdateProfileRequest,
        MediaResponse,
        MediaUploadSchema,
        crate::entities::media::MediaType,
        PostResponse,
        CreatePostRequest,
        UpdatePostRequest,
        crate::entities::post::PostType,
        LikeResponse,
        CreateLikeRequest,
        CommentResponse,
        CreateCommentRequest,
        UpdateCommentRequest,
        UserResponse,
        CreateUserRequest,
        RegisterRequest,
        RegisterResponse,
        LogoutRequest,
        TokenObtainRequest,
        TokenPairResponse,
        TokenRefreshRequest,
        TokenRefreshResponse,
        ListQuery,
    )),
    tags(
        (name = "profiles", description = "Profiles and follow relationships"),
        (name = "media", description = "Media uploads"),
        (name = "posts", description = "Posts"),
        (name = "likes", description = "Likes"),
        (name = "comments", description = "Comments"),
        (name = "users", description = "User accounts"),
        (name = "auth", description = "Registration and tokens"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// Registers every route. Shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/profiles/")
                .route(web::get().to(profile::list_profiles))
                .route(web::post().to(profile::create_profile)),
        )
        .service(
            web::resource("/profiles/{id}/")
                .route(web::get().to(profile::get_profile))
                .route(
                    web::put()
                        .guard(guard::fn_guard(is_multipart))
                        .to(profile::upload_profile),
                )
                .route(
                    web::patch()
                        .guard(guard::fn_guard(is_multipart))
                        .to(profile::upload_profile),
                )
                .route(web::put().to(profile::update_profile))
                .route(web::patch().to(profile::update_profile))
                .route(web::delete().to(profile::delete_profile)),
        )
        .route(
            "/profiles/{id}/follow/",
            web::post().to(profile::follow_profile),
        )
        .service(
            web::resource("/media/")
                .route(web::get().to(media::list_media))
                .route(web::post().to(media::upload_media)),
        )
        .service(
            web::resource("/media/{id}/")
                .route(web::get().to(media::get_media))
                .route(web::delete().to(media::delete_media)),
        )
        .service(
            web::resource("/posts/")
                .route(web::get().to(post::list_posts))
                .route(web::post().to(post::create_post)),
        )
        .service(
            web::resource("/posts/{id}/")
                .route(web::get().to(post::get_post))
                .route(web::put().to(post::update_post))
                .route(web::patch().to(post::update_post))
                .route(web::delete().to(post::delete_post)),
        )
        .service(
            web::resource("/likes/")
                .route(web::get().to(like::list_likes))
                .route(web::post().to(like::create_like)),
        )
        .service(
            web::resource("/likes/{id}/")
                .route(web::get().to(like::get_like))
                .route(web::delete().to(like::delete_like)),
        )
        .service(
            web::resource("/comments/")
                .route(web::get().to(comment::list_comments))
                .route(web::post().to(comment::create_comment)),
        )
        .service(
            web::resource("/comments/{id}/")
                .route(web::get().to(comment::get_comment))
                .route(web::put().to(comment::update_comment))
                .route(web::patch().to(comment::update_comment))
                .route(web::delete().to(comment::delete_comment)),
        )
        .service(
            web::resource("/users/")
                .route(web::get().to(user::list_users))
                .route(web::post().to(user::create_user)),
        )
        .service(
            web::resource("/users/{id}/")
                .route(web::get().to(user::get_user))
                .route(web::delete().to(user::delete_user)),
        )
        .route("/register/", web::post().to(auth::register))
        .route("/logout/", web::post().to(auth::logout))
        .route("/token/", web::post().to(token::obtain_token))
        .route("/token/refresh/", web::post().to(token::refresh_token));
}

/// Upload limits for multipart bodies (avatars and media batches).
pub fn multipart_config(config: &Config) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(config.storage.max_upload_bytes)
        .memory_limit(2 * 1024 * 1024)
}

/// Malformed JSON bodies become validation errors carrying the parser message.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

fn is_multipart(ctx: &GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| {
            value.to_ascii_lowercase().starts_with("multipart/form-data")
        })
}

/// PATCH updates only the supplied fields; PUT replaces the resource.
pub(crate) fn is_partial(req: &HttpRequest) -> bool {
    req.method() == Method::PATCH
}

/// Removes the blobs behind stored file URLs once their rows are gone.
///
/// Failures are logged; the rows are already deleted and the request has succeeded.
pub(crate) async fn discard_blobs<I>(storage: &dyn StorageBackend, urls: I)
where
    I: IntoIterator<Item = String>,
{
    for url in urls {
        let Some(key) = storage.key_for_url(&url) else {
            log::warn!("Not removing {}: not a stored file URL", url);
            continue;
        };
        if let Err(e) = storage.delete(&key).await {
            log::warn!("Failed to remove stored file {}: {}", key, e);
        }
    }
}

pub(crate) fn ensure_owner(owner_id: i64, user: &AuthenticatedUser, what: &str) -> AppResult<()> {
    if owner_id != user.user_id {
        log::warn!(
            "User {} tried to modify {} owned by {}",
            user.user_id,
            what,
            owner_id
        );
        return Err(AppError::Forbidden(format!(
            "You do not have permission to modify this {}",
            what
        )));
    }
    Ok(())
}
