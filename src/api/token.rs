use crate::auth::{
    create_token, create_token_pair, verify_password, verify_token_type, Claims, TokenType,
};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    TokenObtainRequest, TokenPairResponse, TokenRefreshRequest, TokenRefreshResponse,
};
use crate::repositories::{TokenBlacklistRepository, UserRepository};
use actix_web::{web, HttpResponse, Result as ActixResult};

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized(message.to_string())
}

#[utoipa::path(
    post,
    path = "/token/",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Access and refresh token pair", body = TokenPairResponse),
        (status = 401, description = "No active account found with the given credentials")
    ),
    tag = "auth"
)]
pub async fn obtain_token(
    req: web::Json<TokenObtainRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let user = UserRepository::new(pool.get_ref())
        .find_by_username(&req.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| unauthorized(BAD_CREDENTIALS))?;

    let is_valid = verify_password(&req.password, &user.password_hash).map_err(AppError::from)?;
    if !is_valid {
        log::debug!("Wrong password for {}", user.username);
        return Err(unauthorized(BAD_CREDENTIALS).into());
    }

    let (access, refresh) =
        create_token_pair(user.id, &user.username, &config.jwt).map_err(AppError::from)?;
    log::info!("Issued token pair for user {}", user.id);

    Ok(HttpResponse::Ok().json(TokenPairResponse { refresh, access }))
}

async fn refresh_access(db: &DbPool, config: &Config, refresh: &str) -> AppResult<String> {
    let claims = verify_token_type(refresh, &config.jwt.secret, TokenType::Refresh).map_err(|e| {
        log::debug!("Rejected refresh token: {}", e);
        unauthorized("Token is invalid or expired")
    })?;

    if TokenBlacklistRepository::new(db).is_blacklisted(&claims.jti).await? {
        return Err(unauthorized("Token is blacklisted"));
    }

    let user_id = claims
        .user_id()
        .map_err(|_| unauthorized("Token is invalid or expired"))?;
    let user = UserRepository::new(db)
        .find_by_id(user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| unauthorized("User not found"))?;

    let access = create_token(
        &Claims::access(user.id, user.username, &config.jwt),
        &config.jwt.secret,
    )?;
    Ok(access)
}

#[utoipa::path(
    post,
    path = "/token/refresh/",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Fresh access token", body = TokenRefreshResponse),
        (status = 401, description = "Refresh token invalid, expired or blacklisted")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    req: web::Json<TokenRefreshRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let access = refresh_access(pool.get_ref(), config.get_ref(), &req.refresh).await?;
    Ok(HttpResponse::Ok().json(TokenRefreshResponse { access }))
}
