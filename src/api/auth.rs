use crate::auth::{hash_password, verify_token_type, AuthenticatedUser, TokenError, TokenType};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{LogoutRequest, RegisterRequest, RegisterResponse};
use crate::repositories::{create_account, BlacklistOutcome, NewUser, TokenBlacklistRepository};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result as ActixResult};
use thiserror::Error;

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Missing username or password, or username taken")
    ),
    tag = "auth"
)]
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    let (username, password) = match (req.username, req.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => {
            return Err(
                AppError::Validation("Username and password are required".to_string()).into(),
            )
        }
    };

    let password_hash =
        hash_password(&password, config.auth.bcrypt_cost).map_err(AppError::from)?;

    create_account(
        pool.get_ref(),
        NewUser {
            username,
            email: req.email.unwrap_or_default(),
            password_hash,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        success: "User created successfully".to_string(),
    }))
}

#[derive(Debug, Error)]
enum LogoutError {
    #[error("no refresh token supplied")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("database error: {0}")]
    Database(String),
}

impl From<AppError> for LogoutError {
    fn from(e: AppError) -> Self {
        LogoutError::Database(e.to_string())
    }
}

async fn revoke(
    db: &DbPool,
    config: &Config,
    refresh_token: Option<String>,
) -> Result<i64, LogoutError> {
    let token = refresh_token
        .filter(|token| !token.is_empty())
        .ok_or(LogoutError::MissingToken)?;

    let claims = verify_token_type(&token, &config.jwt.secret, TokenType::Refresh)?;
    let user_id = claims.user_id()?;

    let outcome = TokenBlacklistRepository::new(db)
        .blacklist(&claims.jti, user_id, claims.expires_at())
        .await?;
    match outcome {
        BlacklistOutcome::Added => Ok(user_id),
        BlacklistOutcome::AlreadyBlacklisted => Err(TokenError::Blacklisted.into()),
    }
}

#[utoipa::path(
    post,
    path = "/logout/",
    request_body = LogoutRequest,
    responses(
        (status = 205, description = "Refresh token blacklisted"),
        (
            status = 400,
            description = "Missing, invalid, expired or already blacklisted refresh token"
        ),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn logout(
    req: Option<web::Json<LogoutRequest>>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let refresh_token = req.and_then(|body| body.into_inner().refresh_token);

    match revoke(pool.get_ref(), config.get_ref(), refresh_token).await {
        Ok(owner) => {
            log::info!(
                "User {} logged out; refresh token of user {} blacklisted",
                user.user_id,
                owner
            );
            Ok(HttpResponse::build(StatusCode::RESET_CONTENT).finish())
        }
        Err(LogoutError::Database(e)) => {
            log::error!("Logout failed for user {}: {}", user.user_id, e);
            Ok(HttpResponse::BadRequest().finish())
        }
        Err(e) => {
            log::debug!("Logout rejected for user {}: {}", user.user_id, e);
            Ok(HttpResponse::BadRequest().finish())
        }
    }
}

