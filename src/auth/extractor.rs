use crate::auth::{verify_token_type, TokenType};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::repositories::UserRepository;
use actix_web::{web, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

/// Active account behind a valid access token in the `Authorization` header.
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

impl AuthenticatedUser {
    /// Checks signature, expiry and token type; returns the subject id.
    fn verify_header(req: &HttpRequest) -> Result<i64, AppError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized("Missing or invalid authorization header".to_string())
            })?;

        let config = req
            .app_data::<web::Data<Config>>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Config is not registered")))?;

        let claims = verify_token_type(token, &config.jwt.secret, TokenType::Access)
            .map_err(|e| {
                log::debug!("Rejected access token: {}", e);
                AppError::Unauthorized("Invalid token".to_string())
            })?;

        claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }

    /// A token outliving its account (deleted or deactivated) is rejected.
    async fn load(user_id: i64, pool: Option<web::Data<DbPool>>) -> Result<Self, AppError> {
        let pool = pool
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Database pool is not registered")))?;

        let user = UserRepository::new(pool.get_ref())
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                log::debug!("Access token for missing or inactive user {}", user_id);
                AppError::Unauthorized("User not found".to_string())
            })?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let verified = Self::verify_header(req);
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let user_id = verified?;
            Self::load(user_id, pool).await.map_err(Error::from)
        })
    }
}
