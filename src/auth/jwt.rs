use crate::config::JwtConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("expected a {expected:?} token")]
    WrongType { expected: TokenType },
    #[error("token is blacklisted")]
    Blacklisted,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub token_type: TokenType,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: String, token_type: TokenType, lifetime: Duration) -> Self {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            username,
            token_type,
            jti: Uuid::new_v4().simple().to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn access(user_id: i64, username: String, config: &JwtConfig) -> Self {
        Self::new(
            user_id,
            username,
            TokenType::Access,
            Duration::minutes(config.access_expiration_minutes),
        )
    }

    pub fn refresh(user_id: i64, username: String, config: &JwtConfig) -> Self {
        Self::new(
            user_id,
            username,
            TokenType::Refresh,
            Duration::hours(config.refresh_expiration_hours),
        )
    }

    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Invalid(format!("bad subject {:?}", self.sub)))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })?;
    Ok(token_data.claims)
}

/// Verifies the signature and expiry, then checks the token is of `expected` type.
pub fn verify_token_type(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<Claims, TokenError> {
    let claims = verify_token(token, secret)?;
    if claims.token_type != expected {
        return Err(TokenError::WrongType { expected });
    }
    Ok(claims)
}

/// Access + refresh pair issued at login.
pub fn create_token_pair(
    user_id: i64,
    username: &str,
    config: &JwtConfig,
) -> Result<(String, String), anyhow::Error> {
    let access = create_token(
        &Claims::access(user_id, username.to_string(), config),
        &config.secret,
    )?;
    let refresh = create_token(
        &Claims::refresh(user_id, username.to_string(), config),
        &config.secret,
    )?;
    Ok((access, refresh))
}
