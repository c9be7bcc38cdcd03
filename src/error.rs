//! Error types shared by handlers and repositories.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Per-field validation messages, keyed by request field name.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise `AppError::InvalidFields`.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self))
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid fields")]
    InvalidFields(FieldErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidFields(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn not_found(what: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {} not found", what, id))
    }

    /// A related object given by primary key does not exist.
    pub fn invalid_pk(field: &str, id: i64) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(
            field,
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
        Self::InvalidFields(errors)
    }

    /// True when the database rejected a write because of a unique index.
    pub fn is_unique_violation(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }

    /// True when a write referenced a row that does not exist (or no longer does).
    pub fn is_foreign_key_violation(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Duplicate likes are reported as a plain bad request.
            Self::Validation(_) | Self::InvalidFields(_) | Self::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            log::error!("Server error ({}): {}", code, self);
        } else {
            log::debug!("Client error ({}): {}", code, self);
        }

        let body = match self {
            Self::InvalidFields(fields) => json!({
                "error": self.to_string(),
                "code": code,
                "fields": fields,
            }),
            // Never leak database or filesystem details to clients.
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => json!({
                "error": "Internal server error",
                "code": code,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": code,
            }),
        };

        HttpResponse::build(status).json(body)
    }
}
