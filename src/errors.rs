// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("No account is registered with that email")]
    AccountNotFound,

    #[error("Invalid or expired OTP code")]
    InvalidOrExpiredOtp,

    #[error("Failed to deliver email: {0}")]
    EmailDelivery(String),

    #[error("Duplicate key error")]
    DuplicateKey,

    #[error("Authentication error")]
    AuthError,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidOrExpiredOtp => StatusCode::BAD_REQUEST,
            AppError::EmailDelivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DuplicateKey => StatusCode::CONFLICT,
            AppError::AuthError => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-friendly kind, plus the message that is safe to show
    /// to a client. Internal failures never leak driver or transport text.
    fn public_parts(&self) -> (&'static str, String) {
        match self {
            AppError::MongoDB(_) => ("Database error", "Database error".to_string()),
            AppError::AccountNotFound => ("Account not found", self.to_string()),
            AppError::InvalidOrExpiredOtp => ("Invalid OTP", self.to_string()),
            AppError::EmailDelivery(_) => (
                "Email delivery failed",
                "Could not send the recovery code, check the email address".to_string(),
            ),
            AppError::DuplicateKey => ("Duplicate entry", "Email is already registered".to_string()),
            AppError::AuthError => ("Authentication failed", "Invalid email or password".to_string()),
            AppError::ValidationError(_) => ("Validation failed", self.to_string()),
            AppError::PasswordHash(_) => ("Internal error", "Internal server error".to_string()),
            AppError::Token(_) => ("Internal error", "Internal server error".to_string()),
            AppError::ConfigurationError(_) => ("Configuration error", "Internal server error".to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let (error, message) = self.public_parts();
        let body = Json(json!({
            "error": error,
            "message": message,
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::PasswordHash(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Token(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn email(msg: impl Into<String>) -> Self {
        AppError::EmailDelivery(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
