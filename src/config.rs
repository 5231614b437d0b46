// config.rs
use std::env;

use chrono::Duration;

use crate::errors::{AppError, Result};

// Mirrors bcrypt's private cost bounds (bcrypt 0.15: MIN_COST = 4, MAX_COST = 31).
pub(crate) const BCRYPT_MIN_COST: u32 = 4;
pub(crate) const BCRYPT_MAX_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from: String,
    pub otp_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub log_level: tracing::Level,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let smtp_username = required("SMTP_USERNAME")?;
        let email_from = lookup("EMAIL_FROM").unwrap_or_else(|| smtp_username.clone());

        let config = AppConfig {
            database_url: required("DATABASE_URL")?,
            database_name: or_default("DATABASE_NAME", "rental"),
            jwt_secret: required("JWT_SECRET")?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse("PORT", &or_default("PORT", "4000"))?,
            smtp_host: required("SMTP_HOST")?,
            smtp_port: parse("SMTP_PORT", &or_default("SMTP_PORT", "587"))?,
            smtp_username,
            smtp_password: required("SMTP_PASSWORD")?,
            email_from,
            otp_ttl_minutes: parse("OTP_TTL_MINUTES", &or_default("OTP_TTL_MINUTES", "5"))?,
            bcrypt_cost: parse(
                "BCRYPT_COST",
                &or_default("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string()),
            )?,
            log_level: parse("LOG_LEVEL", &or_default("LOG_LEVEL", "info"))?,
        };

        if config.otp_ttl_minutes <= 0 {
            return Err(AppError::configuration("OTP_TTL_MINUTES must be positive"));
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&config.bcrypt_cost) {
            return Err(AppError::configuration(format!(
                "BCRYPT_COST must be between {} and {}",
                BCRYPT_MIN_COST,
                BCRYPT_MAX_COST
            )));
        }

        Ok(config)
    }

    pub fn otp_ttl(&self) -> Duration {
        Duration::minutes(self.otp_ttl_minutes)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        AppConfig {
            database_url: "mongodb://localhost:27017".to_string(),
            database_name: "rental_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 4000,
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            smtp_username: "noreply@rental.test".to_string(),
            smtp_password: "password".to_string(),
            email_from: "noreply@rental.test".to_string(),
            otp_ttl_minutes: 5,
            bcrypt_cost: BCRYPT_MIN_COST,
            log_level: tracing::Level::DEBUG,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::configuration(format!("{} has an invalid value: {}", key, raw)))
}
