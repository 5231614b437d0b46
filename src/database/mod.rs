use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::{otp::OtpRecord, user::User};

pub mod connection;
#[cfg(test)]
pub mod dummy;
pub mod mongo;

pub const USERS_COLLECTION: &str = "users";
pub const OTPS_COLLECTION: &str = "otps";

#[async_trait]
pub trait AbstractDatabase: Send + Sync {
    /// Create the unique and TTL indexes the collections rely on
    async fn ensure_indexes(&self) -> Result<()>;

    /// Round-trip to the server
    async fn ping(&self) -> Result<()>;

    /// Find account by (normalised) email
    async fn find_account_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new account, `DuplicateKey` if the email is taken
    async fn insert_account(&self, user: &User) -> Result<()>;

    /// Replace the password hash, returns false if no account matched
    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Insert or overwrite the single OTP record for `record.email`
    async fn upsert_otp(&self, record: &OtpRecord) -> Result<()>;

    /// Find the OTP record for an email
    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>>;

    /// Atomically remove and return the record matching email and code
    /// whose expiry is still after `now`
    async fn take_live_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>>;

    /// Delete the record for `email` only while it still holds `code`
    async fn delete_otp_if_code(&self, email: &str, code: &str) -> Result<()>;
}
