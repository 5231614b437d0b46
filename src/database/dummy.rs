use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::errors::{AppError, Result};
use crate::models::{otp::OtpRecord, user::User};

use super::AbstractDatabase;

/// In-memory stand-in for Mongo, keyed by email like the unique indexes.
#[derive(Default, Clone)]
pub struct DummyDb {
    pub accounts: Arc<Mutex<HashMap<String, User>>>,
    pub otps: Arc<Mutex<HashMap<String, OtpRecord>>>,
}

#[async_trait]
impl AbstractDatabase for DummyDb {
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<User>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(email).cloned())
    }

    async fn insert_account(&self, user: &User) -> Result<()> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&user.email) {
            return Err(AppError::DuplicateKey);
        }
        accounts.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn upsert_otp(&self, record: &OtpRecord) -> Result<()> {
        let mut otps = self.otps.lock().await;
        otps.insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>> {
        let otps = self.otps.lock().await;
        Ok(otps.get(email).cloned())
    }

    async fn take_live_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>> {
        let mut otps = self.otps.lock().await;
        let matches = otps
            .get(email)
            .map(|record| record.code == code && record.is_live(now))
            .unwrap_or(false);

        Ok(if matches { otps.remove(email) } else { None })
    }

    async fn delete_otp_if_code(&self, email: &str, code: &str) -> Result<()> {
        let mut otps = self.otps.lock().await;
        if otps.get(email).map(|record| record.code == code).unwrap_or(false) {
            otps.remove(email);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const EMAIL: &str = "user@example.com";

    #[tokio::test]
    async fn conditional_delete_spares_a_different_code() {
        let db = DummyDb::default();
        let record = OtpRecord::issue(EMAIL, "111111", Utc::now(), Duration::minutes(5));
        db.upsert_otp(&record).await.unwrap();

        db.delete_otp_if_code(EMAIL, "222222").await.unwrap();
        assert_eq!(db.find_otp(EMAIL).await.unwrap(), Some(record));

        db.delete_otp_if_code(EMAIL, "111111").await.unwrap();
        assert!(db.find_otp(EMAIL).await.unwrap().is_none());
    }
}
