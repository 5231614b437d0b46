use std::{ops::Deref, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc},
    error::{ErrorKind, WriteError, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::errors::{AppError, Result};
use crate::models::{otp::OtpRecord, user::User};

use super::{AbstractDatabase, OTPS_COLLECTION, USERS_COLLECTION};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb(pub mongodb::Database);

impl Deref for MongoDb {
    type Target = mongodb::Database;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoDb {
    fn users(&self) -> Collection<User> {
        self.collection(USERS_COLLECTION)
    }

    fn otps(&self) -> Collection<OtpRecord> {
        self.collection(OTPS_COLLECTION)
    }
}

fn bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY_CODE,
            ..
        }))
    )
}

#[async_trait]
impl AbstractDatabase for MongoDb {
    async fn ensure_indexes(&self) -> Result<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.users().create_index(unique_email.clone()).await?;
        self.otps().create_index(unique_email).await?;

        // Mongo sweeps expired codes by itself, lookups still compare expiry
        let ttl = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("expires_at_ttl".to_string())
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        self.otps().create_index(ttl).await?;

        tracing::info!("Indexes ensured on '{}' and '{}'", USERS_COLLECTION, OTPS_COLLECTION);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn insert_account(&self, user: &User) -> Result<()> {
        match self.users().insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::DuplicateKey),
            Err(e) => Err(AppError::MongoDB(e)),
        }
    }

    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "updated_at": bson_datetime(now),
            }
        };

        let result = self.users().update_one(doc! { "email": email }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn upsert_otp(&self, record: &OtpRecord) -> Result<()> {
        let update = doc! {
            "$set": {
                "code": record.code.as_str(),
                "expires_at": bson_datetime(record.expires_at),
                "created_at": bson_datetime(record.created_at),
            }
        };

        self.otps()
            .update_one(doc! { "email": record.email.as_str() }, update)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>> {
        Ok(self.otps().find_one(doc! { "email": email }).await?)
    }

    async fn take_live_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>> {
        let filter = doc! {
            "email": email,
            "code": code,
            "expires_at": { "$gt": bson_datetime(now) },
        };

        Ok(self.otps().find_one_and_delete(filter).await?)
    }

    async fn delete_otp_if_code(&self, email: &str, code: &str) -> Result<()> {
        self.otps()
            .delete_one(doc! { "email": email, "code": code })
            .await?;
        Ok(())
    }
}
