use std::sync::Arc;

use bcrypt::hash;
use chrono::Duration;
use rand::Rng;

use crate::database::AbstractDatabase;
use crate::errors::{AppError, Result};
use crate::models::otp::OtpRecord;
use crate::services::clock::Clock;
use crate::services::email_service::{password_reset_email, Mailer, PASSWORD_RESET_SUBJECT};

pub const OTP_LENGTH: usize = 6;

#[derive(Clone)]
pub struct OTPService {
    db: Arc<dyn AbstractDatabase>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl OTPService {
    pub fn new(
        db: Arc<dyn AbstractDatabase>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            db,
            mailer,
            clock,
            ttl,
            bcrypt_cost,
        }
    }

    // Generate zero-padded OTP_LENGTH-digit OTP
    pub fn generate_otp() -> String {
        let upper = 10u32.pow(OTP_LENGTH as u32);
        let mut rng = rand::thread_rng();
        format!("{:0width$}", rng.gen_range(0..upper), width = OTP_LENGTH)
    }

    /// Issues a fresh code for `email`, replacing any code still pending.
    ///
    /// The record is written before the email goes out. If delivery fails the
    /// record is removed again, but only while it still holds this code, so a
    /// concurrent request that already replaced it keeps its own code.
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        if self.db.find_account_by_email(email).await?.is_none() {
            return Err(AppError::AccountNotFound);
        }

        let code = Self::generate_otp();
        let record = OtpRecord::issue(email, &code, self.clock.now(), self.ttl);
        self.db.upsert_otp(&record).await?;

        let html = password_reset_email(&code, self.ttl.num_minutes());
        if let Err(e) = self.mailer.send_html(email, PASSWORD_RESET_SUBJECT, html).await {
            tracing::warn!("Reset code for {} not delivered, discarding it: {}", email, e);
            if let Err(cleanup) = self.db.delete_otp_if_code(email, &code).await {
                tracing::error!("Failed to discard undelivered code for {}: {}", email, cleanup);
            }
            return Err(e);
        }

        tracing::info!("Reset code issued for {}", email);
        Ok(())
    }

    /// Consumes a live code and sets the new password.
    ///
    /// The record is taken with a single find-and-delete filtered on email,
    /// code and expiry, so each code authorises at most one reset.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        let now = self.clock.now();

        if self.db.take_live_otp(email, code, now).await?.is_none() {
            return Err(AppError::InvalidOrExpiredOtp);
        }

        if self.db.find_account_by_email(email).await?.is_none() {
            return Err(AppError::AccountNotFound);
        }

        let password_hash = hash(new_password, self.bcrypt_cost)?;
        if !self.db.update_password_hash(email, &password_hash, now).await? {
            return Err(AppError::AccountNotFound);
        }

        tracing::info!("Password reset for {}", email);
        Ok(())
    }
}
