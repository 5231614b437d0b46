use chrono::{DateTime, Duration, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

/// One live reset code per account email.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OtpRecord {
    pub email: String,
    pub code: String, // 6-digit OTP

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn issue(email: &str, code: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        OtpRecord {
            email: email.to_string(),
            code: code.to_string(),
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// A record stops matching the instant its expiry is reached.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
