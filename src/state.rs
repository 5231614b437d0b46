use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::AbstractDatabase;
use crate::services::clock::Clock;
use crate::services::email_service::Mailer;
use crate::services::otp_service::OTPService;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn AbstractDatabase>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub otp_service: Arc<OTPService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Arc<dyn AbstractDatabase>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let otp_service = OTPService::new(
            db.clone(),
            mailer,
            clock.clone(),
            config.otp_ttl(),
            config.bcrypt_cost,
        );

        AppState {
            db,
            config: Arc::new(config),
            clock,
            otp_service: Arc::new(otp_service),
        }
    }
}
