pub mod clock;
pub mod email_service;
pub mod otp_service;
