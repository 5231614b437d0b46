use axum::{
    routing::post,
    Router,
};

use crate::{
    handlers::auth_otp,
    state::AppState,
};

pub fn auth_otp_routes() -> Router<AppState> {
    Router::new()
        // Request OTP for password reset
        .route("/auth/forgot-password", post(auth_otp::forgot_password))

        // Reset password with the emailed OTP
        .route("/auth/reset-password", post(auth_otp::reset_password))
}
