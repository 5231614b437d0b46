use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::auth_dtos::{
    normalise_email, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest,
};
use crate::errors::Result;
use crate::extractors::AppJson;
use crate::state::AppState;

// 1. Forgot Password - Request OTP
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(mut req): AppJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.email = normalise_email(&req.email);
    req.validate()?;

    state.otp_service.request_reset(&req.email).await?;

    Ok(Json(MessageResponse::ok(
        "A recovery code has been sent to your email",
    )))
}

// 2. Reset Password with the emailed OTP
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(mut req): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.email = normalise_email(&req.email);
    req.check()?;

    state
        .otp_service
        .reset_password(&req.email, &req.otp, &req.new_password)
        .await?;

    Ok(Json(MessageResponse::ok("Password reset successful")))
}
