use axum::{
    extract::{Extension, State},
    response::Json,
};
use bcrypt::{hash, verify};
use jsonwebtoken::{encode, EncodingKey, Header};
use validator::Validate;

use crate::dtos::auth_dtos::{normalise_email, LoginRequest, RegisterRequest};
use crate::errors::{AppError, Result};
use crate::extractors::AppJson;
use crate::models::user::{AuthResponse, Claims, User, UserResponse};
use crate::state::AppState;

const TOKEN_LIFETIME_SECS: i64 = 86400; // 24 hours

pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    payload.email = normalise_email(&payload.email);
    payload.validate()?;

    if state.db.find_account_by_email(&payload.email).await?.is_some() {
        return Err(AppError::DuplicateKey);
    }

    let password_hash = hash(&payload.password, state.config.bcrypt_cost)?;
    let user = User::new(
        payload.name.trim().to_string(),
        payload.email,
        password_hash,
        state.clock.now(),
    );

    state.db.insert_account(&user).await?;
    tracing::info!("Account registered: {}", user.email);

    Ok(Json(UserResponse::from(&user)))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.email = normalise_email(&payload.email);
    payload.validate()?;

    let user = state
        .db
        .find_account_by_email(&payload.email)
        .await?
        .ok_or(AppError::AuthError)?;

    if !verify(&payload.password, &user.password_hash)? {
        return Err(AppError::AuthError);
    }

    let claims = Claims {
        sub: user.id_hex(),
        email: user.email.clone(),
        exp: (state.clock.now().timestamp() + TOKEN_LIFETIME_SECS) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_ref()),
    )?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .find_account_by_email(&claims.email)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    Ok(Json(UserResponse::from(&user)))
}
