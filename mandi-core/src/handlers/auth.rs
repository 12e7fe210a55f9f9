use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{info, warn};

use crate::auth;
use crate::error::{AppError, Result};
use crate::models::SubUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SubUserLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerLoginRequest {
    pub store_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Customer login returns the session profile alongside the token so the
/// storefront can render without a second round trip.
#[derive(Debug, Serialize)]
pub struct CustomerLoginResponse {
    pub token: String,
    pub store_number: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
}

#[derive(Debug, FromRow)]
struct AdminRow {
    email: String,
    password_hash: String,
}

/// `POST /auth/admin/login`
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<TokenResponse>> {
    let admin = sqlx::query_as::<_, AdminRow>(
        "SELECT email, password_hash FROM admins WHERE email = $1",
    )
    .bind(req.email.trim())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    if !bcrypt::verify(&req.password, &admin.password_hash).unwrap_or(false) {
        warn!("failed admin login for {}", admin.email);
        return Err(AppError::Unauthorized);
    }

    info!("admin {} logged in", admin.email);
    Ok(Json(TokenResponse { token: auth::admin_token(&admin.email)? }))
}

/// `POST /auth/subuser/login`
///
/// Inactive accounts are rejected the same way as bad credentials.
pub async fn sub_user_login(
    State(state): State<AppState>,
    Json(req): Json<SubUserLoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user = sqlx::query_as::<_, SubUser>("SELECT * FROM sub_users WHERE email = $1")
        .bind(req.email.trim())
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.active || !bcrypt::verify(&req.password, &user.password_hash).unwrap_or(false) {
        warn!("failed sub-user login for {}", user.email);
        return Err(AppError::Unauthorized);
    }

    info!("sub-user {} ({}) logged in", user.email, user.role);
    Ok(Json(TokenResponse { token: auth::sub_user_token(&user.email, user.role)? }))
}

#[derive(Debug, FromRow)]
struct CustomerCredRow {
    store_number: String,
    company_name: String,
    address: String,
    gst_number: Option<String>,
    password_hash: String,
}

/// `POST /auth/customer/login`
pub async fn customer_login(
    State(state): State<AppState>,
    Json(req): Json<CustomerLoginRequest>,
) -> Result<Json<CustomerLoginResponse>> {
    let customer = sqlx::query_as::<_, CustomerCredRow>(
        "SELECT store_number, company_name, address, gst_number, password_hash \
         FROM customers WHERE store_number = $1",
    )
    .bind(req.store_number.trim())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    if !bcrypt::verify(&req.password, &customer.password_hash).unwrap_or(false) {
        warn!("failed customer login for store {}", customer.store_number);
        return Err(AppError::Unauthorized);
    }

    info!("customer store {} logged in", customer.store_number);
    Ok(Json(CustomerLoginResponse {
        token: auth::customer_token(&customer.store_number)?,
        store_number: customer.store_number,
        company_name: customer.company_name,
        address: customer.address,
        gst_number: customer.gst_number,
    }))
}
