use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{AppError, Result};
use crate::AppState;

use super::sub_users::check_password;

const WEBHOOK_KEY: &str = "webhook_url";

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetWebhookRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeAdminPasswordRequest {
    pub new_password: String,
}

/// `GET /settings`
pub async fn get(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>> {
    session.require_admin()?;

    let webhook_url: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
            .bind(WEBHOOK_KEY)
            .fetch_optional(&state.db)
            .await?;

    Ok(Json(SettingsResponse { webhook_url }))
}

/// `PUT /settings/webhook`. Storage only; delivery of
/// notifications is outside this service.
pub async fn set_webhook(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(req): Json<SetWebhookRequest>,
) -> Result<Json<SettingsResponse>> {
    session.require_admin()?;

    let url = req.url.trim().to_string();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Validation("webhook URL must start with http:// or https://".into()));
    }

    sqlx::query(
        "INSERT INTO settings (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(WEBHOOK_KEY)
    .bind(&url)
    .execute(&state.db)
    .await?;

    info!("webhook URL updated");
    Ok(Json(SettingsResponse { webhook_url: Some(url) }))
}

/// `PUT /settings/admin-password` for the logged-in
/// admin account.
pub async fn change_admin_password(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(req): Json<ChangeAdminPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = match &session {
        AuthSession::Admin { email } => email.clone(),
        _ => return Err(AppError::Forbidden),
    };
    check_password(&req.new_password)?;

    let password_hash = bcrypt::hash(&req.new_password, bcrypt::DEFAULT_COST)?;
    let updated = sqlx::query(
        "UPDATE admins SET password_hash = $2, updated_at = NOW() WHERE email = $1",
    )
    .bind(&email)
    .bind(password_hash)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("admin"));
    }

    info!("admin {} password changed", email);
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
