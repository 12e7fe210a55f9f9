use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{AppError, Result};
use crate::models::sub_user::{ChangePasswordRequest, CreateSubUserRequest, SubUserResponse};
use crate::models::SubUser;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

/// `GET /subusers`
pub async fn list(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubUserResponse>>> {
    session.require_admin()?;

    let users = sqlx::query_as::<_, SubUser>("SELECT * FROM sub_users ORDER BY email")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(SubUserResponse::from).collect()))
}

/// `POST /subusers`: create a scoped back-office account.
pub async fn create(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(req): Json<CreateSubUserRequest>,
) -> Result<Json<SubUserResponse>> {
    session.require_admin()?;

    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".into()));
    }
    check_password(&req.password)?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM sub_users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!("sub-user {email} already exists")));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;
    let user = sqlx::query_as::<_, SubUser>(
        "INSERT INTO sub_users (email, password_hash, role, active) \
         VALUES ($1, $2, $3, TRUE) RETURNING *",
    )
    .bind(&email)
    .bind(password_hash)
    .bind(req.role)
    .fetch_one(&state.db)
    .await?;

    info!("sub-user {} created with role {}", user.email, user.role);
    Ok(Json(SubUserResponse::from(user)))
}

/// `POST /subusers/:email/toggle`: enable or disable an account.
pub async fn toggle(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<SubUserResponse>> {
    session.require_admin()?;

    let user = sqlx::query_as::<_, SubUser>(
        "UPDATE sub_users SET active = NOT active WHERE email = $1 RETURNING *",
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("sub-user"))?;

    info!("sub-user {} now active={}", user.email, user.active);
    Ok(Json(SubUserResponse::from(user)))
}

/// `PUT /subusers/:email/password`
pub async fn change_password(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<SubUserResponse>> {
    session.require_admin()?;
    check_password(&req.new_password)?;

    let password_hash = bcrypt::hash(&req.new_password, bcrypt::DEFAULT_COST)?;
    let user = sqlx::query_as::<_, SubUser>(
        "UPDATE sub_users SET password_hash = $2 WHERE email = $1 RETURNING *",
    )
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("sub-user"))?;

    info!("sub-user {} password changed", user.email);
    Ok(Json(SubUserResponse::from(user)))
}

pub(super) fn check_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
