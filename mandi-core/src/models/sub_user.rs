use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Scoped admin-portal role for a sub-user account.
///
/// The role restricts which back-office functions the account may use:
/// - StoreManager: delivery workflow (order status and item edits)
/// - AccountTeam: payments ledger and statements
/// - PurchaseManager: read-only statements and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum SubUserRole {
    #[sqlx(rename = "storeManager")]
    #[serde(rename = "storeManager")]
    StoreManager,

    #[sqlx(rename = "accountTeam")]
    #[serde(rename = "accountTeam")]
    AccountTeam,

    #[sqlx(rename = "purchaseManager")]
    #[serde(rename = "purchaseManager")]
    PurchaseManager,
}

impl std::fmt::Display for SubUserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubUserRole::StoreManager => write!(f, "storeManager"),
            SubUserRole::AccountTeam => write!(f, "accountTeam"),
            SubUserRole::PurchaseManager => write!(f, "purchaseManager"),
        }
    }
}

/// Sub-user account mapping to the `sub_users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubUser {
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: SubUserRole,

    /// Inactive accounts cannot log in; existing tokens lose access on
    /// the next role check.
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubUserRequest {
    pub email: String,
    pub password: String,
    pub role: SubUserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Sub-user representation without credentials.
#[derive(Debug, Clone, Serialize)]
pub struct SubUserResponse {
    pub email: String,
    pub role: SubUserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SubUser> for SubUserResponse {
    fn from(u: SubUser) -> Self {
        SubUserResponse {
            email: u.email,
            role: u.role,
            active: u.active,
            created_at: u.created_at,
        }
    }
}
