use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, Result};
use crate::models::SubUserRole;

const TOKEN_TTL_HOURS: i64 = 24;

fn jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

/// Claims carried inside the bearer token.
///
/// `scope` is one of "admin", "sub_user", "customer"; `role` is set for
/// sub-users and `store_number` for customers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin/sub-user email, or customer store number.
    pub sub: String,
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<SubUserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_number: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated caller, materialized from token claims and handed to
/// handlers as a request extension. Sessions are explicit values with a
/// login-to-expiry lifecycle; there is no ambient global session state.
#[derive(Debug, Clone)]
pub enum AuthSession {
    Admin { email: String },
    SubUser { email: String, role: SubUserRole },
    Customer { store_number: String },
}

impl AuthSession {
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthSession::Admin { .. })
    }

    fn has_role(&self, role: SubUserRole) -> bool {
        matches!(self, AuthSession::SubUser { role: r, .. } if *r == role)
    }

    /// Delivery workflow: accepting orders, advancing status, editing
    /// items.
    pub fn can_manage_orders(&self) -> bool {
        self.is_admin() || self.has_role(SubUserRole::StoreManager)
    }

    /// Payments ledger: recording and listing payments.
    pub fn can_manage_accounts(&self) -> bool {
        self.is_admin() || self.has_role(SubUserRole::AccountTeam)
    }

    /// Statement access for back-office roles.
    pub fn can_view_statements(&self) -> bool {
        self.is_admin()
            || self.has_role(SubUserRole::AccountTeam)
            || self.has_role(SubUserRole::PurchaseManager)
    }

    /// Any back-office account (admin or sub-user).
    pub fn is_back_office(&self) -> bool {
        matches!(self, AuthSession::Admin { .. } | AuthSession::SubUser { .. })
    }

    pub fn store_number(&self) -> Option<&str> {
        match self {
            AuthSession::Customer { store_number } => Some(store_number),
            _ => None,
        }
    }

    pub fn require_admin(&self) -> Result<&Self> {
        self.require(self.is_admin())
    }

    /// Scope guard used at the top of protected handlers.
    pub fn require(&self, allowed: bool) -> Result<&Self> {
        if allowed {
            Ok(self)
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Customers may only touch their own store; back-office access is
    /// governed by `allowed`.
    pub fn require_store_access(&self, store_number: &str, allowed: bool) -> Result<&Self> {
        match self {
            AuthSession::Customer { store_number: own } if own == store_number => Ok(self),
            AuthSession::Customer { .. } => Err(AppError::Forbidden),
            _ => self.require(allowed),
        }
    }
}

fn issue(claims: &Claims) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

fn base_claims(sub: String, scope: &str) -> Claims {
    let now = Utc::now();
    Claims {
        sub,
        scope: scope.to_string(),
        role: None,
        store_number: None,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        iat: now.timestamp(),
    }
}

pub fn admin_token(email: &str) -> Result<String> {
    issue(&base_claims(email.to_string(), "admin"))
}

pub fn sub_user_token(email: &str, role: SubUserRole) -> Result<String> {
    let mut claims = base_claims(email.to_string(), "sub_user");
    claims.role = Some(role);
    issue(&claims)
}

pub fn customer_token(store_number: &str) -> Result<String> {
    let mut claims = base_claims(store_number.to_string(), "customer");
    claims.store_number = Some(store_number.to_string());
    issue(&claims)
}

/// Decodes and validates a bearer token into a session.
pub fn verify_token(token: &str) -> Result<AuthSession> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let claims = decoded.claims;
    match claims.scope.as_str() {
        "admin" => Ok(AuthSession::Admin { email: claims.sub }),
        "sub_user" => {
            let role = claims.role.ok_or(AppError::Unauthorized)?;
            Ok(AuthSession::SubUser { email: claims.sub, role })
        }
        "customer" => {
            let store_number = claims.store_number.ok_or(AppError::Unauthorized)?;
            Ok(AuthSession::Customer { store_number })
        }
        _ => Err(AppError::Unauthorized),
    }
}

/// Middleware validating the `Authorization: Bearer` header.
///
/// On success the session is attached to request extensions for
/// downstream handlers; on failure a 401 is returned.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let session = verify_token(token)?;
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_their_scope() {
        let session = verify_token(&admin_token("owner@example.com").unwrap()).unwrap();
        assert!(session.is_admin());

        let session =
            verify_token(&sub_user_token("ops@example.com", SubUserRole::StoreManager).unwrap())
                .unwrap();
        assert!(session.can_manage_orders());
        assert!(!session.can_manage_accounts());

        let session = verify_token(&customer_token("S-101").unwrap()).unwrap();
        assert_eq!(session.store_number(), Some("S-101"));
        assert!(!session.is_back_office());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("not-a-token").is_err());
    }

    #[test]
    fn customers_only_reach_their_own_store() {
        let session = AuthSession::Customer { store_number: "S-101".to_string() };
        assert!(session.require_store_access("S-101", false).is_ok());
        assert!(session.require_store_access("S-202", true).is_err());

        let admin = AuthSession::Admin { email: "owner@example.com".to_string() };
        assert!(admin.require_store_access("S-202", admin.can_manage_orders()).is_ok());
    }

    #[test]
    fn statement_roles() {
        let accounts = AuthSession::SubUser {
            email: "acc@example.com".to_string(),
            role: SubUserRole::AccountTeam,
        };
        assert!(accounts.can_view_statements());
        assert!(accounts.can_manage_accounts());

        let purchase = AuthSession::SubUser {
            email: "pm@example.com".to_string(),
            role: SubUserRole::PurchaseManager,
        };
        assert!(purchase.can_view_statements());
        assert!(!purchase.can_manage_accounts());
        assert!(!purchase.can_manage_orders());
    }
}
