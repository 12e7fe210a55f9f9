use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::{AppError, Result};
use crate::models::payment::{AddPaymentRequest, PaymentMethod, PaymentResponse};
use crate::models::Payment;
use crate::AppState;

/// `POST /payments`: record a customer payment.
///
/// Records a customer payment into the ledger. Immutable afterwards;
/// shows up as a credit on statements from the moment it commits.
pub async fn add(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(req): Json<AddPaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    session.require(session.can_manage_accounts())?;
    req.validate().map_err(AppError::Validation)?;

    let exists: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM customers WHERE store_number = $1")
            .bind(req.store_number.trim())
            .fetch_optional(&state.db)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("customer"));
    }

    // Only the detail matching the method is stored.
    let (cheque_details, utr_details) = match req.payment_method {
        PaymentMethod::Cheque => (req.cheque_details.clone(), None),
        PaymentMethod::Online => (None, req.utr_details.clone()),
        PaymentMethod::Cash => (None, None),
    };

    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments \
         (payment_id, store_number, company_name, amount, payment_method, cheque_details, utr_details) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(req.store_number.trim())
    .bind(req.company_name.trim())
    .bind(req.amount)
    .bind(req.payment_method)
    .bind(cheque_details)
    .bind(utr_details)
    .fetch_one(&state.db)
    .await?;

    info!(
        "payment {} recorded: store {}, {} via {}",
        payment.payment_id, payment.store_number, payment.amount, payment.payment_method
    );
    Ok(Json(PaymentResponse::from(payment)))
}

/// `GET /payments`: full payments ledger, newest first.
pub async fn list(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>> {
    session.require(session.can_manage_accounts())?;

    let payments =
        sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// `GET /payments/store/:store_number`: one store's payments.
pub async fn by_store(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(store_number): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>> {
    session.require_store_access(&store_number, session.can_manage_accounts())?;

    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE store_number = $1 ORDER BY created_at DESC",
    )
    .bind(&store_number)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
