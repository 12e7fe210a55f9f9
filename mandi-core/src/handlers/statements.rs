use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::domain::ledger::{self, LedgerRow};
use crate::domain::lifecycle::OrderStatus;
use crate::error::{AppError, Result};
use crate::export::{csv as csv_export, document};
use crate::models::statement::StatementQuery;
use crate::models::StatementEntry;
use crate::AppState;

/// Reconciled statement on the wire: ordered rows with running balances
/// plus the closing position.
#[derive(Debug, Serialize)]
pub struct StatementView {
    pub store_number: Option<String>,
    pub company_name: Option<String>,
    pub from: i64,
    pub to: i64,
    pub entry_count: usize,
    pub rows: Vec<LedgerRow>,
    pub closing_balance: Decimal,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub amount_due: bool,
}

/// `GET /statements/customer/:store_number`: one customer's ledger for
/// the back office.
pub async fn customer_statement(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(store_number): Path<String>,
    Query(query): Query<StatementQuery>,
) -> Result<Response> {
    session.require(session.can_view_statements())?;

    let company = company_of(&state.db, &store_number).await?;
    build(&state.db, Some(store_number), Some(company), query).await
}

/// `GET /statements/company`: all customers
/// combined in one ledger.
pub async fn company_statement(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> Result<Response> {
    session.require(session.can_view_statements())?;

    build(&state.db, None, None, query).await
}

/// `GET /statements/me`: the self-service customer
/// view of their own ledger.
pub async fn my_statement(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> Result<Response> {
    let store_number = session.store_number().ok_or(AppError::Forbidden)?.to_string();

    let company = company_of(&state.db, &store_number).await?;
    build(&state.db, Some(store_number), Some(company), query).await
}

/// Fetches the entry set, runs the ledger fold, and renders in the
/// requested format (JSON view, CSV, or printable document).
async fn build(
    pool: &PgPool,
    store_number: Option<String>,
    company_name: Option<String>,
    query: StatementQuery,
) -> Result<Response> {
    if query.from > query.to {
        return Err(AppError::Validation("'from' must not be after 'to'".into()));
    }
    let from = Utc.timestamp_nanos(query.from);
    let to = Utc.timestamp_nanos(query.to);

    let entries = fetch_entries(pool, store_number.as_deref(), from, to).await?;
    let view = ledger::reconcile(entries);

    let account = company_name.clone().unwrap_or_else(|| "All Companies".to_string());
    let period = format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"));

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(StatementView {
            store_number,
            company_name,
            from: query.from,
            to: query.to,
            entry_count: view.rows.len(),
            closing_balance: view.closing_balance,
            total_debit: view.total_debit,
            total_credit: view.total_credit,
            amount_due: view.amount_due(),
            rows: view.rows,
        })
        .into_response()),
        Some("csv") => {
            let mut buf = Vec::new();
            csv_export::write_statement(&mut buf, &view)?;
            Ok(attachment(
                "text/csv; charset=utf-8",
                document::statement_filename(&account, &period, "csv"),
                buf,
            ))
        }
        Some("document") => {
            let mut buf = Vec::new();
            document::write_statement(&mut buf, &account, store_number.as_deref(), &period, &view)?;
            Ok(attachment(
                "text/plain; charset=utf-8",
                document::statement_filename(&account, &period, "txt"),
                buf,
            ))
        }
        Some(other) => Err(AppError::Validation(format!(
            "unknown format '{other}'; expected json, csv or document"
        ))),
    }
}

fn attachment(content_type: &str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

#[derive(FromRow)]
struct InvoiceRow {
    delivered_at: DateTime<Utc>,
    invoice_number: String,
    store_number: String,
    company_name: String,
    total_amount: Decimal,
}

#[derive(FromRow)]
struct CreditRow {
    created_at: DateTime<Utc>,
    payment_id: Uuid,
    store_number: String,
    company_name: String,
    amount: Decimal,
}

/// Builds the raw entry set for one window: delivered orders become
/// invoice debits, payments become credits. Bounds are inclusive; the
/// fold's own sort puts the union in order.
async fn fetch_entries(
    pool: &PgPool,
    store_number: Option<&str>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<StatementEntry>> {
    let invoices = sqlx::query_as::<_, InvoiceRow>(
        "SELECT delivered_at, invoice_number, store_number, company_name, total_amount \
         FROM orders \
         WHERE status = $1 AND invoice_number IS NOT NULL \
           AND delivered_at BETWEEN $2 AND $3 \
           AND ($4::text IS NULL OR store_number = $4)",
    )
    .bind(OrderStatus::Delivered)
    .bind(from)
    .bind(to)
    .bind(store_number)
    .fetch_all(pool)
    .await?;

    let payments = sqlx::query_as::<_, CreditRow>(
        "SELECT created_at, payment_id, store_number, company_name, amount \
         FROM payments \
         WHERE created_at BETWEEN $1 AND $2 \
           AND ($3::text IS NULL OR store_number = $3)",
    )
    .bind(from)
    .bind(to)
    .bind(store_number)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(invoices.len() + payments.len());
    for row in invoices {
        entries.push(StatementEntry::invoice(
            row.delivered_at,
            row.invoice_number,
            row.store_number,
            row.company_name,
            row.total_amount,
        ));
    }
    for row in payments {
        entries.push(StatementEntry::payment(
            row.created_at,
            row.payment_id.to_string(),
            row.store_number,
            row.company_name,
            row.amount,
        ));
    }
    Ok(entries)
}

async fn company_of(pool: &PgPool, store_number: &str) -> Result<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT company_name FROM customers WHERE store_number = $1",
    )
    .bind(store_number)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("customer"))
}
