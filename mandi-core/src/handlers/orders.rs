use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::domain::cart;
use crate::domain::lifecycle::OrderStatus;
use crate::error::{AppError, Result};
use crate::export::document;
use crate::models::order::{
    EditItemsRequest, OrderItem, OrderResponse, PlaceOrderRequest, PlaceOrderResponse,
    UpdateStatusRequest,
};
use crate::models::Order;
use crate::AppState;

/// `POST /orders`: atomic order placement.
///
/// The submitted cart is normalized (duplicates merged, empty lines
/// dropped), the total recomputed server-side, and a PO number assigned.
/// Either the whole order is accepted and an id returned, or nothing is
/// written.
pub async fn place(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    let store = session.store_number().ok_or(AppError::Forbidden)?;
    if store != req.store_number {
        return Err(AppError::Forbidden);
    }
    if req.address.trim().is_empty() {
        return Err(AppError::Validation("delivery address must not be empty".into()));
    }

    let items = checked_items(req.items)?;
    let total = cart::order_total(&items);

    let mut tx = state.db.begin().await?;
    let po_number = format!("PO-{:04}", next_counter(&mut tx, "po").await?);
    let order_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO orders \
         (order_id, po_number, status, items, total_amount, payment_method, \
          store_number, company_name, address, gst_number) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(order_id)
    .bind(&po_number)
    .bind(OrderStatus::initial())
    .bind(sqlx::types::Json(&items))
    .bind(total)
    .bind(req.payment_method)
    .bind(req.store_number.trim())
    .bind(req.company_name.trim())
    .bind(req.address.trim())
    .bind(req.gst_number.as_deref().map(str::trim))
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(
        "order {} ({}) placed for store {}: {} lines, total {}",
        order_id,
        po_number,
        store,
        items.len(),
        total
    );
    Ok(Json(PlaceOrderResponse { order_id, po_number }))
}

/// `GET /orders`: all orders, newest first, for the delivery workflow.
pub async fn list_all(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>> {
    session.require(session.can_manage_orders())?;

    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// `GET /orders/store/:store_number`: order history for one store.
pub async fn by_store(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(store_number): Path<String>,
) -> Result<Json<Vec<OrderResponse>>> {
    session.require_store_access(&store_number, session.can_manage_orders())?;

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE store_number = $1 ORDER BY created_at DESC",
    )
    .bind(&store_number)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// `PUT /orders/:id/status`: advance the delivery workflow.
///
/// The server is the authority on the lifecycle: only the single legal
/// forward step is accepted, and the invoice number is assigned in the
/// same transaction when the order reaches `delivered`. A rejected
/// transition changes nothing.
pub async fn update_status(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    session.require(session.can_manage_orders())?;

    let mut tx = state.db.begin().await?;
    let order = lock_order(&mut tx, order_id).await?;

    order
        .status
        .validate_transition(req.status)
        .map_err(AppError::Conflict)?;

    if req.status == OrderStatus::Delivered {
        let invoice_number = format!("INV-{:04}", next_counter(&mut tx, "invoice").await?);
        sqlx::query(
            "UPDATE orders SET status = $2, invoice_number = $3, delivered_at = NOW() \
             WHERE order_id = $1",
        )
        .bind(order_id)
        .bind(req.status)
        .bind(&invoice_number)
        .execute(&mut *tx)
        .await?;
        info!("order {} delivered, invoice {} assigned", order.po_number, invoice_number);
    } else {
        sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
            .bind(order_id)
            .bind(req.status)
            .execute(&mut *tx)
            .await?;
        info!("order {} moved {} -> {}", order.po_number, order.status, req.status);
    }
    tx.commit().await?;

    let updated = fetch_order(&state.db, order_id).await?;
    Ok(Json(OrderResponse::from(updated)))
}

/// `PUT /orders/:id/items`: replace an order's item list.
///
/// Replaces the whole item list atomically and recomputes the stored
/// total. Rejected once the order is delivered.
pub async fn edit_items(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<EditItemsRequest>,
) -> Result<Json<OrderResponse>> {
    session.require(session.can_manage_orders())?;

    let items = checked_items(req.items)?;
    let total = cart::order_total(&items);

    let mut tx = state.db.begin().await?;
    let order = lock_order(&mut tx, order_id).await?;

    if !order.status.is_editable() {
        return Err(AppError::Conflict("delivered orders are frozen".into()));
    }

    sqlx::query("UPDATE orders SET items = $2, total_amount = $3 WHERE order_id = $1")
        .bind(order_id)
        .bind(sqlx::types::Json(&items))
        .bind(total)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("order {} items replaced: {} lines, total {}", order.po_number, items.len(), total);
    let updated = fetch_order(&state.db, order_id).await?;
    Ok(Json(OrderResponse::from(updated)))
}

/// `GET /orders/:id/document`: printable purchase order, or invoice once
/// delivered. The filename encodes the PO/invoice number and store.
pub async fn document(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Response> {
    let order = fetch_order(&state.db, order_id).await?;
    session.require_store_access(&order.store_number, session.can_manage_orders())?;

    let mut buf = Vec::new();
    document::write_order(&mut buf, &order)?;
    let filename = document::order_filename(&order);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        buf,
    )
        .into_response())
}

/// Normalizes a submitted item list and validates what survives.
fn checked_items(items: Vec<OrderItem>) -> Result<Vec<OrderItem>> {
    let items = cart::normalize_items(items);
    if items.is_empty() {
        return Err(AppError::Validation("order must contain at least one item".into()));
    }
    for item in &items {
        if item.product_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "item {} has no product name",
                item.product_id
            )));
        }
        if item.rate < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "item {} has a negative rate",
                item.product_name
            )));
        }
    }
    Ok(items)
}

/// Bumps a named counter and returns the new value. Runs inside the
/// caller's transaction so numbering commits with the order it numbers.
async fn next_counter(conn: &mut PgConnection, name: &str) -> Result<i64> {
    let value: i64 =
        sqlx::query_scalar("UPDATE counters SET value = value + 1 WHERE name = $1 RETURNING value")
            .bind(name)
            .fetch_one(conn)
            .await?;
    Ok(value)
}

/// Loads an order with a row lock for a transition or edit.
async fn lock_order(conn: &mut PgConnection, order_id: Uuid) -> Result<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(conn)
        .await?
        .ok_or(AppError::NotFound("order"))
}

async fn fetch_order(pool: &PgPool, order_id: Uuid) -> Result<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("order"))
}
