use axum::extract::{Path, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{AppError, Result};
use crate::import::{self, RowError};
use crate::models::product::{ProductInput, UpdateRateRequest};
use crate::models::Product;
use crate::AppState;

/// Result of a sheet upload: how many rows were applied plus every row
/// that failed validation.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub applied: usize,
    pub errors: Vec<RowError>,
}

/// `GET /products/active`: the public storefront catalog.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE active = TRUE ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

/// `GET /products`: full catalog for the back office.
pub async fn list_all(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    session.require(session.is_back_office())?;

    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(products))
}

/// `POST /products/replace`: wholesale catalog replacement.
///
/// Existing orders are unaffected: they carry rate snapshots, not product
/// references.
pub async fn replace(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(items): Json<Vec<ProductInput>>,
) -> Result<Json<Vec<Product>>> {
    session.require_admin()?;

    if items.is_empty() {
        return Err(AppError::Validation("catalog replacement needs at least one product".into()));
    }
    for item in &items {
        item.validate().map_err(AppError::Validation)?;
    }

    let products = replace_catalog(&state, &items).await?;
    info!("catalog replaced with {} products", products.len());
    Ok(Json(products))
}

/// `POST /products/import`: CSV upload with typed row validation.
pub async fn import_csv(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>> {
    session.require_admin()?;

    let parsed = import::parse_products(&body)?;
    if parsed.rows.is_empty() {
        return Err(AppError::Validation(
            "no valid products found; ensure columns are named 'Name', 'Unit', 'Rate'".into(),
        ));
    }

    let applied = replace_catalog(&state, &parsed.rows).await?.len();
    info!("catalog import applied {} rows, {} rejected", applied, parsed.errors.len());
    Ok(Json(ImportSummary { applied, errors: parsed.errors }))
}

/// `POST /products/:id/toggle`: flip a product's active flag.
pub async fn toggle(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    session.require_admin()?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET active = NOT active WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("product"))?;

    info!("product {} ({}) now active={}", product.id, product.name, product.active);
    Ok(Json(product))
}

/// `PUT /products/:id/rate`: edit the current price. Never retroactive.
pub async fn update_rate(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRateRequest>,
) -> Result<Json<Product>> {
    session.require_admin()?;

    if req.rate < Decimal::ZERO {
        return Err(AppError::Validation("rate must not be negative".into()));
    }

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET rate = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.rate)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("product"))?;

    info!("product {} ({}) rate set to {}", product.id, product.name, product.rate);
    Ok(Json(product))
}

/// Replaces the whole catalog in one transaction.
async fn replace_catalog(state: &AppState, items: &[ProductInput]) -> Result<Vec<Product>> {
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

    let mut products = Vec::with_capacity(items.len());
    for item in items {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, rate, unit, active) VALUES ($1, $2, $3, TRUE) RETURNING *",
        )
        .bind(item.name.trim())
        .bind(item.rate)
        .bind(item.unit.trim())
        .fetch_one(&mut *tx)
        .await?;
        products.push(product);
    }

    tx.commit().await?;
    Ok(products)
}
