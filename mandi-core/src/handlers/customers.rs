use std::collections::{HashMap, HashSet};

use axum::extract::{Path, State};
use axum::{Extension, Json};
use sqlx::FromRow;
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{AppError, Result};
use crate::import;
use crate::models::customer::{CustomerInput, CustomerProfile, CustomerResponse};
use crate::models::Customer;
use crate::AppState;

use super::products::ImportSummary;

/// `GET /customers/:store_number`: public pre-login store lookup; no
/// contact or credential data.
pub async fn profile(
    State(state): State<AppState>,
    Path(store_number): Path<String>,
) -> Result<Json<CustomerProfile>> {
    let profile = sqlx::query_as::<_, CustomerProfile>(
        "SELECT store_number, company_name, address, gst_number \
         FROM customers WHERE store_number = $1",
    )
    .bind(&store_number)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("customer"))?;

    Ok(Json(profile))
}

/// `GET /customers`: full customer list for the back office.
pub async fn list(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>> {
    session.require(session.is_admin() || session.can_manage_accounts())?;

    let customers = sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers ORDER BY store_number",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

/// `PUT /customers`: wholesale customer list replacement.
pub async fn replace(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    Json(inputs): Json<Vec<CustomerInput>>,
) -> Result<Json<Vec<CustomerResponse>>> {
    session.require_admin()?;

    if inputs.is_empty() {
        return Err(AppError::Validation("customer replacement needs at least one row".into()));
    }
    for input in &inputs {
        input.validate().map_err(AppError::Validation)?;
    }

    let customers = replace_customer_list(&state, &inputs).await?;
    info!("customer list replaced with {} stores", customers.len());
    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

/// `POST /customers/import`: CSV upload with typed row validation.
pub async fn import_csv(
    Extension(session): Extension<AuthSession>,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>> {
    session.require_admin()?;

    let parsed = import::parse_customers(&body)?;
    if parsed.rows.is_empty() {
        return Err(AppError::Validation(
            "no valid customers found; check column headers match the template".into(),
        ));
    }

    let applied = replace_customer_list(&state, &parsed.rows).await?.len();
    info!("customer import applied {} rows, {} rejected", applied, parsed.errors.len());
    Ok(Json(ImportSummary { applied, errors: parsed.errors }))
}

#[derive(FromRow)]
struct StoredHash {
    store_number: String,
    password_hash: String,
}

/// Replaces the customer list in one transaction.
///
/// Passwords arrive in plaintext and are hashed here; an empty password
/// keeps the hash already stored for that store number. A brand-new store
/// with no password is rejected before anything is written.
async fn replace_customer_list(
    state: &AppState,
    inputs: &[CustomerInput],
) -> Result<Vec<Customer>> {
    let mut seen = HashSet::new();
    for input in inputs {
        if !seen.insert(input.store_number.trim()) {
            return Err(AppError::Validation(format!(
                "duplicate store number {} in upload",
                input.store_number
            )));
        }
    }

    let mut tx = state.db.begin().await?;

    let existing: HashMap<String, String> = sqlx::query_as::<_, StoredHash>(
        "SELECT store_number, password_hash FROM customers",
    )
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|row| (row.store_number, row.password_hash))
    .collect();

    sqlx::query("DELETE FROM customers").execute(&mut *tx).await?;

    let mut customers = Vec::with_capacity(inputs.len());
    for input in inputs {
        let store = input.store_number.trim();
        let password_hash = if input.password.trim().is_empty() {
            existing.get(store).cloned().ok_or_else(|| {
                AppError::Validation(format!("new store {store} needs a password"))
            })?
        } else {
            bcrypt::hash(input.password.trim(), bcrypt::DEFAULT_COST)?
        };

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers \
             (store_number, name, phone, company_name, address, gst_number, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(store)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(input.company_name.trim())
        .bind(input.address.trim())
        .bind(input.gst_number.as_deref().map(str::trim))
        .bind(input.email.trim())
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;
        customers.push(customer);
    }

    tx.commit().await?;
    Ok(customers)
}
