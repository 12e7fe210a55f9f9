use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog product.
///
/// `rate` is the *current* price only: orders snapshot the rate at order
/// time, so later edits never alter existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub rate: Decimal,
    pub unit: String,
    /// Only active products are offered to customers.
    pub active: bool,
}

/// Input row for catalog replacement (JSON body or sheet import).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub rate: Decimal,
    pub unit: String,
}

impl ProductInput {
    /// Validation applied before any catalog write.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("product name must not be empty".to_string());
        }
        if self.rate < Decimal::ZERO {
            return Err(format!("product '{}' has a negative rate", self.name));
        }
        if self.unit.trim().is_empty() {
            return Err(format!("product '{}' has no unit", self.name));
        }
        Ok(())
    }
}

/// Rate update request for a single product.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRateRequest {
    pub rate: Decimal,
}
