use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Customer (store) account.
///
/// Maps to the `customers` table. The store number is the natural key used
/// everywhere (login, orders, payments, statements).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub store_number: String,

    /// Contact person name.
    pub name: String,

    pub phone: String,

    pub company_name: String,

    pub address: String,

    pub gst_number: Option<String>,

    pub email: String,

    /// Bcrypt hashed login password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input row for customer list replacement (JSON body or sheet import).
///
/// `password` arrives in plaintext and is hashed on write; an empty
/// password on a store number that already exists keeps the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInput {
    pub store_number: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub company_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gst_number: Option<String>,
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CustomerInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.store_number.trim().is_empty() {
            return Err("store number must not be empty".to_string());
        }
        if self.email.trim().is_empty() {
            return Err(format!("store {} has no email", self.store_number));
        }
        if self.company_name.trim().is_empty() {
            return Err(format!("store {} has no company name", self.store_number));
        }
        Ok(())
    }
}

/// Public store lookup used before login: no contact or credential data.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerProfile {
    pub store_number: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
}

/// Customer representation returned to admin screens.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    pub store_number: String,
    pub name: String,
    pub phone: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        CustomerResponse {
            store_number: c.store_number,
            name: c.name,
            phone: c.phone,
            company_name: c.company_name,
            address: c.address,
            gst_number: c.gst_number,
            email: c.email,
            created_at: c.created_at,
        }
    }
}
