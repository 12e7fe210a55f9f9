use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sqlx(rename = "cash")]
    Cash,
    #[sqlx(rename = "cheque")]
    Cheque,
    #[sqlx(rename = "online")]
    Online,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Cheque => write!(f, "cheque"),
            PaymentMethod::Online => write!(f, "online"),
        }
    }
}

/// A recorded customer payment. Immutable once written; feeds into the
/// ledger as a credit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: Uuid,
    pub store_number: String,
    pub company_name: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    /// Cheque number, only for `cheque` payments.
    pub cheque_details: Option<String>,
    /// UTR reference, only for `online` payments.
    pub utr_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment recording request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddPaymentRequest {
    pub store_number: String,
    pub company_name: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cheque_details: Option<String>,
    #[serde(default)]
    pub utr_details: Option<String>,
}

impl AddPaymentRequest {
    /// Method-specific validation: cheque payments need a cheque number,
    /// online payments need a UTR reference.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_number.trim().is_empty() {
            return Err("store number must not be empty".to_string());
        }
        if self.company_name.trim().is_empty() {
            return Err("company name must not be empty".to_string());
        }
        if self.amount <= Decimal::ZERO {
            return Err("payment amount must be positive".to_string());
        }
        match self.payment_method {
            PaymentMethod::Cheque
                if self.cheque_details.as_deref().unwrap_or("").trim().is_empty() =>
            {
                Err("cheque payments require cheque details".to_string())
            }
            PaymentMethod::Online
                if self.utr_details.as_deref().unwrap_or("").trim().is_empty() =>
            {
                Err("online payments require UTR details".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Payment representation on the wire (nanosecond timestamp).
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub store_number: String,
    pub company_name: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub cheque_details: Option<String>,
    pub utr_details: Option<String>,
    #[serde(with = "crate::models::nanos")]
    pub timestamp: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        PaymentResponse {
            payment_id: p.payment_id,
            store_number: p.store_number,
            company_name: p.company_name,
            amount: p.amount,
            payment_method: p.payment_method,
            cheque_details: p.cheque_details,
            utr_details: p.utr_details,
            timestamp: p.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: PaymentMethod) -> AddPaymentRequest {
        AddPaymentRequest {
            store_number: "S-101".to_string(),
            company_name: "Green Leaf Traders".to_string(),
            amount: Decimal::from_str_exact("250.00").unwrap(),
            payment_method: method,
            cheque_details: None,
            utr_details: None,
        }
    }

    #[test]
    fn cheque_without_details_is_rejected() {
        assert!(request(PaymentMethod::Cheque).validate().is_err());
    }

    #[test]
    fn online_without_utr_is_rejected() {
        assert!(request(PaymentMethod::Online).validate().is_err());
    }

    #[test]
    fn cash_needs_no_details() {
        assert!(request(PaymentMethod::Cash).validate().is_ok());
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut req = request(PaymentMethod::Cash);
        req.amount = rust_decimal::Decimal::ZERO;
        assert!(req.validate().is_err());
    }
}
