use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single row of an account statement, as produced by the statement
/// queries: a delivered order becomes an invoice debit, a recorded payment
/// becomes a credit.
///
/// Entries are immutable snapshots; the ledger fold sorts and accumulates
/// them but never mutates them. At most one of `debit`/`credit` is nonzero
/// in normal use, though the model does not enforce exclusivity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementEntry {
    /// Nanosecond epoch timestamp on the wire.
    #[serde(with = "crate::models::nanos")]
    pub entry_date: DateTime<Utc>,

    /// "invoice" or "payment".
    pub entry_type: String,

    /// Invoice number for debits, payment id for credits.
    pub reference_number: String,

    pub store_number: String,

    pub company_name: String,

    /// Amount owed by the customer; increases the running balance.
    pub debit: Decimal,

    /// Amount paid by the customer; decreases the running balance.
    pub credit: Decimal,
}

impl StatementEntry {
    pub fn invoice(
        entry_date: DateTime<Utc>,
        reference_number: String,
        store_number: String,
        company_name: String,
        amount: Decimal,
    ) -> Self {
        StatementEntry {
            entry_date,
            entry_type: "invoice".to_string(),
            reference_number,
            store_number,
            company_name,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn payment(
        entry_date: DateTime<Utc>,
        reference_number: String,
        store_number: String,
        company_name: String,
        amount: Decimal,
    ) -> Self {
        StatementEntry {
            entry_date,
            entry_type: "payment".to_string(),
            reference_number,
            store_number,
            company_name,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// Date-range query for statement endpoints.
///
/// `from`/`to` are inclusive nanosecond epoch bounds; day-boundary
/// conversion (00:00:00 / 23:59:59 local) is the caller's concern.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementQuery {
    pub from: i64,
    pub to: i64,
    /// Optional output format: "csv" or "document" (default JSON).
    pub format: Option<String>,
}
