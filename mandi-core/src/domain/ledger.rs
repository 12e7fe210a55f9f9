//! Statement reconciliation: turns an unordered set of statement entries
//! into a chronologically ordered view with a running balance.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::StatementEntry;

/// One reconciled statement row: the entry plus the running balance
/// *after* applying it.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    #[serde(flatten)]
    pub entry: StatementEntry,
    pub balance: Decimal,
}

/// The reconciled statement for one query window.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub rows: Vec<LedgerRow>,
    /// Running balance after the last entry; 0 for an empty window.
    /// Positive means amount due from the customer.
    pub closing_balance: Decimal,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl LedgerView {
    /// Whether the closing position is money owed by the customer.
    pub fn amount_due(&self) -> bool {
        self.closing_balance > Decimal::ZERO
    }
}

/// Sorts entries ascending by entry date and folds the running balance:
/// `balance += debit - credit`. Debits (invoices) increase the amount the
/// customer owes, credits (payments) decrease it.
///
/// The sort is stable: entries with equal dates keep the order the backend
/// query returned them in. The fold is pure: reconciling the same input
/// twice yields identical output. Callers pass entries already filtered to
/// the requested date window; this function never filters, only orders and
/// accumulates.
///
/// # Arguments
///
/// * `entries` - the raw entry set for one scope and date window, in any
///   order
///
/// # Returns
///
/// Returns a `LedgerView` with one row per entry (entry plus running
/// balance), the closing balance, and the debit/credit totals.
pub fn reconcile(mut entries: Vec<StatementEntry>) -> LedgerView {
    entries.sort_by_key(|e| e.entry_date);

    let mut balance = Decimal::ZERO;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    let rows = entries
        .into_iter()
        .map(|entry| {
            balance += entry.debit - entry.credit;
            total_debit += entry.debit;
            total_credit += entry.credit;
            LedgerRow { entry, balance }
        })
        .collect();

    LedgerView {
        rows,
        closing_balance: balance,
        total_debit,
        total_credit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(nanos: i64, debit: &str, credit: &str) -> StatementEntry {
        StatementEntry {
            entry_date: Utc.timestamp_nanos(nanos),
            entry_type: if credit == "0" { "invoice" } else { "payment" }.to_string(),
            reference_number: format!("REF-{nanos}"),
            store_number: "S-101".to_string(),
            company_name: "Green Leaf Traders".to_string(),
            debit: Decimal::from_str_exact(debit).unwrap(),
            credit: Decimal::from_str_exact(credit).unwrap(),
        }
    }

    #[test]
    fn empty_input_closes_at_zero() {
        let view = reconcile(vec![]);
        assert!(view.rows.is_empty());
        assert_eq!(view.closing_balance, Decimal::ZERO);
        assert!(!view.amount_due());
    }

    #[test]
    fn fold_accumulates_debits_minus_credits() {
        let view = reconcile(vec![entry(1, "100", "0"), entry(2, "0", "40")]);
        let balances: Vec<_> = view.rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![Decimal::from(100), Decimal::from(60)]);
        assert_eq!(view.closing_balance, Decimal::from(60));
        assert!(view.amount_due());
    }

    #[test]
    fn input_order_does_not_matter() {
        let sorted = reconcile(vec![entry(1, "100", "0"), entry(2, "0", "100")]);
        let shuffled = reconcile(vec![entry(2, "0", "100"), entry(1, "100", "0")]);

        let a: Vec<_> = sorted.rows.iter().map(|r| (r.entry.clone(), r.balance)).collect();
        let b: Vec<_> = shuffled.rows.iter().map(|r| (r.entry.clone(), r.balance)).collect();
        assert_eq!(a, b);
        assert_eq!(sorted.closing_balance, Decimal::ZERO);
        assert!(!sorted.amount_due());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let input = vec![entry(3, "50", "0"), entry(1, "20", "0"), entry(2, "0", "10")];
        let first = reconcile(input.clone());
        let second = reconcile(input);
        let a: Vec<_> = first.rows.iter().map(|r| r.balance).collect();
        let b: Vec<_> = second.rows.iter().map(|r| r.balance).collect();
        assert_eq!(a, b);
        assert_eq!(first.closing_balance, second.closing_balance);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let first = entry(5, "10", "0");
        let second = entry(5, "0", "10");
        let view = reconcile(vec![first.clone(), second.clone()]);
        assert_eq!(view.rows[0].entry, first);
        assert_eq!(view.rows[1].entry, second);
        assert_eq!(view.rows[0].balance, Decimal::from(10));
        assert_eq!(view.rows[1].balance, Decimal::ZERO);
    }

    #[test]
    fn footer_totals_sum_each_side() {
        let view = reconcile(vec![
            entry(1, "100", "0"),
            entry(2, "50", "0"),
            entry(3, "0", "30"),
        ]);
        assert_eq!(view.total_debit, Decimal::from(150));
        assert_eq!(view.total_credit, Decimal::from(30));
        assert_eq!(view.closing_balance, Decimal::from(120));
    }
}
