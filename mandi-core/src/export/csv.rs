//! CSV rendering of a reconciled statement.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::domain::ledger::LedgerView;
use crate::error::Result;

/// One serialized statement row; balances come from the ledger fold, so
/// the CSV always agrees with the on-screen view.
#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    entry_type: &'a str,
    reference: &'a str,
    store_number: &'a str,
    company_name: &'a str,
    debit: String,
    credit: String,
    balance: String,
}

pub fn write_statement<W: Write>(w: W, view: &LedgerView) -> Result<()> {
    let mut wrt = WriterBuilder::new().has_headers(false).from_writer(w);

    // Written up front so an empty window still yields a valid file.
    wrt.write_record([
        "date",
        "entry_type",
        "reference",
        "store_number",
        "company_name",
        "debit",
        "credit",
        "balance",
    ])?;

    for row in &view.rows {
        let e = &row.entry;
        wrt.serialize(CsvRow {
            date: e.entry_date.format("%Y-%m-%d").to_string(),
            entry_type: &e.entry_type,
            reference: &e.reference_number,
            store_number: &e.store_number,
            company_name: &e.company_name,
            debit: format!("{:.2}", e.debit),
            credit: format!("{:.2}", e.credit),
            balance: format!("{:.2}", row.balance),
        })?;
    }
    wrt.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::reconcile;
    use crate::models::StatementEntry;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn rows_carry_running_balances() {
        let view = reconcile(vec![
            StatementEntry::invoice(
                Utc.timestamp_nanos(86_400_000_000_000),
                "INV-0001".to_string(),
                "S-101".to_string(),
                "Green Leaf Traders".to_string(),
                Decimal::from(100),
            ),
            StatementEntry::payment(
                Utc.timestamp_nanos(172_800_000_000_000),
                "pay-1".to_string(),
                "S-101".to_string(),
                "Green Leaf Traders".to_string(),
                Decimal::from(40),
            ),
        ]);

        let mut buf = Vec::new();
        write_statement(&mut buf, &view).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.trim().lines().collect();

        // Header plus one line per entry.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,entry_type,reference"));
        assert!(lines[1].contains("invoice"));
        assert!(lines[1].ends_with("100.00,0.00,100.00"));
        assert!(lines[2].contains("payment"));
        assert!(lines[2].ends_with("0.00,40.00,60.00"));
    }

    #[test]
    fn empty_view_is_header_only() {
        let view = reconcile(vec![]);
        let mut buf = Vec::new();
        write_statement(&mut buf, &view).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim().lines().count(), 1);
    }
}
