use std::io::Write;

use chrono::{DateTime, Utc};

use crate::domain::ledger::LedgerView;
use crate::domain::lifecycle::OrderStatus;
use crate::error::Result;
use crate::models::Order;

use super::{money, safe_fragment, BRAND, BRAND_LINE};

const RULE: &str =
    "========================================================================";
const LIGHT_RULE: &str =
    "------------------------------------------------------------------------";

fn date(ts: DateTime<Utc>) -> String {
    ts.format("%d %b %Y").to_string()
}

/// Writes a printable purchase order, or an invoice once the order is
/// delivered and carries an invoice number.
pub fn write_order<W: Write>(mut w: W, order: &Order) -> Result<()> {
    let is_invoice = order.status == OrderStatus::Delivered && order.invoice_number.is_some();
    let title = if is_invoice { "INVOICE" } else { "PURCHASE ORDER" };
    let reference = match (&order.invoice_number, is_invoice) {
        (Some(inv), true) => format!("Invoice #: {inv}"),
        _ => format!("PO #: {}", order.po_number),
    };

    writeln!(w, "{RULE}")?;
    writeln!(w, "{:<38}{:>34}", BRAND, title)?;
    writeln!(w, "{:<38}{:>34}", BRAND_LINE, reference)?;
    writeln!(w, "{:>72}", format!("Date: {}", date(order.created_at)))?;
    writeln!(w, "{RULE}")?;
    writeln!(w)?;

    writeln!(w, "BILL TO:")?;
    writeln!(w, "  {}", order.company_name)?;
    writeln!(w, "  {}", order.address)?;
    if let Some(gst) = &order.gst_number {
        writeln!(w, "  GST: {gst}")?;
    }
    writeln!(w, "  Store #: {}", order.store_number)?;
    writeln!(w, "  Payment: {}", order.payment_method.label())?;
    writeln!(w)?;

    writeln!(w, "{LIGHT_RULE}")?;
    writeln!(
        w,
        "{:>3}  {:<28}{:<8}{:>6}  {:>11}  {:>12}",
        "#", "Product", "Unit", "Qty", "Rate", "Amount"
    )?;
    writeln!(w, "{LIGHT_RULE}")?;
    for (idx, item) in order.items.0.iter().enumerate() {
        writeln!(
            w,
            "{:>3}  {:<28}{:<8}{:>6}  {:>11}  {:>12}",
            idx + 1,
            item.product_name,
            item.unit,
            item.qty,
            money(item.rate),
            money(item.amount()),
        )?;
    }
    writeln!(w, "{LIGHT_RULE}")?;
    writeln!(w, "{:>58}  {:>12}", "TOTAL:", money(order.total_amount))?;
    writeln!(w)?;
    writeln!(w, "{:^72}", format!("Thank you for your business! - {BRAND} {BRAND_LINE}"))?;

    Ok(())
}

/// Filename for an order document: invoice number once delivered,
/// PO number before that, both suffixed with the store number.
pub fn order_filename(order: &Order) -> String {
    match &order.invoice_number {
        Some(inv) if order.status == OrderStatus::Delivered => {
            format!("Invoice_{}_{}.txt", inv, order.store_number)
        }
        _ => format!("PO_{}_{}.txt", order.po_number, order.store_number),
    }
}

/// Writes a printable account statement from a reconciled ledger view.
///
/// `account` is the company (or "All Companies" for the combined view);
/// `store_number` is shown for single-customer statements only.
pub fn write_statement<W: Write>(
    mut w: W,
    account: &str,
    store_number: Option<&str>,
    period: &str,
    view: &LedgerView,
) -> Result<()> {
    writeln!(w, "{RULE}")?;
    writeln!(w, "{:<38}{:>34}", BRAND, "ACCOUNT STATEMENT")?;
    writeln!(w, "{:<38}{:>34}", BRAND_LINE, format!("Period: {period}"))?;
    writeln!(w, "{RULE}")?;
    writeln!(w)?;

    writeln!(w, "ACCOUNT:")?;
    writeln!(w, "  {account}")?;
    if let Some(store) = store_number {
        writeln!(w, "  Store #: {store}")?;
    }
    writeln!(w)?;

    writeln!(w, "{LIGHT_RULE}")?;
    writeln!(
        w,
        "{:<12}{:<9}{:<15}{:>11}  {:>11}  {:>12}",
        "Date", "Type", "Reference", "Debit", "Credit", "Balance"
    )?;
    writeln!(w, "{LIGHT_RULE}")?;
    for row in &view.rows {
        let e = &row.entry;
        writeln!(
            w,
            "{:<12}{:<9}{:<15}{:>11}  {:>11}  {:>12}",
            date(e.entry_date),
            e.entry_type,
            e.reference_number,
            money(e.debit),
            money(e.credit),
            money(row.balance),
        )?;
    }
    writeln!(w, "{LIGHT_RULE}")?;
    writeln!(
        w,
        "{:<36}{:>11}  {:>11}  {:>12}",
        "TOTALS",
        money(view.total_debit),
        money(view.total_credit),
        money(view.closing_balance),
    )?;
    writeln!(w)?;
    let position = if view.amount_due() { "AMOUNT DUE" } else { "NO BALANCE DUE" };
    writeln!(
        w,
        "{:>58}  {:>12}",
        format!("CLOSING BALANCE ({position}):"),
        money(view.closing_balance)
    )?;
    writeln!(w)?;
    writeln!(w, "{:^72}", format!("This is a computer-generated statement. - {BRAND} {BRAND_LINE}"))?;

    Ok(())
}

/// Filename for a statement document, encoding company and period.
pub fn statement_filename(account: &str, period: &str, extension: &str) -> String {
    format!(
        "Statement_{}_{}.{extension}",
        safe_fragment(account),
        period.replace(' ', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::reconcile;
    use crate::models::order::{OrderItem, OrderPaymentMethod};
    use crate::models::StatementEntry;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn order(status: OrderStatus, invoice: Option<&str>) -> Order {
        Order {
            order_id: Uuid::nil(),
            po_number: "PO-0042".to_string(),
            invoice_number: invoice.map(|s| s.to_string()),
            status,
            items: Json(vec![OrderItem {
                product_id: 1,
                product_name: "Tomato".to_string(),
                qty: 5,
                rate: Decimal::from(30),
                unit: "KGS".to_string(),
            }]),
            total_amount: Decimal::from(150),
            payment_method: OrderPaymentMethod::Cod,
            store_number: "S-101".to_string(),
            company_name: "Green Leaf Traders".to_string(),
            address: "12 Market Road".to_string(),
            gst_number: None,
            created_at: Utc.timestamp_nanos(1_700_000_000_000_000_000),
            delivered_at: None,
        }
    }

    #[test]
    fn pending_order_renders_as_purchase_order() {
        let mut buf = Vec::new();
        write_order(&mut buf, &order(OrderStatus::Pending, None)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("PURCHASE ORDER"));
        assert!(text.contains("PO #: PO-0042"));
        assert!(text.contains("Tomato"));
        assert!(text.contains("Rs. 150.00"));
        assert_eq!(
            order_filename(&order(OrderStatus::Pending, None)),
            "PO_PO-0042_S-101.txt"
        );
    }

    #[test]
    fn delivered_order_renders_as_invoice() {
        let delivered = order(OrderStatus::Delivered, Some("INV-0007"));
        let mut buf = Vec::new();
        write_order(&mut buf, &delivered).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("INVOICE"));
        assert!(text.contains("Invoice #: INV-0007"));
        assert_eq!(order_filename(&delivered), "Invoice_INV-0007_S-101.txt");
    }

    #[test]
    fn statement_document_matches_the_fold() {
        let view = reconcile(vec![
            StatementEntry::invoice(
                Utc.timestamp_nanos(1),
                "INV-0001".to_string(),
                "S-101".to_string(),
                "Green Leaf Traders".to_string(),
                Decimal::from(100),
            ),
            StatementEntry::payment(
                Utc.timestamp_nanos(2),
                "pay-1".to_string(),
                "S-101".to_string(),
                "Green Leaf Traders".to_string(),
                Decimal::from(40),
            ),
        ]);
        let mut buf = Vec::new();
        write_statement(&mut buf, "Green Leaf Traders", Some("S-101"), "2024-01-01 to 2024-12-31", &view)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ACCOUNT STATEMENT"));
        assert!(text.contains("INV-0001"));
        assert!(text.contains("AMOUNT DUE"));
        assert!(text.contains("Rs. 60.00"));
    }

    #[test]
    fn statement_filename_sanitizes_the_company() {
        assert_eq!(
            statement_filename("Green Leaf & Sons Trading Co.", "2024-01 to 2024-02", "csv"),
            "Statement_Green_Leaf___Sons_Tr_2024-01_to_2024-02.csv"
        );
    }
}
