//! Printable document and CSV rendering for orders and statements.
//!
//! The layouts mirror the fixed document shape used on the customer side:
//! header band, party details, line-item table, total/closing-balance box,
//! footer. Rendering targets any `io::Write`; handlers collect into a
//! buffer and attach a filename.

pub mod csv;
pub mod document;

const BRAND: &str = "MANDI";
const BRAND_LINE: &str = "FRESH VEGETABLES & PRODUCE";

/// Currency rendering shared by every document.
pub(crate) fn money(amount: rust_decimal::Decimal) -> String {
    format!("Rs. {:.2}", amount)
}

/// Filename-safe company fragment: non-alphanumerics collapse to `_`,
/// truncated to 20 characters.
pub(crate) fn safe_fragment(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(20)
        .collect()
}
