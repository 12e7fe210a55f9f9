//! Typed CSV import for catalog and customer uploads.
//!
//! Uploaded sheets are parsed against an explicit schema; every bad row is
//! reported with its line number and offending field instead of being
//! silently coerced or dropped. Valid rows are applied only when at least
//! one exists.

use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::customer::CustomerInput;
use crate::models::product::ProductInput;

/// A row that failed schema validation.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based line number in the uploaded file (header is line 1).
    pub line: usize,
    pub field: &'static str,
    pub message: String,
}

/// Outcome of parsing one uploaded sheet.
#[derive(Debug)]
pub struct Import<T> {
    pub rows: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> Import<T> {
    fn new() -> Self {
        Import { rows: Vec::new(), errors: Vec::new() }
    }
}

/// Raw product row as it appears in the sheet; headers match the
/// downloadable template.
#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Unit", default)]
    unit: String,
    #[serde(rename = "Rate", default)]
    rate: String,
}

/// Parses a product sheet with columns `Name`, `Unit`, `Rate`.
///
/// Missing units default to `KGS`, matching the template; rates must be
/// non-negative decimals.
pub fn parse_products(input: &str) -> Result<Import<ProductInput>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input.as_bytes());
    let mut out = Import::new();

    for (idx, record) in rdr.deserialize::<ProductRow>().enumerate() {
        let line = idx + 2;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                out.errors.push(RowError { line, field: "row", message: e.to_string() });
                continue;
            }
        };

        let name = row.name.trim();
        if name.is_empty() {
            out.errors.push(RowError {
                line,
                field: "Name",
                message: "product name is required".to_string(),
            });
            continue;
        }

        let rate = match row.rate.trim() {
            "" => Decimal::ZERO,
            raw => match raw.parse::<Decimal>() {
                Ok(rate) if rate >= Decimal::ZERO => rate,
                Ok(_) => {
                    out.errors.push(RowError {
                        line,
                        field: "Rate",
                        message: "rate must not be negative".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    out.errors.push(RowError {
                        line,
                        field: "Rate",
                        message: format!("not a number: {e}"),
                    });
                    continue;
                }
            },
        };

        let unit = row.unit.trim();
        let unit = if unit.is_empty() { "KGS".to_string() } else { unit.to_uppercase() };

        out.rows.push(ProductInput { name: name.to_string(), rate, unit });
    }

    Ok(out)
}

/// Raw customer row; headers match the downloadable customer template.
#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(rename = "Store Number")]
    store_number: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Phone", default)]
    phone: String,
    #[serde(rename = "Company Name", default)]
    company_name: String,
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "GST Number", default)]
    gst_number: String,
    #[serde(rename = "Email", default)]
    email: String,
    #[serde(rename = "Password", default)]
    password: String,
}

/// Parses a customer sheet with the template columns. Store number,
/// email and company name are required per row; the GST column may be
/// blank.
pub fn parse_customers(input: &str) -> Result<Import<CustomerInput>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input.as_bytes());
    let mut out = Import::new();

    for (idx, record) in rdr.deserialize::<CustomerRow>().enumerate() {
        let line = idx + 2;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                out.errors.push(RowError { line, field: "row", message: e.to_string() });
                continue;
            }
        };

        let candidate = CustomerInput {
            store_number: row.store_number.trim().to_string(),
            name: row.name.trim().to_string(),
            phone: row.phone.trim().to_string(),
            company_name: row.company_name.trim().to_string(),
            address: row.address.trim().to_string(),
            gst_number: match row.gst_number.trim() {
                "" => None,
                gst => Some(gst.to_string()),
            },
            email: row.email.trim().to_string(),
            password: row.password.trim().to_string(),
        };

        if candidate.store_number.is_empty() {
            out.errors.push(RowError {
                line,
                field: "Store Number",
                message: "store number is required".to_string(),
            });
            continue;
        }
        if let Err(message) = candidate.validate() {
            out.errors.push(RowError { line, field: "row", message });
            continue;
        }

        out.rows.push(candidate);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_sheet_parses_valid_rows() {
        let sheet = "Name,Unit,Rate\nTomato,KGS,30\nCoriander,BUNCH,10.50\n";
        let parsed = parse_products(sheet).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows[0].name, "Tomato");
        assert_eq!(parsed.rows[1].rate, Decimal::from_str_exact("10.50").unwrap());
    }

    #[test]
    fn bad_product_rows_are_reported_with_line_numbers() {
        let sheet = "Name,Unit,Rate\n,KGS,30\nOnion,KGS,abc\nPotato,,25\n";
        let parsed = parse_products(sheet).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].name, "Potato");
        assert_eq!(parsed.rows[0].unit, "KGS");
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 2);
        assert_eq!(parsed.errors[0].field, "Name");
        assert_eq!(parsed.errors[1].line, 3);
        assert_eq!(parsed.errors[1].field, "Rate");
    }

    #[test]
    fn negative_rate_is_an_error_not_a_coercion() {
        let sheet = "Name,Unit,Rate\nTomato,KGS,-5\n";
        let parsed = parse_products(sheet).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors[0].field, "Rate");
    }

    #[test]
    fn customer_sheet_requires_key_fields() {
        let sheet = "\
Store Number,Name,Phone,Company Name,Address,GST Number,Email,Password
S-101,Asha,9000000001,Green Leaf Traders,12 Market Road,,asha@greenleaf.in,seedling9
,Ravi,9000000002,Missing Store,Somewhere,,ravi@example.in,pw123456
S-103,Meena,9000000003,Fresh Basket,4 Hill Road,29ABCDE1234F1Z5,,pw123456
";
        let parsed = parse_customers(sheet).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].store_number, "S-101");
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 3);
        assert_eq!(parsed.errors[1].line, 4);
    }

    #[test]
    fn blank_gst_becomes_none() {
        let sheet = "\
Store Number,Name,Phone,Company Name,Address,GST Number,Email,Password
S-101,Asha,9000000001,Green Leaf Traders,12 Market Road,,asha@greenleaf.in,seedling9
";
        let parsed = parse_customers(sheet).unwrap();
        assert_eq!(parsed.rows[0].gst_number, None);
    }
}
