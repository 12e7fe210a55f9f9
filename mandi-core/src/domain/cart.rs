//! Cart/order assembly: accumulates catalog selections into a coherent
//! item list before submission.

use rust_decimal::Decimal;

use crate::models::OrderItem;

/// Client-style cart with merge-by-product semantics.
///
/// Lines are keyed by product id: adding a product already in the cart
/// increments its quantity, and a quantity below 1 removes the line
/// entirely, so zero/negative-quantity lines never exist.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<OrderItem>,
}

impl Cart {
    pub fn new() -> Cart {
        Cart::default()
    }

    /// Adds an item, merging into an existing line for the same product.
    /// Items with a non-positive quantity are ignored.
    pub fn add(&mut self, item: OrderItem) {
        if item.qty < 1 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product_id == item.product_id) {
            Some(line) => line.qty += item.qty,
            None => self.lines.push(item),
        }
    }

    /// Sets a line's quantity; dropping below 1 removes the line.
    pub fn set_qty(&mut self, product_id: i64, qty: i64) {
        if qty < 1 {
            self.lines.retain(|l| l.product_id != product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.qty = qty;
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Advisory client-side subtotal: Σ(qty × rate) over all lines. The
    /// backend recomputes and stores the authoritative total on submit.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(OrderItem::amount).sum()
    }

    /// Total unit count across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[OrderItem] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<OrderItem> {
        self.lines
    }
}

/// Normalizes a submitted item list the same way the cart would have
/// built it: duplicate products merged, non-positive quantities dropped.
/// Runs on every place-order and edit-items payload so the stored order
/// never contains duplicate or empty lines.
pub fn normalize_items(items: Vec<OrderItem>) -> Vec<OrderItem> {
    let mut cart = Cart::new();
    for item in items {
        cart.add(item);
    }
    cart.into_lines()
}

/// Authoritative order total over a normalized item list.
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i64, qty: i64, rate: &str) -> OrderItem {
        OrderItem {
            product_id,
            product_name: format!("Product {product_id}"),
            qty,
            rate: Decimal::from_str_exact(rate).unwrap(),
            unit: "KGS".to_string(),
        }
    }

    #[test]
    fn adding_same_product_merges_quantities() {
        let mut cart = Cart::new();
        cart.add(item(1, 2, "30"));
        cart.add(item(1, 3, "30"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 5);
    }

    #[test]
    fn quantity_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add(item(1, 2, "30"));
        cart.add(item(2, 1, "50"));
        cart.set_qty(1, 0);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product_id, 2);
        assert_eq!(cart.subtotal(), Decimal::from(50));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn subtotal_is_sum_of_qty_times_rate() {
        let mut cart = Cart::new();
        cart.add(item(1, 2, "30.50"));
        cart.add(item(2, 3, "10"));
        assert_eq!(cart.subtotal(), Decimal::from_str_exact("91.00").unwrap());
    }

    #[test]
    fn normalize_merges_and_drops_empty_lines() {
        let normalized = normalize_items(vec![
            item(1, 2, "30"),
            item(2, 0, "99"),
            item(1, 3, "30"),
            item(3, -1, "10"),
        ]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].product_id, 1);
        assert_eq!(normalized[0].qty, 5);
        assert_eq!(order_total(&normalized), Decimal::from(150));
    }

    #[test]
    fn line_rate_is_a_snapshot() {
        // The cart copies the rate it was given; nothing ever re-reads the
        // catalog for existing lines.
        let mut cart = Cart::new();
        let before = item(1, 1, "30");
        cart.add(before.clone());
        let later_catalog_rate = Decimal::from(99);
        assert_ne!(cart.lines()[0].rate, later_catalog_rate);
        assert_eq!(cart.lines()[0].rate, before.rate);
    }
}
