use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::lifecycle::OrderStatus;

/// A single line of an order.
///
/// `rate` is a snapshot of the unit price at order time, not a live
/// reference to the product: later catalog edits never alter past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub qty: i64,
    pub rate: Decimal,
    pub unit: String,
}

impl OrderItem {
    /// Line amount (qty × rate).
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.qty) * self.rate
    }
}

/// How the customer intends to settle the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum OrderPaymentMethod {
    #[sqlx(rename = "cod")]
    Cod,
    #[sqlx(rename = "pay_later")]
    PayLater,
}

impl std::fmt::Display for OrderPaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentMethod::Cod => write!(f, "cod"),
            OrderPaymentMethod::PayLater => write!(f, "pay_later"),
        }
    }
}

impl OrderPaymentMethod {
    /// Human label used on documents.
    pub fn label(&self) -> &'static str {
        match self {
            OrderPaymentMethod::Cod => "Cash on Delivery",
            OrderPaymentMethod::PayLater => "Pay Later",
        }
    }
}

/// Order model mapping to the `orders` table.
///
/// Created by a customer placing an order (status `pending`), advanced
/// strictly forward by admin action, items editable until delivered.
/// Once delivered the order is frozen and carries an invoice number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: Uuid,

    /// Pre-delivery identifier ("PO-0001").
    pub po_number: String,

    /// Assigned exactly once, when the order reaches `delivered`.
    pub invoice_number: Option<String>,

    pub status: OrderStatus,

    /// Line items stored as JSONB.
    pub items: Json<Vec<OrderItem>>,

    /// Server-computed Σ(qty × rate); the stored authority.
    pub total_amount: Decimal,

    pub payment_method: OrderPaymentMethod,

    pub store_number: String,

    pub company_name: String,

    pub address: String,

    pub gst_number: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Set together with the `delivered` transition; the invoice date.
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Order placement request (the whole cart submitted atomically).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub store_number: String,
    pub company_name: String,
    pub address: String,
    #[serde(default)]
    pub gst_number: Option<String>,
    pub items: Vec<OrderItem>,
    pub payment_method: OrderPaymentMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub po_number: String,
}

/// Status transition request; the server accepts only the single legal
/// successor of the order's current status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Full item-list replacement; rejected once the order is delivered.
#[derive(Debug, Clone, Deserialize)]
pub struct EditItemsRequest {
    pub items: Vec<OrderItem>,
}

/// Order representation on the wire (nanosecond timestamp, plain items).
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub po_number: String,
    pub invoice_number: Option<String>,
    pub status: OrderStatus,
    /// Next legal transition, if any; `null` once delivered.
    pub next_status: Option<OrderStatus>,
    /// UI action offered for that transition ("Accept", ...).
    pub next_action: Option<&'static str>,
    pub editable: bool,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment_method: OrderPaymentMethod,
    pub store_number: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
    #[serde(with = "crate::models::nanos")]
    pub timestamp: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_id: order.order_id,
            po_number: order.po_number,
            invoice_number: order.invoice_number,
            status: order.status,
            next_status: order.status.next(),
            next_action: order.status.action_label(),
            editable: order.status.is_editable(),
            items: order.items.0,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            store_number: order.store_number,
            company_name: order.company_name,
            address: order.address,
            gst_number: order.gst_number,
            timestamp: order.created_at,
        }
    }
}
