use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status enumeration.
///
/// The lifecycle is a fixed forward chain with no backward transitions,
/// no skipping and no cancellation:
/// pending -> accepted -> on_the_way -> delivered (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sqlx(rename = "pending")]
    Pending,

    #[sqlx(rename = "accepted")]
    Accepted,

    #[sqlx(rename = "on_the_way")]
    OnTheWay,

    #[sqlx(rename = "delivered")]
    Delivered,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Accepted => write!(f, "accepted"),
            OrderStatus::OnTheWay => write!(f, "on_the_way"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "on_the_way" => Ok(OrderStatus::OnTheWay),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl OrderStatus {
    /// Initial status of a freshly placed order.
    pub fn initial() -> OrderStatus {
        OrderStatus::Pending
    }

    /// The single legal successor, or `None` once delivered.
    ///
    /// Exactly one forward transition is offered at a time; the status
    /// update endpoint accepts a request only when the requested status
    /// equals this value.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::OnTheWay),
            OrderStatus::OnTheWay => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// UI action label for the transition out of this status, if any.
    pub fn action_label(&self) -> Option<&'static str> {
        match self {
            OrderStatus::Pending => Some("Accept"),
            OrderStatus::Accepted => Some("On the Way"),
            OrderStatus::OnTheWay => Some("Mark Delivered"),
            OrderStatus::Delivered => None,
        }
    }

    /// Item edits are permitted until the order is delivered; after that
    /// the order is frozen and carries an invoice number.
    pub fn is_editable(&self) -> bool {
        !matches!(self, OrderStatus::Delivered)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Checks a requested transition; `Ok` only for the single legal
    /// forward step.
    pub fn validate_transition(&self, requested: OrderStatus) -> Result<(), String> {
        match self.next() {
            Some(next) if next == requested => Ok(()),
            Some(next) => Err(format!(
                "illegal transition {self} -> {requested}; next allowed status is {next}"
            )),
            None => Err("delivered orders are terminal".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_is_fixed() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Accepted));
        assert_eq!(OrderStatus::Accepted.next(), Some(OrderStatus::OnTheWay));
        assert_eq!(OrderStatus::OnTheWay.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
    }

    #[test]
    fn exactly_one_action_until_terminal() {
        assert_eq!(OrderStatus::Pending.action_label(), Some("Accept"));
        assert_eq!(OrderStatus::Accepted.action_label(), Some("On the Way"));
        assert_eq!(OrderStatus::OnTheWay.action_label(), Some("Mark Delivered"));
        assert_eq!(OrderStatus::Delivered.action_label(), None);
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let err = OrderStatus::Pending
            .validate_transition(OrderStatus::OnTheWay)
            .unwrap_err();
        assert!(err.contains("illegal transition"));
    }

    #[test]
    fn backward_transition_is_rejected() {
        assert!(OrderStatus::OnTheWay
            .validate_transition(OrderStatus::Accepted)
            .is_err());
    }

    #[test]
    fn delivered_is_terminal_and_frozen() {
        assert!(OrderStatus::Delivered
            .validate_transition(OrderStatus::Pending)
            .is_err());
        assert!(!OrderStatus::Delivered.is_editable());
        assert!(OrderStatus::Pending.is_editable());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::OnTheWay,
            OrderStatus::Delivered,
        ] {
            assert_eq!(s.to_string().parse::<OrderStatus>().unwrap(), s);
        }
    }
}
