pub mod customer;
pub mod order;
pub mod payment;
pub mod product;
pub mod statement;
pub mod sub_user;

pub use customer::Customer;
pub use order::{Order, OrderItem};
pub use payment::Payment;
pub use product::Product;
pub use statement::StatementEntry;
pub use sub_user::{SubUser, SubUserRole};

/// Serde adapter for nanosecond epoch timestamps.
///
/// The service contract speaks `i64` nanoseconds since the epoch for all
/// timestamps (statement ranges, entry dates, order/payment times), while
/// everything internal uses `chrono::DateTime<Utc>`.
pub mod nanos {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let n = i64::deserialize(d)?;
        Ok(Utc.timestamp_nanos(n))
    }
}
