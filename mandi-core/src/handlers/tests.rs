#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::domain::ledger;
    use crate::domain::lifecycle::OrderStatus;
    use crate::models::order::{OrderItem, OrderPaymentMethod};
    use crate::models::StatementEntry;

    /// Test helper to create a test database pool.
    ///
    /// Requires DATABASE_URL pointing at a database with the migrations
    /// applied.
    async fn create_test_pool() -> Result<PgPool, anyhow::Error> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL not set for tests"))?;

        let pool = PgPool::connect(&database_url).await?;
        Ok(pool)
    }

    fn test_items() -> Vec<OrderItem> {
        vec![
            OrderItem {
                product_id: 1,
                product_name: "Tomato".to_string(),
                qty: 5,
                rate: Decimal::from(30),
                unit: "KGS".to_string(),
            },
            OrderItem {
                product_id: 2,
                product_name: "Coriander".to_string(),
                qty: 2,
                rate: Decimal::from(10),
                unit: "BUNCH".to_string(),
            },
        ]
    }

    async fn insert_order(pool: &PgPool, store: &str, status: OrderStatus) -> Uuid {
        let order_id = Uuid::new_v4();
        let items = test_items();
        let total: Decimal = items.iter().map(|i| Decimal::from(i.qty) * i.rate).sum();
        sqlx::query(
            "INSERT INTO orders \
             (order_id, po_number, status, items, total_amount, payment_method, \
              store_number, company_name, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order_id)
        .bind(format!("PO-T{}", &order_id.to_string()[..8]))
        .bind(status)
        .bind(sqlx::types::Json(&items))
        .bind(total)
        .bind(OrderPaymentMethod::Cod)
        .bind(store)
        .bind("Test Traders")
        .bind("1 Test Lane")
        .execute(pool)
        .await
        .expect("Should insert order");
        order_id
    }

    /// Walks an order through the whole lifecycle at the database level
    /// and verifies the invoice number appears only on delivery.
    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_order_lifecycle_walk() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let store = format!("T-{}", &Uuid::new_v4().to_string()[..8]);
        let order_id = insert_order(&pool, &store, OrderStatus::Pending).await;

        let mut status = OrderStatus::Pending;
        while let Some(next) = status.next() {
            status.validate_transition(next).expect("forward step must be legal");
            if next == OrderStatus::Delivered {
                sqlx::query(
                    "UPDATE orders SET status = $2, invoice_number = $3, delivered_at = NOW() \
                     WHERE order_id = $1",
                )
                .bind(order_id)
                .bind(next)
                .bind(format!("INV-T{}", &order_id.to_string()[..8]))
                .execute(&pool)
                .await
                .expect("Should deliver");
            } else {
                sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
                    .bind(order_id)
                    .bind(next)
                    .execute(&pool)
                    .await
                    .expect("Should advance");
            }
            status = next;
        }

        let (final_status, invoice): (OrderStatus, Option<String>) = sqlx::query_as(
            "SELECT status, invoice_number FROM orders WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .expect("Order should exist");

        assert_eq!(final_status, OrderStatus::Delivered);
        assert!(invoice.is_some(), "delivered order must carry an invoice number");
        assert!(final_status.next().is_none());
    }

    /// A delivered order and a payment for the same store must reconcile
    /// to the expected closing balance.
    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_statement_closing_balance() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let store = format!("T-{}", &Uuid::new_v4().to_string()[..8]);

        let order_id = insert_order(&pool, &store, OrderStatus::Delivered).await;
        sqlx::query(
            "UPDATE orders SET invoice_number = $2, delivered_at = NOW() WHERE order_id = $1",
        )
        .bind(order_id)
        .bind(format!("INV-T{}", &order_id.to_string()[..8]))
        .execute(&pool)
        .await
        .expect("Should set invoice");

        sqlx::query(
            "INSERT INTO payments \
             (payment_id, store_number, company_name, amount, payment_method) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(&store)
        .bind("Test Traders")
        .bind(Decimal::from(70))
        .bind("cash")
        .execute(&pool)
        .await
        .expect("Should insert payment");

        // Entry set the statement endpoints would build for this store.
        let rows: Vec<(chrono::DateTime<Utc>, String, Decimal)> = sqlx::query_as(
            "SELECT delivered_at, invoice_number, total_amount FROM orders \
             WHERE store_number = $1 AND status = 'delivered'",
        )
        .bind(&store)
        .fetch_all(&pool)
        .await
        .expect("Query should succeed");

        let mut entries: Vec<StatementEntry> = rows
            .into_iter()
            .map(|(date, reference, amount)| {
                StatementEntry::invoice(
                    date,
                    reference,
                    store.clone(),
                    "Test Traders".to_string(),
                    amount,
                )
            })
            .collect();

        let payments: Vec<(chrono::DateTime<Utc>, Uuid, Decimal)> = sqlx::query_as(
            "SELECT created_at, payment_id, amount FROM payments WHERE store_number = $1",
        )
        .bind(&store)
        .fetch_all(&pool)
        .await
        .expect("Query should succeed");

        for (date, id, amount) in payments {
            entries.push(StatementEntry::payment(
                date,
                id.to_string(),
                store.clone(),
                "Test Traders".to_string(),
                amount,
            ));
        }

        let view = ledger::reconcile(entries);
        // Order total 170 (5×30 + 2×10) minus the 70 payment.
        assert_eq!(view.closing_balance, Decimal::from(100));
        assert!(view.amount_due());
    }
}
