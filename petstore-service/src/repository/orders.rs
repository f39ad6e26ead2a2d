use chrono::{DateTime, FixedOffset};
use sqlx::SqlitePool;

use crate::{
    error::{DatabaseError, DatabaseOperation, Result},
    models::{ship_date, Order},
};

/// Row shape of the `orders` table; `ship_date` is RFC 3339 text or empty
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    pet_id: i64,
    quantity: i64,
    ship_date: String,
    status: String,
    complete: bool,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            pet_id: row.pet_id,
            quantity: row.quantity,
            ship_date: parse_ship_date(row.id, &row.ship_date),
            status: row.status,
            complete: row.complete,
        }
    }
}

fn format_ship_date(date: Option<&DateTime<FixedOffset>>) -> String {
    date.map(ship_date::format).unwrap_or_default()
}

fn parse_ship_date(order_id: i64, stored: &str) -> Option<DateTime<FixedOffset>> {
    if stored.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(stored) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(order_id, stored, error = %e, "Ignoring unparseable ship date");
            None
        }
    }
}

/// Order persistence
///
/// `pet_id` is stored as given; no check is made that the pet exists.
#[derive(Debug, Clone, Copy)]
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and return the id assigned by the store
    pub async fn insert(&self, order: &Order) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO orders (pet_id, quantity, ship_date, status, complete) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.pet_id)
        .bind(order.quantity)
        .bind(format_ship_date(order.ship_date.as_ref()))
        .bind(&order.status)
        .bind(order.complete)
        .execute(self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Insert))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, pet_id, quantity, ship_date, status, complete FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Query))?;
        Ok(row.map(Order::from))
    }

    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Delete))?;
        Ok(result.rows_affected())
    }
}
