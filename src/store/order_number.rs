use chrono::{NaiveDate, Utc};

use crate::db::Database;

// ============================================================================
// Order Number Generation
// ============================================================================
//
// Order numbers are human-readable and date-scoped: CO-<YYYYMMDD>-<seq>,
// where seq is one more than the count of orders already carrying today's
// prefix. Count-then-insert is not atomic; uniqueness is owned by the UNIQUE
// index on order_number plus the writer's retry loop, which calls back here
// for a fresh number after a collision.
//
// ============================================================================

const ORDER_NUMBER_PREFIX: &str = "CO";

#[derive(Debug, Clone)]
pub struct OrderNumberGenerator {
    db: Database,
}

impl OrderNumberGenerator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Next order number for today.
    pub async fn next(&self) -> String {
        self.next_for_date(Utc::now().date_naive()).await
    }

    /// Next order number for the given date. If the counting query fails the
    /// generator degrades to sequence 1 for the date; a true collision is
    /// still rejected by the unique index at insert time.
    pub async fn next_for_date(&self, date: NaiveDate) -> String {
        let prefix = format!("{}-{}-", ORDER_NUMBER_PREFIX, date.format("%Y%m%d"));

        let sequence = match sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM custom_orders WHERE order_number LIKE $1",
        )
        .bind(format!("{prefix}%"))
        .fetch_one(self.db.pool())
        .await
        {
            Ok(count) => count + 1,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Order number counting query failed, falling back to sequence 1"
                );
                1
            }
        };

        format!("{prefix}{sequence:04}")
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
