use serde::Serialize;
use sqlx::Row;

use crate::db::Database;
use crate::domain::order::{OrderError, OrderStatus};

// ============================================================================
// Statistics Aggregator - dashboard numbers over live orders
// ============================================================================
//
// One read-only GROUP BY over every non-cancelled order, recomputed in full
// on each call. No caching; a polling UI owns its own rate limiting.
//
// ============================================================================

/// Aggregates over all orders with status != CANCELLED.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub in_production: i64,
    pub ready: i64,
    pub completed: i64,
    pub total_revenue: f64,
    pub total_deposits: f64,
    pub total_balance_due: f64,
}

#[derive(Debug, Clone)]
pub struct StatisticsAggregator {
    db: Database,
}

impl StatisticsAggregator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn collect(&self) -> Result<OrderStatistics, OrderError> {
        let rows = sqlx::query(
            "SELECT order_status, COUNT(*) AS orders, SUM(total_amount) AS revenue, \
             SUM(deposit_paid) AS deposits, SUM(balance_due) AS balance \
             FROM custom_orders WHERE order_status <> $1 GROUP BY order_status",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .fetch_all(self.db.pool())
        .await?;

        let mut stats = OrderStatistics::default();
        for row in rows {
            let status = OrderStatus::parse(&row.try_get::<String, _>("order_status")?)?;
            let orders: i64 = row.try_get("orders")?;
            stats.total_orders += orders;
            stats.total_revenue += row.try_get::<f64, _>("revenue")?;
            stats.total_deposits += row.try_get::<f64, _>("deposits")?;
            stats.total_balance_due += row.try_get::<f64, _>("balance")?;
            match status {
                OrderStatus::Pending => stats.pending = orders,
                OrderStatus::Confirmed => stats.confirmed = orders,
                OrderStatus::InProduction => stats.in_production = orders,
                OrderStatus::Ready => stats.ready = orders,
                OrderStatus::Completed => stats.completed = orders,
                // Filtered out by the WHERE clause
                OrderStatus::Cancelled => {}
            }
        }
        Ok(stats)
    }
}
