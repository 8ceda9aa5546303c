use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::{Database, Dialect};
use crate::domain::order::{
    CustomOrder, FulfillmentType, OrderAddOn, OrderError, OrderStatus, PaymentStatus,
};

use super::order_number::OrderNumberGenerator;

// ============================================================================
// Order Store - Repository for custom orders
// ============================================================================
//
// All writes run inside per-operation transactions checked out of the pool.
// The order insert and its add-on lines commit or roll back as one unit;
// a number collision on the unique order_number index triggers a retry with
// a freshly generated number (bounded attempts).
//
// ============================================================================

/// Attempts to place an order before giving up on number collisions.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

const ORDER_COLUMNS: &str = "id, order_number, customer_id, product_code, order_type, servings, \
     message, base_price, addons_total, subtotal, discount_amount, tax_amount, delivery_fee, \
     total_amount, deposit_required, deposit_paid, deposit_paid_at, payment_method, \
     payment_status, balance_due, fulfillment_type, pickup_at, delivery_at, order_status, \
     admin_notes, cancellation_reason, cancelled_by, cancelled_at, assigned_staff, created_at, \
     confirmed_at";

const INSERT_ORDER_SQL: &str = "INSERT INTO custom_orders (
        order_number, customer_id, product_code, order_type, servings, message,
        base_price, addons_total, subtotal, discount_amount, tax_amount, delivery_fee,
        total_amount, deposit_required, deposit_paid, deposit_paid_at, payment_method,
        payment_status, balance_due, fulfillment_type, pickup_at, delivery_at, order_status,
        admin_notes, cancellation_reason, cancelled_by, cancelled_at, assigned_staff,
        created_at, confirmed_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
        $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30)
    RETURNING id";

#[derive(Debug, Clone)]
pub struct OrderStore {
    db: Database,
    numbers: OrderNumberGenerator,
}

impl OrderStore {
    pub fn new(db: Database) -> Self {
        let numbers = OrderNumberGenerator::new(db.clone());
        Self { db, numbers }
    }

    pub fn order_numbers(&self) -> &OrderNumberGenerator {
        &self.numbers
    }

    // ------------------------------------------------------------------
    // Transactional writer
    // ------------------------------------------------------------------

    /// Insert the order and all of its add-on lines as one atomic unit.
    ///
    /// Assigns an order number if the order does not carry one yet, and
    /// stores the backend-assigned row id on the order. If the unique index
    /// rejects the number (two submissions raced on the same date), the
    /// insert is retried with a freshly generated number.
    pub async fn insert(
        &self,
        order: &mut CustomOrder,
        addons: &[OrderAddOn],
    ) -> Result<(), OrderError> {
        if order.order_number.is_empty() {
            order.order_number = self.numbers.next().await;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_insert(order, addons).await {
                Ok(id) => {
                    order.id = Some(id);
                    tracing::info!(
                        order_number = %order.order_number,
                        total_amount = order.total_amount,
                        addon_lines = addons.len(),
                        "✅ Order persisted"
                    );
                    return Ok(());
                }
                Err(OrderError::Database(e))
                    if is_unique_violation(&e) && attempt < MAX_NUMBER_ATTEMPTS =>
                {
                    let stale = std::mem::take(&mut order.order_number);
                    order.order_number = self.numbers.next().await;
                    tracing::warn!(
                        rejected = %stale,
                        regenerated = %order.order_number,
                        attempt = attempt,
                        "Order number collision, retrying with a fresh number"
                    );
                }
                Err(OrderError::Database(e)) if is_unique_violation(&e) => {
                    return Err(OrderError::OrderNumberExhausted(attempt));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_insert(&self, order: &CustomOrder, addons: &[OrderAddOn]) -> Result<i64, OrderError> {
        let dialect = self.db.dialect();
        let mut tx = self.db.pool().begin().await?;

        let query = sqlx::query(INSERT_ORDER_SQL)
            .bind(&order.order_number)
            .bind(order.customer_id.to_string())
            .bind(&order.product_code)
            .bind(&order.order_type)
            .bind(order.servings)
            .bind(&order.message)
            .bind(order.base_price)
            .bind(order.addons_total)
            .bind(order.subtotal)
            .bind(order.discount_amount)
            .bind(order.tax_amount)
            .bind(order.delivery_fee)
            .bind(order.total_amount);
        let query = dialect.bind_bool(query, order.deposit_required);
        let row = query
            .bind(order.deposit_paid)
            .bind(order.deposit_paid_at.map(|t| t.timestamp()))
            .bind(&order.payment_method)
            .bind(order.payment_status.as_str())
            .bind(order.balance_due)
            .bind(order.fulfillment_type.as_str())
            .bind(order.pickup_at.map(|t| t.timestamp()))
            .bind(order.delivery_at.map(|t| t.timestamp()))
            .bind(order.order_status.as_str())
            .bind(&order.admin_notes)
            .bind(&order.cancellation_reason)
            .bind(&order.cancelled_by)
            .bind(order.cancelled_at.map(|t| t.timestamp()))
            .bind(&order.assigned_staff)
            .bind(order.created_at.timestamp())
            .bind(order.confirmed_at.map(|t| t.timestamp()))
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.try_get("id")?;

        if !addons.is_empty() {
            let mut sql = String::from(
                "INSERT INTO custom_order_addons (order_number, addon_code, addon_category, \
                 quantity, price_modifier, total_addon_price) VALUES ",
            );
            for i in 0..addons.len() {
                if i > 0 {
                    sql.push_str(", ");
                }
                let base = i * 6;
                sql.push_str(&format!(
                    "(${}, ${}, ${}, ${}, ${}, ${})",
                    base + 1,
                    base + 2,
                    base + 3,
                    base + 4,
                    base + 5,
                    base + 6
                ));
            }

            let mut query = sqlx::query(&sql);
            for line in addons {
                query = query
                    .bind(&order.order_number)
                    .bind(&line.addon_code)
                    .bind(&line.addon_category)
                    .bind(line.quantity)
                    .bind(line.price_modifier)
                    .bind(line.total_addon_price);
            }
            query.execute(&mut *tx).await?;
        }

        // Any failure above drops the transaction, rolling everything back.
        tx.commit().await?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Status machine
    // ------------------------------------------------------------------

    /// Move the order one step along its lifecycle. Illegal transitions are
    /// rejected against the current persisted status; reaching CONFIRMED
    /// stamps the confirmation timestamp.
    pub async fn update_status(
        &self,
        order_number: &str,
        new_status: OrderStatus,
    ) -> Result<(), OrderError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query("SELECT order_status FROM custom_orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(OrderError::NotFound(order_number.to_string()));
        };
        let current = OrderStatus::parse(&row.try_get::<String, _>("order_status")?)?;

        if !current.can_transition_to(new_status) {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        if new_status == OrderStatus::Confirmed {
            sqlx::query(
                "UPDATE custom_orders SET order_status = $1, confirmed_at = $2 \
                 WHERE order_number = $3",
            )
            .bind(new_status.as_str())
            .bind(Utc::now().timestamp())
            .bind(order_number)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("UPDATE custom_orders SET order_status = $1 WHERE order_number = $2")
                .bind(new_status.as_str())
                .bind(order_number)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            order_number = %order_number,
            from = current.as_str(),
            to = new_status.as_str(),
            "Order status updated"
        );
        Ok(())
    }

    /// Cancel the order regardless of its prior status, recording the
    /// reason, the cancelling operator, and the cancellation timestamp.
    pub async fn cancel_order(
        &self,
        order_number: &str,
        reason: &str,
        cancelled_by: &str,
    ) -> Result<(), OrderError> {
        let updated = sqlx::query(
            "UPDATE custom_orders SET order_status = $1, cancellation_reason = $2, \
             cancelled_by = $3, cancelled_at = $4 WHERE order_number = $5",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(reason)
        .bind(cancelled_by)
        .bind(Utc::now().timestamp())
        .bind(order_number)
        .execute(self.db.pool())
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }
        tracing::info!(order_number = %order_number, reason = %reason, "Order cancelled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Payment ledger
    // ------------------------------------------------------------------

    /// Record a deposit payment: one statement sets the paid amount,
    /// recomputes the balance against the persisted total, stamps the
    /// payment timestamp, and moves the payment status.
    ///
    /// `amount_paid` is not checked against the order total.
    pub async fn record_deposit(
        &self,
        order_number: &str,
        new_status: PaymentStatus,
        amount_paid: f64,
    ) -> Result<(), OrderError> {
        let updated = sqlx::query(
            "UPDATE custom_orders SET deposit_paid = $1, balance_due = total_amount - $2, \
             deposit_paid_at = $3, payment_status = $4 WHERE order_number = $5",
        )
        .bind(amount_paid)
        .bind(amount_paid)
        .bind(Utc::now().timestamp())
        .bind(new_status.as_str())
        .bind(order_number)
        .execute(self.db.pool())
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }
        tracing::info!(
            order_number = %order_number,
            amount_paid = amount_paid,
            payment_status = new_status.as_str(),
            "Deposit recorded"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Administrative updates
    // ------------------------------------------------------------------

    pub async fn update_admin_notes(
        &self,
        order_number: &str,
        notes: &str,
    ) -> Result<(), OrderError> {
        let updated = sqlx::query("UPDATE custom_orders SET admin_notes = $1 WHERE order_number = $2")
            .bind(notes)
            .bind(order_number)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }
        Ok(())
    }

    pub async fn assign_staff(&self, order_number: &str, staff: &str) -> Result<(), OrderError> {
        let updated =
            sqlx::query("UPDATE custom_orders SET assigned_staff = $1 WHERE order_number = $2")
                .bind(staff)
                .bind(order_number)
                .execute(self.db.pool())
                .await?
                .rows_affected();
        if updated == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<CustomOrder>, OrderError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM custom_orders WHERE order_number = $1");
        let row = sqlx::query(&sql)
            .bind(order_number)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(|r| row_to_order(self.db.dialect(), &r)).transpose()
    }

    pub async fn find_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<CustomOrder>, OrderError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM custom_orders WHERE customer_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id.to_string())
            .fetch_all(self.db.pool())
            .await?;
        rows.iter()
            .map(|r| row_to_order(self.db.dialect(), r))
            .collect()
    }

    pub async fn find_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<CustomOrder>, OrderError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM custom_orders WHERE order_status = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(self.db.pool())
            .await?;
        rows.iter()
            .map(|r| row_to_order(self.db.dialect(), r))
            .collect()
    }

    /// Add-on lines for one order, in insertion order.
    pub async fn addons(&self, order_number: &str) -> Result<Vec<OrderAddOn>, OrderError> {
        let rows = sqlx::query(
            "SELECT id, order_number, addon_code, addon_category, quantity, price_modifier, \
             total_addon_price FROM custom_order_addons WHERE order_number = $1 ORDER BY id",
        )
        .bind(order_number)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(row_to_addon).collect()
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Hard-delete the order. Add-on lines go first in the same transaction
    /// to satisfy the foreign key.
    pub async fn delete(&self, order_number: &str) -> Result<(), OrderError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM custom_order_addons WHERE order_number = $1")
            .bind(order_number)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM custom_orders WHERE order_number = $1")
            .bind(order_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }

        tx.commit().await?;
        tracing::info!(order_number = %order_number, "Order deleted");
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => {
            db.is_unique_violation()
                || db.message().contains("UNIQUE")
                || db.message().contains("duplicate key")
        }
        _ => false,
    }
}

// ------------------------------------------------------------------
// Row decoding
// ------------------------------------------------------------------

fn row_to_order(dialect: Dialect, row: &AnyRow) -> Result<CustomOrder, OrderError> {
    let customer_raw: String = row.try_get("customer_id")?;
    let customer_id = Uuid::parse_str(&customer_raw).map_err(|_| OrderError::InvalidValue {
        column: "customer_id",
        value: customer_raw,
    })?;

    Ok(CustomOrder {
        id: Some(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        customer_id,
        product_code: row.try_get("product_code")?,
        order_type: row.try_get("order_type")?,
        servings: row.try_get("servings")?,
        message: row.try_get("message")?,
        base_price: row.try_get("base_price")?,
        addons_total: row.try_get("addons_total")?,
        subtotal: row.try_get("subtotal")?,
        discount_amount: row.try_get("discount_amount")?,
        tax_amount: row.try_get("tax_amount")?,
        delivery_fee: row.try_get("delivery_fee")?,
        total_amount: row.try_get("total_amount")?,
        deposit_required: dialect.read_bool(row, "deposit_required")?,
        deposit_paid: row.try_get("deposit_paid")?,
        deposit_paid_at: opt_timestamp(row, "deposit_paid_at")?,
        payment_method: row.try_get("payment_method")?,
        payment_status: PaymentStatus::parse(&row.try_get::<String, _>("payment_status")?)?,
        balance_due: row.try_get("balance_due")?,
        fulfillment_type: FulfillmentType::parse(&row.try_get::<String, _>("fulfillment_type")?)?,
        pickup_at: opt_timestamp(row, "pickup_at")?,
        delivery_at: opt_timestamp(row, "delivery_at")?,
        order_status: OrderStatus::parse(&row.try_get::<String, _>("order_status")?)?,
        admin_notes: row.try_get("admin_notes")?,
        cancellation_reason: row.try_get("cancellation_reason")?,
        cancelled_by: row.try_get("cancelled_by")?,
        cancelled_at: opt_timestamp(row, "cancelled_at")?,
        assigned_staff: row.try_get("assigned_staff")?,
        created_at: timestamp(row, "created_at")?,
        confirmed_at: opt_timestamp(row, "confirmed_at")?,
    })
}

fn row_to_addon(row: &AnyRow) -> Result<OrderAddOn, OrderError> {
    Ok(OrderAddOn {
        id: Some(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        addon_code: row.try_get("addon_code")?,
        addon_category: row.try_get("addon_category")?,
        quantity: row.try_get("quantity")?,
        price_modifier: row.try_get("price_modifier")?,
        total_addon_price: row.try_get("total_addon_price")?,
    })
}

fn timestamp(row: &AnyRow, column: &'static str) -> Result<DateTime<Utc>, OrderError> {
    let secs: i64 = row.try_get(column)?;
    DateTime::from_timestamp(secs, 0).ok_or(OrderError::InvalidValue {
        column,
        value: secs.to_string(),
    })
}

fn opt_timestamp(row: &AnyRow, column: &'static str) -> Result<Option<DateTime<Utc>>, OrderError> {
    let secs: Option<i64> = row.try_get(column)?;
    secs.map(|s| {
        DateTime::from_timestamp(s, 0).ok_or(OrderError::InvalidValue {
            column,
            value: s.to_string(),
        })
    })
    .transpose()
}
