use crate::domain::order::{FulfillmentType, OrderStatus, PaymentStatus};

use super::dialect::Dialect;

// ============================================================================
// Schema - custom_orders and custom_order_addons
// ============================================================================
//
// DDL is assembled from dialect fragments so the same table shape lands on
// both backends. Statements are idempotent (IF NOT EXISTS) and executed in
// order: orders table, add-ons table, indexes.
//
// ============================================================================

/// All DDL statements for the order core, in execution order.
pub fn statements(dialect: Dialect) -> Vec<String> {
    let order_status_values: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
    let payment_status_values: Vec<&str> = PaymentStatus::ALL.iter().map(|s| s.as_str()).collect();
    let fulfillment_values: Vec<&str> = FulfillmentType::ALL.iter().map(|s| s.as_str()).collect();

    let custom_orders = format!(
        "CREATE TABLE IF NOT EXISTS custom_orders (
            id {pk},
            order_number TEXT NOT NULL UNIQUE,
            customer_id TEXT NOT NULL,
            product_code TEXT NOT NULL,
            order_type TEXT NOT NULL,
            servings INTEGER NOT NULL,
            message TEXT,
            base_price DOUBLE PRECISION NOT NULL DEFAULT 0,
            addons_total DOUBLE PRECISION NOT NULL DEFAULT 0,
            subtotal DOUBLE PRECISION NOT NULL DEFAULT 0,
            discount_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
            tax_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
            delivery_fee DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
            deposit_required {bool_type} NOT NULL DEFAULT {bool_false},
            deposit_paid DOUBLE PRECISION NOT NULL DEFAULT 0,
            deposit_paid_at {ts},
            payment_method TEXT,
            {payment_status},
            balance_due DOUBLE PRECISION NOT NULL DEFAULT 0,
            {fulfillment_type},
            pickup_at {ts},
            delivery_at {ts},
            {order_status},
            admin_notes TEXT,
            cancellation_reason TEXT,
            cancelled_by TEXT,
            cancelled_at {ts},
            assigned_staff TEXT,
            created_at {ts} NOT NULL DEFAULT {now},
            confirmed_at {ts}
        )",
        pk = dialect.autoincrement_pk(),
        bool_type = dialect.boolean_type(),
        bool_false = dialect.boolean_literal(false),
        ts = dialect.timestamp_type(),
        now = dialect.current_timestamp_default(),
        payment_status = dialect.enum_column("payment_status", &payment_status_values),
        fulfillment_type = dialect.enum_column("fulfillment_type", &fulfillment_values),
        order_status = dialect.enum_column("order_status", &order_status_values),
    );

    let custom_order_addons = format!(
        "CREATE TABLE IF NOT EXISTS custom_order_addons (
            id {pk},
            order_number TEXT NOT NULL REFERENCES custom_orders(order_number),
            addon_code TEXT NOT NULL,
            addon_category TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            price_modifier DOUBLE PRECISION NOT NULL,
            total_addon_price DOUBLE PRECISION NOT NULL
        )",
        pk = dialect.autoincrement_pk(),
    );

    vec![
        custom_orders,
        custom_order_addons,
        "CREATE INDEX IF NOT EXISTS idx_custom_orders_customer
         ON custom_orders(customer_id)"
            .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_custom_orders_status
         ON custom_orders(order_status)"
            .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_custom_order_addons_order
         ON custom_order_addons(order_number)"
            .to_string(),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================
