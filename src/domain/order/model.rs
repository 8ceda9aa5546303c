use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{FulfillmentType, OrderStatus, PaymentStatus};

// ============================================================================
// Custom Order Model
// ============================================================================
//
// A custom order is a base product plus a variable set of priced add-on
// lines. Monetary fields are plain currency-unit f64 values. Pricing
// invariants maintained by `recalculate`:
//
//   subtotal     = base_price + addons_total
//   total_amount = subtotal - discount_amount + tax_amount + delivery_fee
//   balance_due  = total_amount - deposit_paid
//
// ============================================================================

/// A custom bakery order. `id` is store-assigned on insert; `order_number`
/// is the externally visible identifier and is immutable once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomOrder {
    pub id: Option<i64>,
    pub order_number: String,
    pub customer_id: Uuid,
    pub product_code: String,
    pub order_type: String,
    pub servings: i64,
    pub message: Option<String>,

    // Pricing, all in currency units
    pub base_price: f64,
    pub addons_total: f64,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,

    // Payment
    pub deposit_required: bool,
    pub deposit_paid: f64,
    pub deposit_paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub balance_due: f64,

    // Fulfillment
    pub fulfillment_type: FulfillmentType,
    pub pickup_at: Option<DateTime<Utc>>,
    pub delivery_at: Option<DateTime<Utc>>,

    // Lifecycle
    pub order_status: OrderStatus,
    pub admin_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub assigned_staff: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl CustomOrder {
    /// New PENDING order with zeroed pricing. The caller fills in the priced
    /// fields (or uses `set_addons` + `recalculate`) before inserting.
    pub fn new(customer_id: Uuid, product_code: &str, order_type: &str, servings: i64) -> Self {
        Self {
            id: None,
            order_number: String::new(),
            customer_id,
            product_code: product_code.to_string(),
            order_type: order_type.to_string(),
            servings,
            message: None,
            base_price: 0.0,
            addons_total: 0.0,
            subtotal: 0.0,
            discount_amount: 0.0,
            tax_amount: 0.0,
            delivery_fee: 0.0,
            total_amount: 0.0,
            deposit_required: false,
            deposit_paid: 0.0,
            deposit_paid_at: None,
            payment_method: None,
            payment_status: PaymentStatus::AwaitingDeposit,
            balance_due: 0.0,
            fulfillment_type: FulfillmentType::Pickup,
            pickup_at: None,
            delivery_at: None,
            order_status: OrderStatus::Pending,
            admin_notes: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            assigned_staff: None,
            created_at: Utc::now(),
            confirmed_at: None,
        }
    }

    /// Recompute the derived monetary fields from their parts.
    pub fn recalculate(&mut self) {
        self.subtotal = self.base_price + self.addons_total;
        self.total_amount =
            self.subtotal - self.discount_amount + self.tax_amount + self.delivery_fee;
        self.balance_due = self.total_amount - self.deposit_paid;
    }

    /// Take the add-on lines' prices into the order totals.
    pub fn set_addons(&mut self, lines: &[OrderAddOn]) {
        self.addons_total = lines.iter().map(|l| l.total_addon_price).sum();
        self.recalculate();
    }
}

/// One priced add-on line, exclusively owned by its parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAddOn {
    pub id: Option<i64>,
    pub order_number: String,
    pub addon_code: String,
    pub addon_category: String,
    pub quantity: i64,
    pub price_modifier: f64,
    pub total_addon_price: f64,
}

impl OrderAddOn {
    /// Line priced per unit: total = quantity x price_modifier.
    pub fn per_unit(addon_code: &str, addon_category: &str, quantity: i64, price_modifier: f64) -> Self {
        Self {
            id: None,
            order_number: String::new(),
            addon_code: addon_code.to_string(),
            addon_category: addon_category.to_string(),
            quantity,
            price_modifier,
            total_addon_price: quantity as f64 * price_modifier,
        }
    }

    /// Flat-fee line: the modifier is charged once regardless of quantity.
    pub fn flat_fee(addon_code: &str, addon_category: &str, quantity: i64, price_modifier: f64) -> Self {
        Self {
            id: None,
            order_number: String::new(),
            addon_code: addon_code.to_string(),
            addon_category: addon_category.to_string(),
            quantity,
            price_modifier,
            total_addon_price: price_modifier,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_new_order_defaults() {
        let order = CustomOrder::new(Uuid::new_v4(), "CAKE-CHOC-8", "CUSTOM_CAKE", 12);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::AwaitingDeposit);
        assert_eq!(order.fulfillment_type, FulfillmentType::Pickup);
        assert!(order.id.is_none());
        assert!(order.order_number.is_empty());
    }

    #[test]
    fn test_recalculate_totals() {
        let mut order = CustomOrder::new(Uuid::new_v4(), "CAKE-VAN-10", "CUSTOM_CAKE", 16);
        order.base_price = 500.0;
        order.addons_total = 50.0;
        order.tax_amount = 66.0;
        order.recalculate();

        assert!((order.subtotal - 550.0).abs() < EPS);
        assert!((order.total_amount - 616.0).abs() < EPS);
        assert!((order.balance_due - 616.0).abs() < EPS);
    }

    #[test]
    fn test_recalculate_applies_discount_and_delivery() {
        let mut order = CustomOrder::new(Uuid::new_v4(), "CAKE-RED-6", "CUSTOM_CAKE", 8);
        order.base_price = 200.0;
        order.addons_total = 30.0;
        order.discount_amount = 20.0;
        order.tax_amount = 25.2;
        order.delivery_fee = 15.0;
        order.deposit_paid = 100.0;
        order.recalculate();

        assert!((order.total_amount - 250.2).abs() < EPS);
        assert!((order.balance_due - 150.2).abs() < EPS);
    }

    #[test]
    fn test_per_unit_addon_total() {
        let line = OrderAddOn::per_unit("TOPPER-FLORAL", "DECORATION", 3, 12.5);
        assert!((line.total_addon_price - 37.5).abs() < EPS);
    }

    #[test]
    fn test_flat_fee_addon_ignores_quantity() {
        let line = OrderAddOn::flat_fee("RUSH-SAME-DAY", "SERVICE", 4, 25.0);
        assert!((line.total_addon_price - 25.0).abs() < EPS);
    }

    #[test]
    fn test_set_addons_folds_lines_into_totals() {
        let mut order = CustomOrder::new(Uuid::new_v4(), "CAKE-CHOC-8", "CUSTOM_CAKE", 12);
        order.base_price = 100.0;
        let lines = vec![
            OrderAddOn::per_unit("TOPPER-FLORAL", "DECORATION", 2, 10.0),
            OrderAddOn::flat_fee("RUSH-SAME-DAY", "SERVICE", 1, 30.0),
        ];
        order.set_addons(&lines);

        assert!((order.addons_total - 50.0).abs() < EPS);
        assert!((order.total_amount - 150.0).abs() < EPS);
    }
}
