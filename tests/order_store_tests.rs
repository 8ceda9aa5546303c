use std::collections::HashSet;

use uuid::Uuid;

use bakeshop_orders::{
    CustomOrder, Database, DatabaseConfig, FulfillmentType, OrderAddOn, OrderError, OrderStatus,
    OrderStore, PaymentStatus, StatisticsAggregator,
};

// ============================================================================
// Order Store Integration Tests
// ============================================================================
//
// Each test runs against its own in-memory SQLite database through the Any
// pool, pinned to one connection so every operation shares the same
// database.
//
// ============================================================================

const EPS: f64 = 1e-6;

async fn setup() -> (Database, OrderStore) {
    let db = Database::connect(&DatabaseConfig::with_url("sqlite::memory:"))
        .await
        .expect("connect in-memory sqlite");
    db.init_schema().await.expect("init schema");
    let store = OrderStore::new(db.clone());
    (db, store)
}

fn sample_order() -> CustomOrder {
    let mut order = CustomOrder::new(Uuid::new_v4(), "CAKE-CHOC-10", "CUSTOM_CAKE", 16);
    order.base_price = 500.0;
    order.tax_amount = 66.0;
    order.deposit_required = true;
    order.recalculate();
    order
}

fn sample_addons() -> Vec<OrderAddOn> {
    vec![
        OrderAddOn::per_unit("TOPPER-FLORAL", "DECORATION", 2, 15.0),
        OrderAddOn::flat_fee("INSCRIPTION", "DECORATION", 1, 20.0),
    ]
}

/// Insert a fresh order and walk it along legal transitions to `target`.
async fn insert_order_at_status(store: &OrderStore, target: OrderStatus) -> String {
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();

    let path = [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];
    for step in path {
        if order.order_status == target {
            break;
        }
        store.update_status(&order.order_number, step).await.unwrap();
        order.order_status = step;
    }
    order.order_number
}

// ------------------------------------------------------------------
// Insertion and numbering
// ------------------------------------------------------------------

#[tokio::test]
async fn test_insert_assigns_number_and_row_id() {
    let (_db, store) = setup().await;
    let mut order = sample_order();

    store.insert(&mut order, &[]).await.unwrap();

    assert!(order.id.is_some());
    assert!(order.order_number.starts_with("CO-"));
    assert!(order.order_number.ends_with("-0001"));
}

#[tokio::test]
async fn test_order_numbers_are_unique_across_inserts() {
    let (_db, store) = setup().await;

    let mut numbers = HashSet::new();
    for _ in 0..5 {
        let mut order = sample_order();
        store.insert(&mut order, &[]).await.unwrap();
        assert!(numbers.insert(order.order_number.clone()), "duplicate number");
    }
}

#[tokio::test]
async fn test_insert_persists_addon_lines() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    let addons = sample_addons();
    order.set_addons(&addons);

    store.insert(&mut order, &addons).await.unwrap();

    let lines = store.addons(&order.order_number).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].addon_code, "TOPPER-FLORAL");
    assert!((lines[0].total_addon_price - 30.0).abs() < EPS);
    assert!((lines[1].total_addon_price - 20.0).abs() < EPS);
}

#[tokio::test]
async fn test_order_with_zero_addons_is_valid() {
    let (_db, store) = setup().await;
    let mut order = sample_order();

    store.insert(&mut order, &[]).await.unwrap();

    assert!(store.addons(&order.order_number).await.unwrap().is_empty());
    assert!(store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_insert_rolls_back_order_when_addon_insert_fails() {
    let (_db, store) = setup().await;
    let mut order = sample_order();

    // quantity 0 violates the CHECK constraint on custom_order_addons
    let bad_line = OrderAddOn {
        id: None,
        order_number: String::new(),
        addon_code: "TOPPER-FLORAL".to_string(),
        addon_category: "DECORATION".to_string(),
        quantity: 0,
        price_modifier: 15.0,
        total_addon_price: 0.0,
    };

    let result = store.insert(&mut order, &[bad_line]).await;
    assert!(matches!(result, Err(OrderError::Database(_))));

    // The order row must not be visible after the rollback
    assert!(store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .is_none());
    assert!(store.addons(&order.order_number).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_submissions_get_unique_numbers() {
    let (_db, store) = setup().await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut order = sample_order();
            store.insert(&mut order, &[]).await.unwrap();
            order.order_number
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let number = handle.await.unwrap();
        assert!(numbers.insert(number.clone()), "duplicate number {number}");
    }
    assert_eq!(numbers.len(), 4);
}

// ------------------------------------------------------------------
// Round-tripping
// ------------------------------------------------------------------

#[tokio::test]
async fn test_inserted_order_round_trips() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    order.message = Some("Happy birthday Maya!".to_string());
    order.fulfillment_type = FulfillmentType::Delivery;
    order.delivery_fee = 25.0;
    order.recalculate();

    store.insert(&mut order, &[]).await.unwrap();

    let found = store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .expect("order should exist");

    assert_eq!(found.id, order.id);
    assert_eq!(found.customer_id, order.customer_id);
    assert_eq!(found.message.as_deref(), Some("Happy birthday Maya!"));
    assert_eq!(found.order_status, OrderStatus::Pending);
    assert_eq!(found.payment_status, PaymentStatus::AwaitingDeposit);
    assert_eq!(found.fulfillment_type, FulfillmentType::Delivery);
    assert!(found.deposit_required);
    assert!((found.total_amount - order.total_amount).abs() < EPS);
    assert!((found.balance_due - order.balance_due).abs() < EPS);
}

#[tokio::test]
async fn test_find_returns_none_for_unknown_number() {
    let (_db, store) = setup().await;
    assert!(store
        .find_by_order_number("CO-19700101-0001")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_find_by_customer_and_status() {
    let (_db, store) = setup().await;
    let customer = Uuid::new_v4();

    let mut first = sample_order();
    first.customer_id = customer;
    store.insert(&mut first, &[]).await.unwrap();

    let mut second = sample_order();
    second.customer_id = customer;
    store.insert(&mut second, &[]).await.unwrap();

    let mut other = sample_order();
    store.insert(&mut other, &[]).await.unwrap();

    store
        .update_status(&first.order_number, OrderStatus::Confirmed)
        .await
        .unwrap();

    let by_customer = store.find_by_customer(customer).await.unwrap();
    assert_eq!(by_customer.len(), 2);

    let confirmed = store.find_by_status(OrderStatus::Confirmed).await.unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].order_number, first.order_number);

    let pending = store.find_by_status(OrderStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 2);
}

// ------------------------------------------------------------------
// Status machine
// ------------------------------------------------------------------

#[tokio::test]
async fn test_update_status_follows_lifecycle() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        store.update_status(&order.order_number, status).await.unwrap();
        let found = store
            .find_by_order_number(&order.order_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.order_status, status);
    }
}

#[tokio::test]
async fn test_update_status_rejects_skipped_step() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();

    let result = store
        .update_status(&order.order_number, OrderStatus::Ready)
        .await;
    assert!(matches!(
        result,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Ready,
        })
    ));

    // Nothing changed
    let found = store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.order_status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_update_status_unknown_order_is_not_found() {
    let (_db, store) = setup().await;
    let result = store
        .update_status("CO-19700101-0001", OrderStatus::Confirmed)
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_confirming_stamps_confirmed_at() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();
    assert!(order.confirmed_at.is_none());

    store
        .update_status(&order.order_number, OrderStatus::Confirmed)
        .await
        .unwrap();

    let found = store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .unwrap();
    assert!(found.confirmed_at.is_some());
}

#[tokio::test]
async fn test_cancel_from_every_prior_status() {
    let (_db, store) = setup().await;

    for prior in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        let number = insert_order_at_status(&store, prior).await;
        store
            .cancel_order(&number, "Out of stock", "manager")
            .await
            .unwrap();

        let found = store.find_by_order_number(&number).await.unwrap().unwrap();
        assert_eq!(found.order_status, OrderStatus::Cancelled, "from {prior:?}");
        assert_eq!(found.cancellation_reason.as_deref(), Some("Out of stock"));
        assert_eq!(found.cancelled_by.as_deref(), Some("manager"));
        assert!(found.cancelled_at.is_some());
    }
}

#[tokio::test]
async fn test_cancel_unknown_order_is_not_found() {
    let (_db, store) = setup().await;
    let result = store.cancel_order("CO-19700101-0001", "typo", "admin").await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

// ------------------------------------------------------------------
// Payment ledger
// ------------------------------------------------------------------

#[tokio::test]
async fn test_record_deposit_recomputes_balance() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();

    store
        .record_deposit(&order.order_number, PaymentStatus::DepositPaid, 200.0)
        .await
        .unwrap();

    let found = store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .unwrap();
    assert!((found.deposit_paid - 200.0).abs() < EPS);
    assert!((found.balance_due - (found.total_amount - 200.0)).abs() < EPS);
    assert_eq!(found.payment_status, PaymentStatus::DepositPaid);
    assert!(found.deposit_paid_at.is_some());
}

#[tokio::test]
async fn test_record_deposit_unknown_order_is_not_found() {
    let (_db, store) = setup().await;
    let result = store
        .record_deposit("CO-19700101-0001", PaymentStatus::DepositPaid, 50.0)
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

// ------------------------------------------------------------------
// Administrative updates
// ------------------------------------------------------------------

#[tokio::test]
async fn test_admin_notes_and_staff_assignment() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    store.insert(&mut order, &[]).await.unwrap();

    store
        .update_admin_notes(&order.order_number, "Allergy: nuts")
        .await
        .unwrap();
    store
        .assign_staff(&order.order_number, "lena")
        .await
        .unwrap();

    let found = store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.admin_notes.as_deref(), Some("Allergy: nuts"));
    assert_eq!(found.assigned_staff.as_deref(), Some("lena"));
}

// ------------------------------------------------------------------
// Deletion
// ------------------------------------------------------------------

#[tokio::test]
async fn test_delete_cascades_addon_lines() {
    let (_db, store) = setup().await;
    let mut order = sample_order();
    let addons = sample_addons();
    order.set_addons(&addons);
    store.insert(&mut order, &addons).await.unwrap();

    store.delete(&order.order_number).await.unwrap();

    assert!(store
        .find_by_order_number(&order.order_number)
        .await
        .unwrap()
        .is_none());
    assert!(store.addons(&order.order_number).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_order_is_not_found() {
    let (_db, store) = setup().await;
    let result = store.delete("CO-19700101-0001").await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

// ------------------------------------------------------------------
// Statistics
// ------------------------------------------------------------------

#[tokio::test]
async fn test_statistics_exclude_cancelled_orders() {
    let (db, store) = setup().await;

    let mut pending = sample_order();
    store.insert(&mut pending, &[]).await.unwrap();
    store
        .record_deposit(&pending.order_number, PaymentStatus::DepositPaid, 100.0)
        .await
        .unwrap();

    let mut confirmed = sample_order();
    store.insert(&mut confirmed, &[]).await.unwrap();
    store
        .update_status(&confirmed.order_number, OrderStatus::Confirmed)
        .await
        .unwrap();

    let mut cancelled = sample_order();
    store.insert(&mut cancelled, &[]).await.unwrap();
    store
        .cancel_order(&cancelled.order_number, "changed mind", "front-desk")
        .await
        .unwrap();

    let stats = StatisticsAggregator::new(db.clone()).collect().await.unwrap();

    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.completed, 0);
    assert!((stats.total_revenue - 2.0 * 566.0).abs() < EPS);
    assert!((stats.total_deposits - 100.0).abs() < EPS);
    assert!((stats.total_balance_due - (566.0 + 466.0)).abs() < EPS);
}

// ------------------------------------------------------------------
// End-to-end scenario
// ------------------------------------------------------------------

#[tokio::test]
async fn test_full_order_lifecycle_scenario() {
    let (_db, store) = setup().await;

    let mut order = CustomOrder::new(Uuid::new_v4(), "CAKE-CHOC-10", "CUSTOM_CAKE", 16);
    order.order_number = "CO-20250101-0001".to_string();
    order.base_price = 500.0;
    order.tax_amount = 66.0;
    let addons = vec![OrderAddOn::per_unit("TOPPER-FLORAL", "DECORATION", 2, 25.0)];
    order.set_addons(&addons);

    assert!((order.addons_total - 50.0).abs() < EPS);
    assert!((order.total_amount - 616.0).abs() < EPS);

    store.insert(&mut order, &addons).await.unwrap();

    store
        .record_deposit(&order.order_number, PaymentStatus::DepositPaid, 200.0)
        .await
        .unwrap();
    let found = store
        .find_by_order_number("CO-20250101-0001")
        .await
        .unwrap()
        .unwrap();
    assert!((found.balance_due - 416.0).abs() < EPS);

    store
        .cancel_order(&order.order_number, "Venue flooded", "front-desk")
        .await
        .unwrap();
    let found = store
        .find_by_order_number("CO-20250101-0001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.order_status, OrderStatus::Cancelled);
    assert_eq!(found.cancellation_reason.as_deref(), Some("Venue flooded"));
    assert!(found.cancelled_at.is_some());
}
