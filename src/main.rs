use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use bakeshop_orders::{
    CustomOrder, Database, DatabaseConfig, OrderAddOn, OrderStatus, OrderStore, PaymentStatus,
    StatisticsAggregator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bakeshop_orders=debug")),
        )
        .init();

    tracing::info!("🧁 Starting custom order core demo");

    // === 1. Connect and initialize the schema ===
    let config = DatabaseConfig::from_env();
    let db = Database::connect(&config).await?;
    db.init_schema().await?;

    let store = OrderStore::new(db.clone());

    // === 2. Build a priced order with add-on lines ===
    let customer_id = Uuid::new_v4();
    let mut order = CustomOrder::new(customer_id, "CAKE-CHOC-10", "CUSTOM_CAKE", 16);
    order.message = Some("Happy birthday Maya!".to_string());
    order.base_price = 500.0;
    order.tax_amount = 66.0;
    order.deposit_required = true;

    let addons = vec![
        OrderAddOn::per_unit("TOPPER-FLORAL", "DECORATION", 2, 15.0),
        OrderAddOn::flat_fee("INSCRIPTION", "DECORATION", 1, 20.0),
    ];
    order.set_addons(&addons);

    // === 3. Insert atomically (order + add-on lines) ===
    store.insert(&mut order, &addons).await?;
    tracing::info!(
        order_number = %order.order_number,
        total_amount = order.total_amount,
        "✅ Order created"
    );

    // === 4. Record the deposit ===
    store
        .record_deposit(&order.order_number, PaymentStatus::DepositPaid, 200.0)
        .await?;

    // === 5. Walk the lifecycle forward ===
    store
        .update_status(&order.order_number, OrderStatus::Confirmed)
        .await?;
    store
        .update_status(&order.order_number, OrderStatus::InProduction)
        .await?;

    // === 6. Cancel with an audit trail ===
    store
        .cancel_order(&order.order_number, "Customer requested cancellation", "front-desk")
        .await?;

    // === 7. Dashboard aggregates ===
    let stats = StatisticsAggregator::new(db.clone()).collect().await?;
    tracing::info!(
        total_orders = stats.total_orders,
        total_revenue = stats.total_revenue,
        outstanding = stats.total_balance_due,
        "📊 Statistics over live orders"
    );

    db.close().await;
    tracing::info!("🎉 Demo complete!");

    Ok(())
}
