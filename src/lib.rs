//! Order-management core for custom bakery orders.
//!
//! Creates, prices, and tracks custom orders (a base product plus a variable
//! set of add-on lines), carries them through a fulfillment lifecycle, and
//! persists them atomically across two related tables on either of two
//! interchangeable relational backends (SQLite or PostgreSQL).
//!
//! The UI, catalog, and customer directory live elsewhere; this crate only
//! receives priced line items and a customer id and owns the order rows.

pub mod config;
pub mod db;
pub mod domain;
pub mod store;

pub use config::DatabaseConfig;
pub use db::{Database, Dialect};
pub use domain::order::{
    CustomOrder, FulfillmentType, OrderAddOn, OrderError, OrderStatus, PaymentStatus,
};
pub use store::{OrderNumberGenerator, OrderStatistics, OrderStore, StatisticsAggregator};
