use super::value_objects::OrderStatus;

// ============================================================================
// Order Errors
// ============================================================================
//
// One enum across the domain and store layers. Callers can tell "no such
// order" apart from "the backend failed" instead of both collapsing into a
// false/null result.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Cannot transition order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    #[error("Unknown fulfillment type: {0}")]
    UnknownFulfillmentType(String),

    #[error("Unsupported database backend: {0}")]
    UnsupportedBackend(String),

    #[error("Invalid persisted value in column {column}: {value}")]
    InvalidValue { column: &'static str, value: String },

    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(u32),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
