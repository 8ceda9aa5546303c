use serde::{Deserialize, Serialize};

use super::errors::OrderError;

// ============================================================================
// Order Value Objects - string-persisted enumerations
// ============================================================================
//
// Every enum here is stored as its SCREAMING_SNAKE_CASE string in the
// database. Decoding rejects unknown strings instead of guessing, so a row
// written by a newer schema revision surfaces as an error rather than a
// silently wrong state.
//
// ============================================================================

/// Fulfillment lifecycle of a custom order.
///
/// `COMPLETED` and `CANCELLED` are terminal. `CANCELLED` is reachable from
/// any non-terminal state; everything else moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrderError> {
        match value {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "IN_PRODUCTION" => Ok(OrderStatus::InProduction),
            "READY" => Ok(OrderStatus::Ready),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::UnknownOrderStatus(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `next` is a legal single-step transition from `self`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::InProduction)
                | (OrderStatus::InProduction, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Completed)
        )
    }
}

/// Payment state of an order. Only changed by explicit payment updates,
/// never inferred from amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    AwaitingDeposit,
    DepositPaid,
    PaidInFull,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::AwaitingDeposit,
        PaymentStatus::DepositPaid,
        PaymentStatus::PaidInFull,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AwaitingDeposit => "AWAITING_DEPOSIT",
            PaymentStatus::DepositPaid => "DEPOSIT_PAID",
            PaymentStatus::PaidInFull => "PAID_IN_FULL",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrderError> {
        match value {
            "AWAITING_DEPOSIT" => Ok(PaymentStatus::AwaitingDeposit),
            "DEPOSIT_PAID" => Ok(PaymentStatus::DepositPaid),
            "PAID_IN_FULL" => Ok(PaymentStatus::PaidInFull),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(OrderError::UnknownPaymentStatus(other.to_string())),
        }
    }
}

/// Pickup vs. delivery designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentType {
    Pickup,
    Delivery,
}

impl FulfillmentType {
    pub const ALL: [FulfillmentType; 2] = [FulfillmentType::Pickup, FulfillmentType::Delivery];

    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentType::Pickup => "PICKUP",
            FulfillmentType::Delivery => "DELIVERY",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrderError> {
        match value {
            "PICKUP" => Ok(FulfillmentType::Pickup),
            "DELIVERY" => Ok(FulfillmentType::Delivery),
            other => Err(OrderError::UnknownFulfillmentType(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
