// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain models and rules for the order core. No I/O lives here; the store
// layer owns persistence.
//
// ============================================================================

pub mod order;
