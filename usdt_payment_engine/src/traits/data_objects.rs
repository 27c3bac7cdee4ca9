use crate::db_types::{Transaction, Withdrawal};

/// The outcome of applying a webhook event to a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementResult {
    /// The transaction changed status, and the user was credited if the deposit completed.
    Settled(Transaction),
    /// This exact event has been processed before. Nothing was changed.
    DuplicateEvent,
    /// The transaction cannot take this status (it is already completed, or already failed and the event is another
    /// failure). The event was recorded, nothing else changed.
    AlreadySettled(Transaction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationResult {
    /// The amount was deducted and the attempt is now `balance_reserved`.
    Reserved(Withdrawal),
    /// The balance did not cover the amount. The attempt is now `rejected`.
    Rejected(Withdrawal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundResult {
    /// The reservation was returned to the user and the attempt is now `refunded`.
    Refunded(Withdrawal),
    /// The attempt is not in a refundable state. Nothing was changed.
    NotRefundable(Withdrawal),
}
