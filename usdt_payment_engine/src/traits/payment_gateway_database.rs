use thiserror::Error;

use crate::{
    db_types::{NewWithdrawal, TransactionStatus, Withdrawal, WithdrawalState, WithdrawalUpdate},
    traits::{BalanceManagement, RefundResult, ReservationResult, SettlementResult, TransactionManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the USDT payment engine.
///
/// Every method that touches more than one record does so in a single atomic database transaction.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + BalanceManagement + TransactionManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Applies a webhook event to a deposit transaction. In one atomic transaction:
    /// * records `event_key`. If the key has been seen before, nothing further is done and
    ///   [`SettlementResult::DuplicateEvent`] is returned.
    /// * moves the transaction from `pending` to `status`. If it is not `pending` any more, nothing further is done
    ///   and [`SettlementResult::AlreadySettled`] is returned.
    /// * if `status` is `Completed`, credits the user with the amount stored on the transaction.
    async fn settle_deposit(
        &self,
        transaction_id: i64,
        event_key: &str,
        status: TransactionStatus,
    ) -> Result<SettlementResult, PaymentGatewayError>;

    /// Persists a new withdrawal attempt in the `initiated` state.
    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, PaymentGatewayError>;

    /// Deducts the attempt's amount from the user's balance and moves it to `balance_reserved`, atomically.
    /// If the balance does not cover the amount, the attempt is moved to `rejected` instead.
    async fn reserve_withdrawal_funds(&self, withdrawal_id: i64) -> Result<ReservationResult, PaymentGatewayError>;

    /// Moves the attempt from `from` to `to`, recording any details in `update`.
    /// Returns `None`, and changes nothing, if the attempt is not currently in the `from` state.
    async fn update_withdrawal_state(
        &self,
        withdrawal_id: i64,
        from: WithdrawalState,
        to: WithdrawalState,
        update: WithdrawalUpdate,
    ) -> Result<Option<Withdrawal>, PaymentGatewayError>;

    /// Returns the reserved amount to the user and marks the attempt `refunded`, atomically. Only attempts in
    /// `balance_reserved` or `payout_failed` can be refunded, so calling this more than once credits the user once.
    async fn refund_withdrawal(&self, withdrawal_id: i64) -> Result<RefundResult, PaymentGatewayError>;

    async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Option<Withdrawal>, PaymentGatewayError>;

    /// Attempts that still hold user funds without a final outcome (`payout_requested` or `payout_failed`).
    async fn fetch_unresolved_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentGatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(i64),
    #[error("The requested withdrawal {0} does not exist")]
    WithdrawalNotFound(i64),
    #[error("Illegal withdrawal state change. {0}")]
    WithdrawalStateError(String),
    #[error("Balance update rejected. {0}")]
    BalanceUpdateError(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
