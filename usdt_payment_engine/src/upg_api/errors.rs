use thiserror::Error;

use crate::traits::PaymentGatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentFlowError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    GatewayError(String),
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InternalError(String),
    /// The payout was refused and the reserved amount has been returned.
    #[error("{0}")]
    PayoutFailed(String),
    /// The payout may or may not have been made. The reserved amount is held until the withdrawal is resolved.
    #[error("Payout submitted but not confirmed. Withdrawal #{withdrawal_id} is pending review")]
    PayoutPending { withdrawal_id: i64 },
}

impl From<PaymentGatewayError> for PaymentFlowError {
    fn from(e: PaymentGatewayError) -> Self {
        PaymentFlowError::InternalError(e.to_string())
    }
}
