use upg_common::MicroUsdt;

use crate::traits::PaymentGatewayError;

#[allow(async_fn_in_trait)]
pub trait BalanceManagement {
    /// The user's current balance, or `None` if the user has no balance record.
    async fn fetch_balance(&self, user_id: &str) -> Result<Option<MicroUsdt>, PaymentGatewayError>;

    /// Atomically adds `amount` to the user's balance, creating the balance record if it does not exist yet.
    /// Returns the new balance.
    async fn increment_balance(&self, user_id: &str, amount: MicroUsdt) -> Result<MicroUsdt, PaymentGatewayError>;

    /// Atomically subtracts `amount` from the user's balance, but only if the balance covers it.
    /// Returns `false`, and changes nothing, if it does not.
    async fn decrement_balance(&self, user_id: &str, amount: MicroUsdt) -> Result<bool, PaymentGatewayError>;
}
