use crate::{
    db_types::{CorrelationField, NewTransaction, Transaction},
    traits::PaymentGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait TransactionManagement {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError>;

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, PaymentGatewayError>;

    /// Finds the most recent transaction whose `field` column equals `value`.
    async fn fetch_transaction_by_correlation(
        &self,
        field: CorrelationField,
        value: &str,
    ) -> Result<Option<Transaction>, PaymentGatewayError>;

    /// All transactions for the user, newest first.
    async fn fetch_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>, PaymentGatewayError>;
}
