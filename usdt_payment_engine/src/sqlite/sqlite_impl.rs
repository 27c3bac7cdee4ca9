//! `SqliteDatabase` is a concrete implementation of a USDT payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;
use upg_common::MicroUsdt;

use super::db::{db_url, new_pool, transactions, users, webhook_events, withdrawals};
use crate::{
    db_types::{
        CorrelationField,
        NewTransaction,
        NewWithdrawal,
        Transaction,
        TransactionStatus,
        Withdrawal,
        WithdrawalState,
        WithdrawalUpdate,
    },
    traits::{
        BalanceManagement,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        RefundResult,
        ReservationResult,
        SettlementResult,
        TransactionManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl BalanceManagement for SqliteDatabase {
    async fn fetch_balance(&self, user_id: &str) -> Result<Option<MicroUsdt>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_balance(user_id, &mut conn).await
    }

    async fn increment_balance(&self, user_id: &str, amount: MicroUsdt) -> Result<MicroUsdt, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let balance = users::increment_balance(user_id, amount, &mut conn).await?;
        debug!("🗃️ {amount} credited to {user_id}. New balance: {balance}");
        Ok(balance)
    }

    async fn decrement_balance(&self, user_id: &str, amount: MicroUsdt) -> Result<bool, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let debited = users::decrement_balance(user_id, amount, &mut conn).await?;
        if debited {
            debug!("🗃️ {amount} debited from {user_id}");
        } else {
            debug!("🗃️ {user_id} does not have {amount} available. Balance unchanged");
        }
        Ok(debited)
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::insert(transaction, &mut conn).await?;
        debug!(
            "🗃️ {} transaction #{} of {} saved for {} as {}",
            transaction.tx_type, transaction.id, transaction.amount, transaction.user_id, transaction.status
        );
        Ok(transaction)
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_by_id(id, &mut conn).await
    }

    async fn fetch_transaction_by_correlation(
        &self,
        field: CorrelationField,
        value: &str,
    ) -> Result<Option<Transaction>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_by_correlation(field, value, &mut conn).await
    }

    async fn fetch_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_for_user(user_id, &mut conn).await
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn settle_deposit(
        &self,
        transaction_id: i64,
        event_key: &str,
        status: TransactionStatus,
    ) -> Result<SettlementResult, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        if !webhook_events::record_event(event_key, transaction_id, status, &mut tx).await? {
            debug!("🗃️ Webhook event [{event_key}] has been processed before. Ignoring it.");
            return Ok(SettlementResult::DuplicateEvent);
        }
        let result = match transactions::settle_pending(transaction_id, status, &mut tx).await? {
            Some(transaction) => {
                if status == TransactionStatus::Completed {
                    let balance = users::increment_balance(&transaction.user_id, transaction.amount, &mut tx).await?;
                    debug!(
                        "🗃️ Deposit #{transaction_id} completed. {} credited to {}. New balance: {balance}",
                        transaction.amount, transaction.user_id
                    );
                } else {
                    debug!("🗃️ Deposit #{transaction_id} marked as {status}");
                }
                SettlementResult::Settled(transaction)
            },
            None => {
                let current = transactions::fetch_by_id(transaction_id, &mut tx)
                    .await?
                    .ok_or(PaymentGatewayError::TransactionNotFound(transaction_id))?;
                debug!("🗃️ Deposit #{transaction_id} is already {}. Event [{event_key}] recorded only.", current.status);
                SettlementResult::AlreadySettled(current)
            },
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawal = withdrawals::insert(withdrawal, &mut conn).await?;
        debug!(
            "🗃️ Withdrawal #{} of {} to {} initiated for {}",
            withdrawal.id, withdrawal.amount, withdrawal.wallet_address, withdrawal.user_id
        );
        Ok(withdrawal)
    }

    async fn reserve_withdrawal_funds(&self, withdrawal_id: i64) -> Result<ReservationResult, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let withdrawal = withdrawals::fetch_by_id(withdrawal_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::WithdrawalNotFound(withdrawal_id))?;
        let debited = users::decrement_balance(&withdrawal.user_id, withdrawal.amount, &mut tx).await?;
        let next = if debited { WithdrawalState::BalanceReserved } else { WithdrawalState::Rejected };
        let reason = if debited { None } else { Some("Insufficient balance".to_string()) };
        let update = WithdrawalUpdate { track_id: None, failure_reason: reason };
        let updated = withdrawals::update_state_if(withdrawal_id, WithdrawalState::Initiated, next, update, &mut tx)
            .await?
            .ok_or_else(|| {
                PaymentGatewayError::WithdrawalStateError(format!(
                    "Withdrawal #{withdrawal_id} is {}, not {}",
                    withdrawal.state,
                    WithdrawalState::Initiated
                ))
            })?;
        tx.commit().await?;
        if debited {
            debug!("🗃️ {} reserved from {} for withdrawal #{withdrawal_id}", updated.amount, updated.user_id);
            Ok(ReservationResult::Reserved(updated))
        } else {
            debug!("🗃️ Withdrawal #{withdrawal_id} rejected. {} does not cover {}", updated.user_id, updated.amount);
            Ok(ReservationResult::Rejected(updated))
        }
    }

    async fn update_withdrawal_state(
        &self,
        withdrawal_id: i64,
        from: WithdrawalState,
        to: WithdrawalState,
        update: WithdrawalUpdate,
    ) -> Result<Option<Withdrawal>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let result = withdrawals::update_state_if(withdrawal_id, from, to, update, &mut conn).await?;
        match &result {
            Some(_) => trace!("🗃️ Withdrawal #{withdrawal_id} moved from {from} to {to}"),
            None => debug!("🗃️ Withdrawal #{withdrawal_id} is not {from}. It was not moved to {to}"),
        }
        Ok(result)
    }

    async fn refund_withdrawal(&self, withdrawal_id: i64) -> Result<RefundResult, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = match withdrawals::mark_refunded(withdrawal_id, &mut tx).await? {
            Some(withdrawal) => {
                let balance = users::increment_balance(&withdrawal.user_id, withdrawal.amount, &mut tx).await?;
                debug!(
                    "🗃️ Withdrawal #{withdrawal_id} refunded. {} returned to {}. New balance: {balance}",
                    withdrawal.amount, withdrawal.user_id
                );
                RefundResult::Refunded(withdrawal)
            },
            None => {
                let current = withdrawals::fetch_by_id(withdrawal_id, &mut tx)
                    .await?
                    .ok_or(PaymentGatewayError::WithdrawalNotFound(withdrawal_id))?;
                debug!("🗃️ Withdrawal #{withdrawal_id} is {} and cannot be refunded", current.state);
                RefundResult::NotRefundable(current)
            },
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Option<Withdrawal>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::fetch_by_id(withdrawal_id, &mut conn).await
    }

    async fn fetch_unresolved_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::fetch_unresolved(&mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), PaymentGatewayError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PaymentGatewayError::DatabaseError(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
