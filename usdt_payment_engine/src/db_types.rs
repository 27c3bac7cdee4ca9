use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use upg_common::MicroUsdt;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   TransactionType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

//--------------------------------------  TransactionStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Waiting for the processor to report the outcome.
    Pending,
    /// Final. A completed deposit has been credited and never changes again.
    Completed,
    /// The processor reported something other than a payment. A later payment report can still complete it.
    Failed,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------     Transaction       ---------------------------------------------------------
/// A deposit or withdrawal as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub tx_type: TransactionType,
    pub amount: MicroUsdt,
    pub status: TransactionStatus,
    /// Destination address. Only set on withdrawals.
    pub wallet_address: Option<String>,
    pub track_id: Option<String>,
    pub payment_url: Option<String>,
    pub order_id: Option<String>,
    pub withdrawal_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: String,
    pub tx_type: TransactionType,
    pub amount: MicroUsdt,
    pub status: TransactionStatus,
    pub wallet_address: Option<String>,
    pub track_id: Option<String>,
    pub payment_url: Option<String>,
    pub order_id: Option<String>,
    pub withdrawal_id: Option<i64>,
}

impl NewTransaction {
    pub fn pending_deposit(user_id: &str, amount: MicroUsdt, track_id: &str, payment_url: &str, order_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            tx_type: TransactionType::Deposit,
            amount,
            status: TransactionStatus::Pending,
            wallet_address: None,
            track_id: Some(track_id.to_string()),
            payment_url: Some(payment_url.to_string()),
            order_id: Some(order_id.to_string()),
            withdrawal_id: None,
        }
    }

    /// The user-facing record of a withdrawal attempt whose outcome is known.
    pub fn settled_withdrawal(withdrawal: &Withdrawal, status: TransactionStatus) -> Self {
        Self {
            user_id: withdrawal.user_id.clone(),
            tx_type: TransactionType::Withdrawal,
            amount: withdrawal.amount,
            status,
            wallet_address: Some(withdrawal.wallet_address.clone()),
            track_id: withdrawal.track_id.clone(),
            payment_url: None,
            order_id: None,
            withdrawal_id: Some(withdrawal.id),
        }
    }
}

//--------------------------------------   CorrelationField    ---------------------------------------------------------
/// The transaction column that webhook correlation ids are matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationField {
    #[default]
    TrackId,
    PaymentUrl,
}

impl CorrelationField {
    pub fn column(&self) -> &'static str {
        match self {
            CorrelationField::TrackId => "track_id",
            CorrelationField::PaymentUrl => "payment_url",
        }
    }
}

impl Display for CorrelationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for CorrelationField {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "track_id" => Ok(Self::TrackId),
            "payment_url" => Ok(Self::PaymentUrl),
            s => Err(ConversionError(format!("Invalid correlation field: {s}"))),
        }
    }
}

//--------------------------------------   WithdrawalState     ---------------------------------------------------------
/// The life cycle of a withdrawal attempt.
///
/// ```text
/// initiated ─┬─> balance_reserved ──> payout_requested ─┬─> payout_confirmed
///            │          │                               └─> payout_failed ──> refunded
///            │          └───────────────────────────────────────────────────> refunded
///            └─> rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalState {
    Initiated,
    /// The amount has been deducted from the user's balance and is held against this attempt.
    BalanceReserved,
    /// The payout request is about to be, or has been, sent. The outcome is unknown until it is resolved.
    PayoutRequested,
    PayoutConfirmed,
    /// The processor refused the payout. The reservation still has to be returned.
    PayoutFailed,
    Refunded,
    /// The funds could not be reserved. Nothing to undo.
    Rejected,
}

impl WithdrawalState {
    /// Attempts that hold user funds without a final outcome.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, WithdrawalState::PayoutRequested | WithdrawalState::PayoutFailed)
    }
}

impl Display for WithdrawalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WithdrawalState::Initiated => "initiated",
            WithdrawalState::BalanceReserved => "balance_reserved",
            WithdrawalState::PayoutRequested => "payout_requested",
            WithdrawalState::PayoutConfirmed => "payout_confirmed",
            WithdrawalState::PayoutFailed => "payout_failed",
            WithdrawalState::Refunded => "refunded",
            WithdrawalState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: String,
    pub amount: MicroUsdt,
    pub wallet_address: String,
    pub state: WithdrawalState,
    pub track_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub user_id: String,
    pub amount: MicroUsdt,
    pub wallet_address: String,
}

impl NewWithdrawal {
    pub fn new(user_id: &str, amount: MicroUsdt, wallet_address: &str) -> Self {
        Self { user_id: user_id.to_string(), amount, wallet_address: wallet_address.to_string() }
    }
}

/// Optional details recorded alongside a withdrawal state change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalUpdate {
    pub track_id: Option<String>,
    pub failure_reason: Option<String>,
}

impl WithdrawalUpdate {
    pub fn with_track_id(mut self, track_id: &str) -> Self {
        self.track_id = Some(track_id.to_string());
        self
    }

    pub fn with_failure_reason(mut self, reason: &str) -> Self {
        self.failure_reason = Some(reason.to_string());
        self
    }
}
