//! USDT Payment Engine
//!
//! The USDT Payment Engine holds user balances for a USDT (TRC-20) payment gateway and drives deposits and
//! withdrawals through a remote payment processor. This library contains the core logic. It is provider-agnostic:
//! the processor is reached through the [`PaymentProcessor`] trait.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). Balance changes are always single
//!    atomic statements, and changes that span several records happen in one database transaction. The data types
//!    used in the database are defined in the [`mod@db_types`] module and are public.
//! 2. The payment engine public API ([`DepositFlowApi`], [`WebhookApi`] and [`WithdrawalFlowApi`]). This provides the
//!    public-facing functionality of the payment engine.
pub mod db_types;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;
mod upg_api;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    BalanceManagement,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentProcessor,
    ProcessorError,
    TransactionManagement,
};
pub use upg_api::{
    deposit_flow_api::DepositFlowApi,
    errors::PaymentFlowError,
    flow_objects,
    flow_objects::{GatewayUrls, WebhookSettings},
    webhook_api::WebhookApi,
    withdrawal_flow_api::WithdrawalFlowApi,
};
