//! # USDT payment engine public API
//!
//! The `upg_api` module exposes the deposit and withdrawal flows of the gateway.
//!
//! * [`deposit_flow_api`] creates invoices at the payment processor and records the pending deposit.
//! * [`webhook_api`] settles deposits when the processor reports their outcome.
//! * [`withdrawal_flow_api`] reserves user funds, requests payouts, and returns the funds when a payout definitively
//!   fails. It also lets an operator resolve payouts whose outcome was unknown at the time.
//!
//! # API usage
//!
//! Every API is created by supplying a database backend (and, where needed, a [`PaymentProcessor`]) that implements
//! the backend traits the API requires.
//!
//! ```rust,ignore
//! use usdt_payment_engine::{SqliteDatabase, WebhookApi, WebhookSettings};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = WebhookApi::new(db, WebhookSettings::default());
//! let outcome = api.handle_notification(notification).await?;
//! ```
//!
//! [`PaymentProcessor`]: crate::traits::PaymentProcessor

pub mod deposit_flow_api;
pub mod errors;
pub mod flow_objects;
pub mod webhook_api;
pub mod withdrawal_flow_api;
