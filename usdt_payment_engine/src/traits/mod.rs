//! #  Backend contracts.
//!
//! This module defines the behaviour a backend has to expose to support the USDT payment engine.
//!
//! * [`BalanceManagement`] reads and atomically adjusts user balances. Balances are never read, modified and written
//!   back; every change is a single guarded statement.
//! * [`TransactionManagement`] stores and queries the deposit and withdrawal records shown to users.
//! * [`PaymentGatewayDatabase`] is the highest level of behaviour. It bundles the operations that must change several
//!   records atomically: webhook settlement and the withdrawal state machine.
//! * [`PaymentProcessor`] is the remote side: whoever actually creates invoices and sends payouts.
mod balance_management;
mod data_objects;
mod payment_gateway_database;
mod payment_processor;
mod transaction_management;

pub use balance_management::BalanceManagement;
pub use data_objects::{RefundResult, ReservationResult, SettlementResult};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use payment_processor::{Invoice, InvoiceRequest, PaymentProcessor, PayoutReceipt, PayoutRequest, ProcessorError};
pub use transaction_management::TransactionManagement;
