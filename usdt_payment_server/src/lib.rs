//! # USDT payment gateway server
//! This crate hosts the HTTP server for the USDT payment gateway. It is responsible for:
//! * Accepting deposit requests from the front end and creating OxaPay invoices for them.
//! * Receiving OxaPay's signed payment notifications and crediting user balances.
//! * Accepting withdrawal requests and paying them out through OxaPay.
//!
//! The money handling itself lives in `usdt_payment_engine`. This crate wires it to HTTP and to OxaPay.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/oxapay/create-invoice`: Creates a deposit invoice.
//! * `/api/oxapay/webhook`: OxaPay payment notifications. Requests must carry a valid HMAC signature.
//! * `/api/oxapay/withdraw`: Pays out part of a user's balance.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
