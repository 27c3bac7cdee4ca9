mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::OxaPayApi;
pub use config::{OxaPayConfig, DEFAULT_OXAPAY_API_URL};
pub use data_objects::{InvoiceData, NewInvoice, NewPayout, OxaPayResponse, PayoutData};
pub use error::OxaPayApiError;
pub use helpers::extract_error_message;
