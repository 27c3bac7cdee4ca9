use serde::{Deserialize, Serialize};
use thiserror::Error;
use upg_common::MicroUsdt;

/// An invoice the user pays on a page hosted by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub amount: MicroUsdt,
    pub order_id: String,
    pub callback_url: String,
    pub return_url: String,
    pub cancel_url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub track_id: String,
    pub payment_url: String,
    /// Unix timestamp after which the invoice cannot be paid.
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub address: String,
    pub amount: MicroUsdt,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub track_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// The processor answered and refused the request.
    #[error("Request rejected by the payment processor. {0}")]
    Rejected(String),
    /// The request never reached the processor.
    #[error("Payment processor is unreachable. {0}")]
    Unreachable(String),
    /// No answer in time. The processor may or may not have acted on the request.
    #[error("Payment processor timed out. {0}")]
    Timeout(String),
    /// Something failed after the request was sent. The processor may or may not have acted on the request.
    #[error("Payment processor outcome unknown. {0}")]
    Indeterminate(String),
}

impl ProcessorError {
    /// True when the processor certainly did not act on the request.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Unreachable(_))
    }

    /// The processor's own explanation, when it gave one.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(msg) if !msg.trim().is_empty() => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// The remote payment processor, as seen by the deposit and withdrawal flows.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError>;

    async fn request_payout(&self, request: PayoutRequest) -> Result<PayoutReceipt, ProcessorError>;
}
