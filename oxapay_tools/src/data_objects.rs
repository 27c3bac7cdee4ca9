use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every OxaPay v1 response is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct OxaPayResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<Value>,
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub amount: f64,
    pub currency: String,
    pub callback_url: String,
    pub return_url: String,
    pub cancel_url: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceData {
    pub track_id: String,
    pub payment_url: String,
    /// Unix timestamp after which the invoice can no longer be paid.
    #[serde(default)]
    pub expired_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayout {
    pub address: String,
    pub amount: f64,
    pub currency: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutData {
    pub track_id: String,
    #[serde(default)]
    pub status: String,
}
