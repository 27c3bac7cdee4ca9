use serde::{Deserialize, Serialize};
use usdt_payment_engine::flow_objects::{DepositInvoice, WithdrawalReceipt};

pub const WITHDRAWAL_SUCCESS_MESSAGE: &str = "Withdrawal processed successfully";

/// A bare acknowledgement, e.g. for webhook deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
}

impl JsonResponse {
    pub fn success() -> Self {
        Self { success: true }
    }
}

/// The reply to a deposit request. The front end sends the user to `wallet_address`, which holds the processor's
/// hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub success: bool,
    pub wallet_address: String,
    pub track_id: String,
    pub expiration: Option<i64>,
}

impl From<DepositInvoice> for InvoiceResponse {
    fn from(invoice: DepositInvoice) -> Self {
        Self {
            success: true,
            wallet_address: invoice.payment_url,
            track_id: invoice.track_id,
            expiration: invoice.expiration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalResponse {
    pub success: bool,
    pub message: String,
    pub track_id: String,
}

impl From<WithdrawalReceipt> for WithdrawalResponse {
    fn from(receipt: WithdrawalReceipt) -> Self {
        Self { success: true, message: WITHDRAWAL_SUCCESS_MESSAGE.to_string(), track_id: receipt.track_id }
    }
}
