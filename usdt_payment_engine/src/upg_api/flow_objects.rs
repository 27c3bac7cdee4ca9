use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use upg_common::MicroUsdt;

use crate::{
    db_types::{CorrelationField, TransactionStatus},
    upg_api::errors::PaymentFlowError,
};

const DEFAULT_SUCCESS_STATUSES: [&str; 3] = ["paid", "confirmed", "success"];

//--------------------------------------     AmountInput       ---------------------------------------------------------
/// An amount as clients send it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Converts the input into micro-USDT. Blank strings and zero give `None`. Negative, non-numeric and
    /// over-precise amounts are errors.
    pub fn to_micro_usdt(&self) -> Result<Option<MicroUsdt>, PaymentFlowError> {
        let amount = match self {
            AmountInput::Number(n) => MicroUsdt::try_from(*n),
            AmountInput::Text(s) if s.trim().is_empty() => return Ok(None),
            AmountInput::Text(s) => s.parse::<MicroUsdt>(),
        }
        .map_err(|e| PaymentFlowError::InvalidRequest(format!("Invalid amount. {e}")))?;
        match amount.value() {
            0 => Ok(None),
            v if v < 0 => Err(PaymentFlowError::InvalidRequest("Invalid amount. Amounts must be positive".into())),
            _ => Ok(Some(amount)),
        }
    }
}

impl From<MicroUsdt> for AmountInput {
    fn from(value: MicroUsdt) -> Self {
        AmountInput::Text(value.to_decimal_string())
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts `"123"` and `123` alike. Processors are not always consistent about how they encode identifiers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//--------------------------------------      Deposits         ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositRequest {
    #[serde(default)]
    pub amount: Option<AmountInput>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl DepositRequest {
    pub fn new<A: Into<AmountInput>>(amount: A, user_id: &str) -> Self {
        Self { amount: Some(amount.into()), user_id: Some(user_id.to_string()) }
    }

    /// Returns the positive amount and the user id, or `InvalidRequest` if either is missing.
    pub fn validate(&self) -> Result<(MicroUsdt, String), PaymentFlowError> {
        let missing = || PaymentFlowError::InvalidRequest("Missing amount or user_id".into());
        let amount = match &self.amount {
            Some(a) => a.to_micro_usdt()?.ok_or_else(missing)?,
            None => return Err(missing()),
        };
        let user_id = non_empty(&self.user_id).ok_or_else(missing)?;
        Ok((amount, user_id.to_string()))
    }
}

/// The invoice created for a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositInvoice {
    pub payment_url: String,
    pub track_id: String,
    /// Unix timestamp after which the invoice cannot be paid.
    pub expiration: Option<i64>,
    pub order_id: String,
    /// The local transaction record. `None` if the invoice was created but could not be recorded.
    pub transaction_id: Option<i64>,
}

/// Where the processor sends the user and its notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayUrls {
    pub callback_url: String,
    pub return_url: String,
    pub cancel_url: String,
}

impl GatewayUrls {
    /// Derives the webhook and dashboard URLs from the public base URL of the deployment.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            callback_url: format!("{base}/api/oxapay/webhook"),
            return_url: format!("{base}/dashboard"),
            cancel_url: format!("{base}/dashboard"),
        }
    }
}

//--------------------------------------       Webhooks        ---------------------------------------------------------
/// A payment status notification from the processor. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookNotification {
    #[serde(default, deserialize_with = "string_or_number")]
    pub track_id: Option<String>,
    /// Older integrations send the correlation id in this field.
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountInput>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl WebhookNotification {
    pub fn new(track_id: &str, status: &str) -> Self {
        Self { track_id: Some(track_id.to_string()), status: Some(status.to_string()), ..Default::default() }
    }

    pub fn with_amount<A: Into<AmountInput>>(mut self, amount: A) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// `track_id`, falling back to `wallet_address`.
    pub fn correlation_id(&self) -> Option<&str> {
        non_empty(&self.track_id).or_else(|| non_empty(&self.wallet_address))
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Lower-case processor statuses that mean the deposit was paid. Every other status fails the deposit until a
    /// success status arrives.
    pub success_statuses: Vec<String>,
    pub correlation_field: CorrelationField,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            success_statuses: DEFAULT_SUCCESS_STATUSES.iter().map(|s| s.to_string()).collect(),
            correlation_field: CorrelationField::default(),
        }
    }
}

impl WebhookSettings {
    pub fn status_for(&self, processor_status: &str) -> TransactionStatus {
        let status = processor_status.trim().to_lowercase();
        if self.success_statuses.iter().any(|s| *s == status) {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The deposit moved to the given status.
    Settled { transaction_id: i64, status: TransactionStatus },
    /// The event was delivered before. Nothing changed.
    Duplicate,
    /// The deposit cannot take the reported status any more. Nothing changed.
    AlreadySettled { transaction_id: i64, status: TransactionStatus },
    /// The matching transaction is not a deposit.
    Ignored { transaction_id: i64 },
}

//--------------------------------------     Withdrawals       ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    #[serde(default)]
    pub amount: Option<AmountInput>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl WithdrawalRequest {
    pub fn new<A: Into<AmountInput>>(amount: A, wallet_address: &str, user_id: &str) -> Self {
        Self {
            amount: Some(amount.into()),
            wallet_address: Some(wallet_address.to_string()),
            user_id: Some(user_id.to_string()),
        }
    }

    /// Returns the positive amount, destination address and user id.
    pub fn validate(&self) -> Result<(MicroUsdt, String, String), PaymentFlowError> {
        let missing = || PaymentFlowError::InvalidRequest("Missing amount, wallet_address or user_id".into());
        let amount = match &self.amount {
            Some(a) => a.to_micro_usdt()?.ok_or_else(missing)?,
            None => return Err(missing()),
        };
        let address = non_empty(&self.wallet_address).ok_or_else(missing)?;
        let user_id = non_empty(&self.user_id).ok_or_else(missing)?;
        Ok((amount, address.to_string(), user_id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub withdrawal_id: i64,
    pub track_id: String,
}

/// The authoritative outcome of a payout, as established by an operator with the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WithdrawalResolution {
    Confirmed { track_id: String },
    Failed { message: String },
}
