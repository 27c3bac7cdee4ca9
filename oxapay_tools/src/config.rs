use std::time::Duration;

use log::*;
use upg_common::Secret;

use crate::OxaPayApiError;

pub const DEFAULT_OXAPAY_API_URL: &str = "https://api.oxapay.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NETWORK: &str = "TRX";

#[derive(Debug, Clone)]
pub struct OxaPayConfig {
    pub api_url: String,
    pub merchant_api_key: Secret<String>,
    pub payout_api_key: Secret<String>,
    /// Applied to every outbound call.
    pub timeout: Duration,
    /// The chain used for payouts.
    pub network: String,
}

impl Default for OxaPayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_OXAPAY_API_URL.to_string(),
            merchant_api_key: Secret::default(),
            payout_api_key: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}

impl OxaPayConfig {
    pub fn new(api_url: &str, merchant_api_key: Secret<String>) -> Self {
        Self {
            api_url: api_url.to_string(),
            payout_api_key: merchant_api_key.clone(),
            merchant_api_key,
            ..Default::default()
        }
    }

    /// Reads the `UPG_OXAPAY_*` variables. The merchant key is mandatory; everything else has a default.
    pub fn try_from_env() -> Result<Self, OxaPayApiError> {
        let merchant_api_key = Secret::new(std::env::var("UPG_OXAPAY_MERCHANT_API_KEY").unwrap_or_default());
        if merchant_api_key.is_empty() {
            error!("🪛️ UPG_OXAPAY_MERCHANT_API_KEY is not set. Invoices cannot be created without it.");
            return Err(OxaPayApiError::Initialization("UPG_OXAPAY_MERCHANT_API_KEY is not set".into()));
        }
        let payout_api_key = match std::env::var("UPG_OXAPAY_PAYOUT_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Secret::new(key),
            _ => {
                info!("🪛️ UPG_OXAPAY_PAYOUT_API_KEY is not set. Payouts will use the merchant key.");
                merchant_api_key.clone()
            },
        };
        let api_url = std::env::var("UPG_OXAPAY_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ UPG_OXAPAY_API_URL not set, using {DEFAULT_OXAPAY_API_URL}");
            DEFAULT_OXAPAY_API_URL.to_string()
        });
        let timeout = std::env::var("UPG_OXAPAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid UPG_OXAPAY_TIMEOUT_SECS value '{s}'. {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let network = std::env::var("UPG_OXAPAY_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string());
        Ok(Self { api_url, merchant_api_key, payout_api_key, timeout: Duration::from_secs(timeout), network })
    }
}
