use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use upg_common::Secret;

use crate::{
    config::OxaPayConfig,
    data_objects::{InvoiceData, NewInvoice, NewPayout, OxaPayResponse, PayoutData},
    helpers::{classify_send_error, extract_error_message, is_error_envelope},
    OxaPayApiError,
};

const INVOICE_PATH: &str = "/v1/payment/invoice";
const PAYOUT_PATH: &str = "/v1/payout";

#[derive(Clone)]
pub struct OxaPayApi {
    config: OxaPayConfig,
    client: Arc<Client>,
}

impl OxaPayApi {
    pub fn new(config: OxaPayConfig) -> Result<Self, OxaPayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| OxaPayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &OxaPayConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        key_header: &'static str,
        key: &Secret<String>,
        body: &B,
    ) -> Result<T, OxaPayApiError> {
        let url = self.url(path);
        let key = HeaderValue::from_str(key.reveal().as_str())
            .map_err(|e| OxaPayApiError::Initialization(format!("Invalid API key header. {e}")))?;
        trace!("🌐️ Sending request to {url}");
        let response =
            self.client.post(url).header(key_header, key).json(body).send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_send_error)?;
        if status.is_server_error() && !is_error_envelope(&text) {
            let message = extract_error_message(&text);
            warn!("🌐️ No answer from OxaPay for {path}. {status}: {message}");
            return Err(OxaPayApiError::ServiceUnavailable { status: status.as_u16(), message });
        }
        if !status.is_success() {
            let message = extract_error_message(&text);
            debug!("🌐️ OxaPay rejected the request to {path}. {status}: {message}");
            return Err(OxaPayApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("🌐️ OxaPay responded to {path}. {status}");
        let envelope = serde_json::from_str::<OxaPayResponse<T>>(&text)
            .map_err(|e| OxaPayApiError::JsonError(format!("{e}. Body: {text}")))?;
        match envelope.status {
            Some(code) if !(200..300).contains(&code) => {
                let message = extract_error_message(&text);
                Err(OxaPayApiError::QueryError { status: code, message })
            },
            _ => envelope.data.ok_or(OxaPayApiError::EmptyResponse),
        }
    }

    /// Creates a hosted payment invoice. The user pays on `payment_url`; OxaPay later reports the outcome to the
    /// invoice's callback URL.
    pub async fn create_invoice(&self, invoice: &NewInvoice) -> Result<InvoiceData, OxaPayApiError> {
        debug!("🌐️ Creating invoice for order {} ({} {})", invoice.order_id, invoice.amount, invoice.currency);
        let data =
            self.post::<InvoiceData, _>(INVOICE_PATH, "merchant_api_key", &self.config.merchant_api_key, invoice).await?;
        info!("🌐️ Invoice {} created for order {}", data.track_id, invoice.order_id);
        Ok(data)
    }

    /// Asks OxaPay to send funds to an external address.
    pub async fn request_payout(&self, payout: &NewPayout) -> Result<PayoutData, OxaPayApiError> {
        debug!("🌐️ Requesting payout of {} {} to {}", payout.amount, payout.currency, payout.address);
        let data = self.post::<PayoutData, _>(PAYOUT_PATH, "payout_api_key", &self.config.payout_api_key, payout).await?;
        info!("🌐️ Payout {} accepted with status '{}'", data.track_id, data.status);
        Ok(data)
    }
}
