//! Connects the payment engine to OxaPay.
//!
//! The engine only knows the [`PaymentProcessor`] trait. [`OxaPayProcessor`] implements it with the OxaPay REST client,
//! converting amounts to the decimal numbers OxaPay expects and sorting client errors into the engine's
//! definitive / ambiguous failure kinds.
use log::*;
use oxapay_tools::{NewInvoice, NewPayout, OxaPayApi, OxaPayApiError, OxaPayConfig};
use upg_common::USDT_CURRENCY_CODE;
use usdt_payment_engine::{
    traits::{Invoice, InvoiceRequest, PayoutReceipt, PayoutRequest},
    PaymentProcessor,
    ProcessorError,
};

#[derive(Clone)]
pub struct OxaPayProcessor {
    api: OxaPayApi,
}

impl OxaPayProcessor {
    pub fn new(config: OxaPayConfig) -> Result<Self, OxaPayApiError> {
        let api = OxaPayApi::new(config)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &OxaPayApi {
        &self.api
    }
}

impl PaymentProcessor for OxaPayProcessor {
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError> {
        let invoice = NewInvoice {
            amount: request.amount.to_f64(),
            currency: USDT_CURRENCY_CODE.to_string(),
            callback_url: request.callback_url,
            return_url: request.return_url,
            cancel_url: request.cancel_url,
            order_id: request.order_id,
            description: request.description,
        };
        let data = self.api.create_invoice(&invoice).await.map_err(to_processor_error)?;
        Ok(Invoice { track_id: data.track_id, payment_url: data.payment_url, expires_at: data.expired_at })
    }

    async fn request_payout(&self, request: PayoutRequest) -> Result<PayoutReceipt, ProcessorError> {
        let payout = NewPayout {
            address: request.address,
            amount: request.amount.to_f64(),
            currency: USDT_CURRENCY_CODE.to_string(),
            network: self.api.config().network.clone(),
            description: request.description,
        };
        let data = self.api.request_payout(&payout).await.map_err(to_processor_error)?;
        Ok(PayoutReceipt { track_id: data.track_id, status: data.status })
    }
}

pub fn to_processor_error(e: OxaPayApiError) -> ProcessorError {
    trace!("🌐️ Classifying OxaPay error: {e:?}");
    match e {
        OxaPayApiError::QueryError { message, .. } => ProcessorError::Rejected(message),
        OxaPayApiError::Initialization(s) | OxaPayApiError::Unreachable(s) => ProcessorError::Unreachable(s),
        OxaPayApiError::Timeout(s) => ProcessorError::Timeout(s),
        OxaPayApiError::TransportError(s) | OxaPayApiError::JsonError(s) => ProcessorError::Indeterminate(s),
        OxaPayApiError::ServiceUnavailable { .. } | OxaPayApiError::EmptyResponse => {
            ProcessorError::Indeterminate(e.to_string())
        },
    }
}
