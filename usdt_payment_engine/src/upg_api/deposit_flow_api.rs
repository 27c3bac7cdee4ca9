use std::fmt::Debug;

use log::*;

use crate::{
    db_types::NewTransaction,
    helpers::new_order_id,
    traits::{InvoiceRequest, PaymentProcessor, TransactionManagement},
    upg_api::{
        errors::PaymentFlowError,
        flow_objects::{DepositInvoice, DepositRequest, GatewayUrls},
    },
};

/// `DepositFlowApi` creates processor invoices for deposits and records them as pending transactions. The user's
/// balance is only credited later, when the processor's webhook reports the payment (see
/// [`crate::WebhookApi`]).
pub struct DepositFlowApi<B, P> {
    db: B,
    processor: P,
    urls: GatewayUrls,
}

impl<B, P> Debug for DepositFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepositFlowApi ({})", self.urls.callback_url)
    }
}

impl<B, P> DepositFlowApi<B, P> {
    pub fn new(db: B, processor: P, urls: GatewayUrls) -> Self {
        Self { db, processor, urls }
    }
}

impl<B, P> DepositFlowApi<B, P>
where
    B: TransactionManagement,
    P: PaymentProcessor,
{
    /// Creates an invoice at the processor, then records a `pending` deposit carrying its track id and payment URL.
    ///
    /// The invoice exists once the processor has accepted it, so a failure to record it locally is logged and does
    /// not fail the request. Does not wait for the payment.
    pub async fn create_deposit(&self, request: DepositRequest) -> Result<DepositInvoice, PaymentFlowError> {
        let (amount, user_id) = request.validate()?;
        let order_id = new_order_id(&user_id);
        debug!("🔄️📥️ Creating invoice for {amount} for {user_id}. Order id {order_id}");
        let invoice_request = InvoiceRequest {
            amount,
            order_id: order_id.clone(),
            callback_url: self.urls.callback_url.clone(),
            return_url: self.urls.return_url.clone(),
            cancel_url: self.urls.cancel_url.clone(),
            description: Some(format!("USDT deposit for {user_id}")),
        };
        let invoice = self.processor.create_invoice(invoice_request).await.map_err(|e| {
            warn!("🔄️📥️ Could not create invoice for order {order_id}. {e}");
            PaymentFlowError::GatewayError(e.rejection_message().map(String::from).unwrap_or_else(|| e.to_string()))
        })?;
        let transaction =
            NewTransaction::pending_deposit(&user_id, amount, &invoice.track_id, &invoice.payment_url, &order_id);
        let transaction_id = match self.db.insert_transaction(transaction).await {
            Ok(tx) => {
                info!("🔄️📥️ Deposit #{} of {amount} for {user_id} is pending. Track id {}", tx.id, invoice.track_id);
                Some(tx.id)
            },
            Err(e) => {
                error!(
                    "🔄️📥️ Invoice {} (order {order_id}, {amount} for {user_id}) was created, but could not be \
                     recorded. The webhook for it will not match any transaction. {e}",
                    invoice.track_id
                );
                None
            },
        };
        Ok(DepositInvoice {
            payment_url: invoice.payment_url,
            track_id: invoice.track_id,
            expiration: invoice.expires_at,
            order_id,
            transaction_id,
        })
    }
}
