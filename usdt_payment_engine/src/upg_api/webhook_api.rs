use std::fmt::Debug;

use log::*;
use upg_common::MicroUsdt;

use crate::{
    db_types::TransactionType,
    helpers::webhook_event_key,
    traits::{PaymentGatewayDatabase, SettlementResult},
    upg_api::{
        errors::PaymentFlowError,
        flow_objects::{WebhookNotification, WebhookOutcome, WebhookSettings},
    },
};

const PROCESSING_FAILED: &str = "Webhook processing failed";

/// `WebhookApi` reconciles deposits with the processor's payment notifications.
///
/// Each notification is settled exactly once: the event is recorded, the deposit changes status and (for a paid
/// deposit) the user is credited with the stored amount, all in one database transaction. Redelivered events change
/// nothing, so the processor can safely retry after a failure.
///
/// Processors send interim statuses (`Paying`, `Confirming`) before the payment itself. Those fail the deposit, and the
/// final success report still completes it. A completed deposit is credited once and never changes again.
pub struct WebhookApi<B> {
    db: B,
    settings: WebhookSettings,
}

impl<B> Debug for WebhookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi ({:?})", self.settings)
    }
}

impl<B> WebhookApi<B> {
    pub fn new(db: B, settings: WebhookSettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &WebhookSettings {
        &self.settings
    }
}

impl<B> WebhookApi<B>
where B: PaymentGatewayDatabase
{
    pub async fn handle_notification(
        &self,
        notification: WebhookNotification,
    ) -> Result<WebhookOutcome, PaymentFlowError> {
        let (correlation_id, processor_status) = match (notification.correlation_id(), notification.status()) {
            (Some(c), Some(s)) => (c, s),
            _ => return Err(PaymentFlowError::InvalidRequest("Missing track_id or status".into())),
        };
        let field = self.settings.correlation_field;
        let transaction = self
            .db
            .fetch_transaction_by_correlation(field, correlation_id)
            .await
            .map_err(|e| {
                error!("🔄️🔔️ Could not look up the transaction for {field} {correlation_id}. {e}");
                PaymentFlowError::InternalError(PROCESSING_FAILED.into())
            })?
            .ok_or_else(|| {
                warn!("🔄️🔔️ Webhook for unknown {field} {correlation_id}. Ignoring it.");
                PaymentFlowError::NotFound("Transaction not found".into())
            })?;
        if transaction.tx_type != TransactionType::Deposit {
            info!("🔄️🔔️ Webhook for {field} {correlation_id} matches {} #{}. Ignoring it.", transaction.tx_type, transaction.id);
            return Ok(WebhookOutcome::Ignored { transaction_id: transaction.id });
        }
        self.check_reported_details(&notification, transaction.id, transaction.amount, &transaction.user_id);
        let status = self.settings.status_for(processor_status);
        let event_key = webhook_event_key(correlation_id, processor_status);
        debug!("🔄️🔔️ Processor reports '{processor_status}' for deposit #{}. Settling as {status}", transaction.id);
        let result = self.db.settle_deposit(transaction.id, &event_key, status).await.map_err(|e| {
            error!("🔄️🔔️ Could not settle deposit #{} with event [{event_key}]. {e}", transaction.id);
            PaymentFlowError::InternalError(PROCESSING_FAILED.into())
        })?;
        let outcome = match result {
            SettlementResult::Settled(tx) => {
                info!("🔄️🔔️ Deposit #{} of {} for {} is {}", tx.id, tx.amount, tx.user_id, tx.status);
                WebhookOutcome::Settled { transaction_id: tx.id, status: tx.status }
            },
            SettlementResult::DuplicateEvent => {
                debug!("🔄️🔔️ Event [{event_key}] was delivered before. Nothing to do.");
                WebhookOutcome::Duplicate
            },
            SettlementResult::AlreadySettled(tx) => {
                info!("🔄️🔔️ Deposit #{} is already {}. Ignoring '{processor_status}'", tx.id, tx.status);
                WebhookOutcome::AlreadySettled { transaction_id: tx.id, status: tx.status }
            },
        };
        Ok(outcome)
    }

    /// The stored transaction is authoritative. Differences are only worth a warning.
    fn check_reported_details(
        &self,
        notification: &WebhookNotification,
        transaction_id: i64,
        amount: MicroUsdt,
        user_id: &str,
    ) {
        if let Some(reported) = notification.amount.as_ref().and_then(|a| a.to_micro_usdt().ok().flatten()) {
            if reported != amount {
                warn!("🔄️🔔️ Webhook reports {reported} for deposit #{transaction_id}, but {amount} was invoiced");
            }
        }
        if let Some(reported) = notification.user_id.as_deref() {
            if reported != user_id {
                warn!("🔄️🔔️ Webhook reports user {reported} for deposit #{transaction_id}, which belongs to {user_id}");
            }
        }
    }
}
