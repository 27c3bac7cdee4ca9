use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewTransaction, NewWithdrawal, TransactionStatus, Withdrawal, WithdrawalState, WithdrawalUpdate},
    traits::{PaymentGatewayDatabase, PaymentProcessor, PayoutRequest, RefundResult, ReservationResult},
    upg_api::{
        errors::PaymentFlowError,
        flow_objects::{WithdrawalReceipt, WithdrawalRequest, WithdrawalResolution},
    },
};

const DEFAULT_PAYOUT_FAILURE: &str = "Payout failed";

/// `WithdrawalFlowApi` moves user funds out through the processor's payout endpoint.
///
/// Every withdrawal is a persisted state machine (see [`WithdrawalState`]). The amount is reserved before the payout
/// is requested, and the attempt is marked `payout_requested` before the processor is called, so a crash or an
/// unanswered request always leaves a visible, resolvable record. Reserved funds are returned only when the processor
/// has definitively refused the payout. When the outcome is unknown the funds stay reserved until an operator
/// calls [`Self::resolve_withdrawal`].
pub struct WithdrawalFlowApi<B, P> {
    db: B,
    processor: P,
}

impl<B, P> Debug for WithdrawalFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WithdrawalFlowApi")
    }
}

impl<B, P> WithdrawalFlowApi<B, P> {
    pub fn new(db: B, processor: P) -> Self {
        Self { db, processor }
    }
}

impl<B, P> WithdrawalFlowApi<B, P>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    pub async fn request_withdrawal(&self, request: WithdrawalRequest) -> Result<WithdrawalReceipt, PaymentFlowError> {
        let (amount, wallet_address, user_id) = request.validate()?;
        let balance = self.db.fetch_balance(&user_id).await.map_err(internal_error)?.ok_or_else(|| {
            debug!("🔄️📤️ Withdrawal requested for unknown user {user_id}");
            PaymentFlowError::UserNotFound
        })?;
        if amount > balance {
            debug!("🔄️📤️ {user_id} asked to withdraw {amount} but only has {balance}");
            return Err(PaymentFlowError::InsufficientBalance);
        }
        let withdrawal = self
            .db
            .create_withdrawal(NewWithdrawal::new(&user_id, amount, &wallet_address))
            .await
            .map_err(internal_error)?;
        let id = withdrawal.id;
        if let ReservationResult::Rejected(_) = self.db.reserve_withdrawal_funds(id).await.map_err(internal_error)? {
            info!("🔄️📤️ Withdrawal #{id} rejected. {user_id}'s balance no longer covers {amount}");
            return Err(PaymentFlowError::InsufficientBalance);
        }
        let withdrawal = match self
            .db
            .update_withdrawal_state(
                id,
                WithdrawalState::BalanceReserved,
                WithdrawalState::PayoutRequested,
                WithdrawalUpdate::default(),
            )
            .await
        {
            Ok(Some(w)) => w,
            Ok(None) => {
                error!("🔄️📤️ Withdrawal #{id} changed state unexpectedly before the payout was requested");
                self.refund(id).await;
                return Err(PaymentFlowError::InternalError("Could not record the payout request".into()));
            },
            Err(e) => {
                error!("🔄️📤️ Could not record the payout request for withdrawal #{id}. No payout was sent. {e}");
                self.refund(id).await;
                return Err(PaymentFlowError::InternalError("Could not record the payout request".into()));
            },
        };
        let payout = PayoutRequest {
            address: withdrawal.wallet_address.clone(),
            amount: withdrawal.amount,
            description: Some(format!("Withdrawal #{id} for {user_id}")),
        };
        info!("🔄️📤️ Requesting payout of {amount} to {wallet_address} for withdrawal #{id}");
        match self.processor.request_payout(payout).await {
            Ok(receipt) => {
                self.record_payout_confirmed(&withdrawal, &receipt.track_id).await;
                Ok(WithdrawalReceipt { withdrawal_id: id, track_id: receipt.track_id })
            },
            Err(e) if e.is_definitive() => {
                let message = e.rejection_message().unwrap_or(DEFAULT_PAYOUT_FAILURE).to_string();
                warn!("🔄️📤️ Payout for withdrawal #{id} was refused. {e}");
                self.record_payout_failed(&withdrawal, &message).await;
                Err(PaymentFlowError::PayoutFailed(message))
            },
            Err(e) => {
                warn!(
                    "🔄️📤️ The outcome of the payout for withdrawal #{id} is unknown. {amount} stays reserved until \
                     it is resolved. {e}"
                );
                Err(PaymentFlowError::PayoutPending { withdrawal_id: id })
            },
        }
    }

    /// Applies the authoritative outcome of a payout to an unresolved withdrawal.
    ///
    /// * A `payout_requested` attempt is confirmed or failed exactly as if the processor had answered at the time.
    /// * A `payout_failed` attempt (whose refund did not go through) has its refund retried.
    ///
    /// Returns the withdrawal in its new state.
    pub async fn resolve_withdrawal(
        &self,
        withdrawal_id: i64,
        resolution: WithdrawalResolution,
    ) -> Result<Withdrawal, PaymentFlowError> {
        let withdrawal = self.fetch_withdrawal(withdrawal_id).await?;
        if !withdrawal.state.is_unresolved() {
            return Err(PaymentFlowError::InvalidRequest(format!(
                "Withdrawal #{withdrawal_id} is {} and has nothing to resolve",
                withdrawal.state
            )));
        }
        match (withdrawal.state, &resolution) {
            (WithdrawalState::PayoutRequested, WithdrawalResolution::Confirmed { track_id }) => {
                info!("🔄️📤️ Withdrawal #{withdrawal_id} resolved as paid out. Track id {track_id}");
                self.record_payout_confirmed(&withdrawal, track_id).await;
            },
            (WithdrawalState::PayoutRequested, WithdrawalResolution::Failed { message }) => {
                info!("🔄️📤️ Withdrawal #{withdrawal_id} resolved as failed. {message}");
                self.record_payout_failed(&withdrawal, message).await;
            },
            (WithdrawalState::PayoutFailed, WithdrawalResolution::Failed { .. }) => {
                info!("🔄️📤️ Retrying the refund for withdrawal #{withdrawal_id}");
                self.refund(withdrawal_id).await;
            },
            (state, _) => {
                return Err(PaymentFlowError::InvalidRequest(format!(
                    "Withdrawal #{withdrawal_id} is {state} and cannot be resolved as {resolution:?}"
                )));
            },
        }
        self.fetch_withdrawal(withdrawal_id).await
    }

    /// Withdrawals whose payout outcome is unknown, or whose refund has not gone through.
    pub async fn list_unresolved_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentFlowError> {
        self.db.fetch_unresolved_withdrawals().await.map_err(internal_error)
    }

    async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Withdrawal, PaymentFlowError> {
        self.db
            .fetch_withdrawal(withdrawal_id)
            .await
            .map_err(internal_error)?
            .ok_or_else(|| PaymentFlowError::NotFound(format!("Withdrawal #{withdrawal_id} does not exist")))
    }

    /// The money has left. Failures to record that are logged; the attempt then stays unresolved.
    async fn record_payout_confirmed(&self, withdrawal: &Withdrawal, track_id: &str) {
        let id = withdrawal.id;
        let update = WithdrawalUpdate::default().with_track_id(track_id);
        let confirmed = match self
            .db
            .update_withdrawal_state(id, WithdrawalState::PayoutRequested, WithdrawalState::PayoutConfirmed, update)
            .await
        {
            Ok(Some(w)) => w,
            Ok(None) => {
                warn!("🔄️📤️ Withdrawal #{id} is no longer awaiting its payout. Not recording it twice.");
                return;
            },
            Err(e) => {
                error!("🔄️📤️ Payout {track_id} for withdrawal #{id} went out but could not be recorded. {e}");
                return;
            },
        };
        let transaction = NewTransaction::settled_withdrawal(&confirmed, TransactionStatus::Completed);
        match self.db.insert_transaction(transaction).await {
            Ok(tx) => info!("🔄️📤️ Withdrawal #{id} of {} paid out. Transaction #{}", confirmed.amount, tx.id),
            Err(e) => error!("🔄️📤️ Could not record the transaction for paid-out withdrawal #{id}. {e}"),
        }
    }

    /// The processor refused the payout: record the failure and return the reservation.
    async fn record_payout_failed(&self, withdrawal: &Withdrawal, reason: &str) {
        let id = withdrawal.id;
        let update = WithdrawalUpdate::default().with_failure_reason(reason);
        let failed = match self
            .db
            .update_withdrawal_state(id, WithdrawalState::PayoutRequested, WithdrawalState::PayoutFailed, update)
            .await
        {
            Ok(Some(w)) => w,
            Ok(None) => {
                warn!("🔄️📤️ Withdrawal #{id} is no longer awaiting its payout. Not failing it twice.");
                return;
            },
            Err(e) => {
                error!("🔄️📤️ Could not mark withdrawal #{id} as failed. The reservation was not returned. {e}");
                return;
            },
        };
        let transaction = NewTransaction::settled_withdrawal(&failed, TransactionStatus::Failed);
        if let Err(e) = self.db.insert_transaction(transaction).await {
            error!("🔄️📤️ Could not record the transaction for failed withdrawal #{id}. {e}");
        }
        self.refund(id).await;
    }

    /// Returns the reservation. Never fails: problems are logged and the attempt stays listed as unresolved.
    async fn refund(&self, withdrawal_id: i64) {
        match self.db.refund_withdrawal(withdrawal_id).await {
            Ok(RefundResult::Refunded(w)) => {
                info!("🔄️📤️ {} returned to {} for withdrawal #{withdrawal_id}", w.amount, w.user_id);
            },
            Ok(RefundResult::NotRefundable(w)) => {
                warn!("🔄️📤️ Withdrawal #{withdrawal_id} is {} and was not refunded", w.state);
            },
            Err(e) => {
                error!("🔄️📤️ Refund for withdrawal #{withdrawal_id} failed. It needs to be resolved manually. {e}");
            },
        }
    }
}

fn internal_error<E: std::fmt::Display>(e: E) -> PaymentFlowError {
    error!("🔄️📤️ Database error during withdrawal. {e}");
    PaymentFlowError::InternalError("Withdrawal could not be processed".into())
}
