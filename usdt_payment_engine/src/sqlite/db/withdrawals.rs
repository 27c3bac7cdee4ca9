use sqlx::SqliteConnection;

use crate::{
    db_types::{NewWithdrawal, Withdrawal, WithdrawalState, WithdrawalUpdate},
    traits::PaymentGatewayError,
};

pub async fn insert(withdrawal: NewWithdrawal, conn: &mut SqliteConnection) -> Result<Withdrawal, PaymentGatewayError> {
    let inserted: Vec<Withdrawal> = sqlx::query_as(
        r#"
            INSERT INTO withdrawals (user_id, amount, wallet_address, state) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(withdrawal.user_id)
    .bind(withdrawal.amount)
    .bind(withdrawal.wallet_address)
    .bind(WithdrawalState::Initiated)
    .fetch_all(conn)
    .await?;
    inserted.into_iter().next().ok_or_else(|| PaymentGatewayError::DatabaseError("Withdrawal was not saved".into()))
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Withdrawal>, PaymentGatewayError> {
    let withdrawal = sqlx::query_as("SELECT * FROM withdrawals WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(withdrawal)
}

/// Compare-and-set on the withdrawal state. `track_id` and `failure_reason` are only overwritten when supplied.
/// Returns `None` if the withdrawal is not in the `from` state.
pub async fn update_state_if(
    id: i64,
    from: WithdrawalState,
    to: WithdrawalState,
    update: WithdrawalUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Withdrawal>, PaymentGatewayError> {
    let updated: Vec<Withdrawal> = sqlx::query_as(
        r#"
            UPDATE withdrawals SET
                state = $1,
                track_id = COALESCE($2, track_id),
                failure_reason = COALESCE($3, failure_reason),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $4 AND state = $5
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(update.track_id)
    .bind(update.failure_reason)
    .bind(id)
    .bind(from)
    .fetch_all(conn)
    .await?;
    Ok(updated.into_iter().next())
}

/// Marks a refundable withdrawal as `refunded`. Returns `None` if it is not refundable.
pub async fn mark_refunded(id: i64, conn: &mut SqliteConnection) -> Result<Option<Withdrawal>, PaymentGatewayError> {
    let refunded: Vec<Withdrawal> = sqlx::query_as(
        r#"
            UPDATE withdrawals SET state = 'refunded', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND state IN ('balance_reserved', 'payout_failed')
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(refunded.into_iter().next())
}

pub async fn fetch_unresolved(conn: &mut SqliteConnection) -> Result<Vec<Withdrawal>, PaymentGatewayError> {
    let withdrawals = sqlx::query_as(
        "SELECT * FROM withdrawals WHERE state IN ('payout_requested', 'payout_failed') ORDER BY id ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(withdrawals)
}
