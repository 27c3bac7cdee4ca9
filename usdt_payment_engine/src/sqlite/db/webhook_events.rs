use sqlx::SqliteConnection;

use crate::{db_types::TransactionStatus, traits::PaymentGatewayError};

/// Records a processed webhook event. Returns `false` if an event with the same key was already recorded.
pub async fn record_event(
    event_key: &str,
    transaction_id: i64,
    status: TransactionStatus,
    conn: &mut SqliteConnection,
) -> Result<bool, PaymentGatewayError> {
    let result = sqlx::query(
        r#"
            INSERT INTO webhook_events (event_key, transaction_id, status) VALUES ($1, $2, $3)
            ON CONFLICT (event_key) DO NOTHING;
        "#,
    )
    .bind(event_key)
    .bind(transaction_id)
    .bind(status)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
