use sqlx::SqliteConnection;

use crate::{
    db_types::{CorrelationField, NewTransaction, Transaction, TransactionStatus},
    traits::PaymentGatewayError,
};

pub async fn insert(transaction: NewTransaction, conn: &mut SqliteConnection) -> Result<Transaction, PaymentGatewayError> {
    let inserted: Vec<Transaction> = sqlx::query_as(
        r#"
            INSERT INTO transactions
                (user_id, tx_type, amount, status, wallet_address, track_id, payment_url, order_id, withdrawal_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(transaction.user_id)
    .bind(transaction.tx_type)
    .bind(transaction.amount)
    .bind(transaction.status)
    .bind(transaction.wallet_address)
    .bind(transaction.track_id)
    .bind(transaction.payment_url)
    .bind(transaction.order_id)
    .bind(transaction.withdrawal_id)
    .fetch_all(conn)
    .await?;
    inserted.into_iter().next().ok_or_else(|| PaymentGatewayError::DatabaseError("Transaction was not saved".into()))
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, PaymentGatewayError> {
    let transaction = sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(transaction)
}

pub async fn fetch_by_correlation(
    field: CorrelationField,
    value: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, PaymentGatewayError> {
    // The column name comes from a closed enum, never from user input.
    let q = format!("SELECT * FROM transactions WHERE {} = $1 ORDER BY id DESC LIMIT 1", field.column());
    let transaction = sqlx::query_as(&q).bind(value).fetch_optional(conn).await?;
    Ok(transaction)
}

pub async fn fetch_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Transaction>, PaymentGatewayError> {
    let transactions = sqlx::query_as("SELECT * FROM transactions WHERE user_id = $1 ORDER BY id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(transactions)
}

/// Moves an open transaction to `status`. Returns `None` if the transaction cannot make that move.
///
/// A `pending` transaction can move to any terminal status. A `failed` transaction can still complete, since
/// processors report a late payment after an interim status. A `completed` transaction never moves again.
pub async fn settle_pending(
    id: i64,
    status: TransactionStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, PaymentGatewayError> {
    let settled: Vec<Transaction> = sqlx::query_as(
        r#"
            UPDATE transactions SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND (status = 'pending' OR (status = 'failed' AND $3 = 'completed'))
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(id)
    .bind(status)
    .fetch_all(conn)
    .await?;
    Ok(settled.into_iter().next())
}
