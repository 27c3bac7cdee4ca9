use sqlx::SqliteConnection;
use upg_common::MicroUsdt;

use crate::traits::PaymentGatewayError;

pub async fn fetch_balance(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<MicroUsdt>, PaymentGatewayError> {
    let balance = sqlx::query_scalar("SELECT balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(balance)
}

/// Adds `amount` to the balance in a single statement, creating the user record if necessary.
pub async fn increment_balance(
    user_id: &str,
    amount: MicroUsdt,
    conn: &mut SqliteConnection,
) -> Result<MicroUsdt, PaymentGatewayError> {
    let balances: Vec<MicroUsdt> = sqlx::query_scalar(
        r#"
            INSERT INTO users (id, balance) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET balance = balance + excluded.balance, updated_at = CURRENT_TIMESTAMP
            RETURNING balance;
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_all(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.message().contains("CHECK") => {
            PaymentGatewayError::BalanceUpdateError(format!("Crediting {amount} to {user_id} would go negative"))
        },
        _ => PaymentGatewayError::from(e),
    })?;
    balances
        .into_iter()
        .next()
        .ok_or_else(|| PaymentGatewayError::DatabaseError(format!("No balance returned after crediting {user_id}")))
}

/// Subtracts `amount` only if the balance covers it. Returns whether a row was changed.
pub async fn decrement_balance(
    user_id: &str,
    amount: MicroUsdt,
    conn: &mut SqliteConnection,
) -> Result<bool, PaymentGatewayError> {
    let result = sqlx::query(
        "UPDATE users SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND balance >= $3",
    )
    .bind(amount)
    .bind(user_id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
