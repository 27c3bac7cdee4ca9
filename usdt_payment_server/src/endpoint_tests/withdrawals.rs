use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use upg_common::MicroUsdt;
use usdt_payment_engine::{
    db_types::{TransactionStatus, TransactionType, WithdrawalState},
    traits::PayoutReceipt,
    BalanceManagement,
    PaymentGatewayDatabase,
    ProcessorError,
    SqliteDatabase,
    TransactionManagement,
    WithdrawalFlowApi,
};

use super::{
    helpers::{post_request, prepare_db, webhook_config},
    mocks::MockProcessor,
};
use crate::server::configure_oxapay_routes;

const PATH: &str = "/api/oxapay/withdraw";

fn configure(db: SqliteDatabase, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(WithdrawalFlowApi::new(db, processor)));
        configure_oxapay_routes::<SqliteDatabase, MockProcessor>(cfg, &webhook_config(true));
    }
}

async fn funded_db(usdt: i64) -> SqliteDatabase {
    let db = prepare_db().await;
    db.increment_balance("alice", MicroUsdt::from_usdt(usdt)).await.unwrap();
    db
}

fn withdraw_30() -> String {
    json!({"amount": 30, "wallet_address": "T123abc", "user_id": "alice"}).to_string()
}

#[actix_web::test]
async fn successful_payout() {
    let db = funded_db(50).await;
    let mut processor = MockProcessor::new();
    processor
        .expect_request_payout()
        .withf(|req| req.address == "T123abc" && req.amount == MicroUsdt::from_usdt(30))
        .times(1)
        .returning(|_| Ok(PayoutReceipt { track_id: "wd-1".into(), status: "processing".into() }));
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Withdrawal processed successfully", "track_id": "wd-1"}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(20)));
    let txs = db.fetch_transactions_for_user("alice").await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TransactionType::Withdrawal);
    assert_eq!(txs[0].status, TransactionStatus::Completed);
    assert_eq!(txs[0].wallet_address.as_deref(), Some("T123abc"));
}

#[actix_web::test]
async fn rejected_payout_is_refunded() {
    let db = funded_db(50).await;
    let mut processor = MockProcessor::new();
    processor.expect_request_payout().times(1).returning(|_| Err(ProcessorError::Rejected(String::new())));
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Payout failed"}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(50)));
    let txs = db.fetch_transactions_for_user("alice").await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Failed);
    assert!(db.fetch_unresolved_withdrawals().await.unwrap().is_empty());
}

#[actix_web::test]
async fn rejection_message_is_passed_through() {
    let db = funded_db(50).await;
    let mut processor = MockProcessor::new();
    processor
        .expect_request_payout()
        .times(1)
        .returning(|_| Err(ProcessorError::Rejected("Invalid address".into())));
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid address");
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(50)));
}

#[actix_web::test]
async fn timed_out_payout_stays_reserved() {
    let db = funded_db(50).await;
    let mut processor = MockProcessor::new();
    processor.expect_request_payout().times(1).returning(|_| Err(ProcessorError::Timeout("30s".into())));
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], false);
    let withdrawal_id = body["withdrawal_id"].as_i64().unwrap();
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(20)));
    let withdrawal = db.fetch_withdrawal(withdrawal_id).await.unwrap().unwrap();
    assert_eq!(withdrawal.state, WithdrawalState::PayoutRequested);
}

#[actix_web::test]
async fn insufficient_balance() {
    let db = funded_db(20).await;
    let mut processor = MockProcessor::new();
    processor.expect_request_payout().never();
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Insufficient balance"}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(20)));
}

#[actix_web::test]
async fn unknown_user() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor.expect_request_payout().never();
    let (status, body) = post_request(PATH, &withdraw_30(), &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User not found");
}

#[actix_web::test]
async fn missing_wallet_address() {
    let db = funded_db(50).await;
    let mut processor = MockProcessor::new();
    processor.expect_request_payout().never();
    let body = json!({"amount": 30, "user_id": "alice"}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing amount, wallet_address or user_id");
}
