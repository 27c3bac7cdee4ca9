use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use upg_common::MicroUsdt;
use usdt_payment_engine::{
    db_types::{CorrelationField, TransactionStatus, TransactionType},
    traits::Invoice,
    DepositFlowApi,
    GatewayUrls,
    ProcessorError,
    SqliteDatabase,
    TransactionManagement,
};

use super::{
    helpers::{post_request, prepare_db, webhook_config, BASE_URL},
    mocks::MockProcessor,
};
use crate::server::configure_oxapay_routes;

const PATH: &str = "/api/oxapay/create-invoice";

fn configure(db: SqliteDatabase, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = DepositFlowApi::new(db, processor, GatewayUrls::from_base_url(BASE_URL));
        cfg.app_data(web::Data::new(api));
        configure_oxapay_routes::<SqliteDatabase, MockProcessor>(cfg, &webhook_config(true));
    }
}

#[actix_web::test]
async fn deposit_creates_pending_transaction() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor
        .expect_create_invoice()
        .withf(|req| {
            req.amount == MicroUsdt::from_usdt(100) &&
                req.callback_url == "https://gw.example/api/oxapay/webhook" &&
                req.return_url == "https://gw.example/dashboard" &&
                req.order_id.starts_with("alice-")
        })
        .times(1)
        .returning(|_| {
            Ok(Invoice {
                track_id: "abc".into(),
                payment_url: "https://pay.example/abc".into(),
                expires_at: Some(1_736_501_470),
            })
        });
    let body = json!({"amount": 100, "user_id": "alice"}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "wallet_address": "https://pay.example/abc", "track_id": "abc", "expiration": 1736501470})
    );
    let deposits = db.fetch_transactions_for_user("alice").await.unwrap();
    assert_eq!(deposits.len(), 1);
    let deposit = db.fetch_transaction_by_correlation(CorrelationField::TrackId, "abc").await.unwrap().unwrap();
    assert_eq!(deposit.tx_type, TransactionType::Deposit);
    assert_eq!(deposit.status, TransactionStatus::Pending);
    assert_eq!(deposit.payment_url.as_deref(), Some("https://pay.example/abc"));
    assert_eq!(deposit.amount, MicroUsdt::from_usdt(100));
}

#[actix_web::test]
async fn string_amounts_are_accepted() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor.expect_create_invoice().withf(|req| req.amount == MicroUsdt::from(12_500_000)).times(1).returning(|_| {
        Ok(Invoice { track_id: "t-12".into(), payment_url: "https://pay.example/t-12".into(), expires_at: None })
    });
    let body = json!({"amount": "12.5", "user_id": "bob"}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["track_id"], "t-12");
    assert!(body["expiration"].is_null());
}

#[actix_web::test]
async fn missing_fields_are_rejected_without_calling_the_processor() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor.expect_create_invoice().never();
    let body = json!({"amount": 100}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Missing amount or user_id"}));
    assert!(db.fetch_transactions_for_user("alice").await.unwrap().is_empty());
}

#[actix_web::test]
async fn zero_amount_is_missing() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor.expect_create_invoice().never();
    let body = json!({"amount": 0, "user_id": "alice"}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing amount or user_id");
}

#[actix_web::test]
async fn processor_rejection_is_passed_through() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor
        .expect_create_invoice()
        .times(1)
        .returning(|_| Err(ProcessorError::Rejected("Invalid merchant API key".into())));
    let body = json!({"amount": 100, "user_id": "alice"}).to_string();
    let (status, body) = post_request(PATH, &body, &[], configure(db.clone(), processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Invalid merchant API key"}));
    assert!(db.fetch_transactions_for_user("alice").await.unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let db = prepare_db().await;
    let mut processor = MockProcessor::new();
    processor.expect_create_invoice().never();
    let (status, body) = post_request(PATH, "{\"amount\": 100,", &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read request body"));
}
