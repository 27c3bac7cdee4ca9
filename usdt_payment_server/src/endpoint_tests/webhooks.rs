use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use upg_common::MicroUsdt;
use usdt_payment_engine::{
    db_types::TransactionStatus,
    BalanceManagement,
    SqliteDatabase,
    TransactionManagement,
    WebhookApi,
    WebhookSettings,
};

use super::{
    helpers::{pending_deposit, post_request, prepare_db, sign, webhook_config},
    mocks::MockProcessor,
};
use crate::server::configure_oxapay_routes;

const PATH: &str = "/api/oxapay/webhook";

fn configure(db: SqliteDatabase, hmac_checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(WebhookApi::new(db, WebhookSettings::default())));
        configure_oxapay_routes::<SqliteDatabase, MockProcessor>(cfg, &webhook_config(hmac_checks));
    }
}

async fn signed_post(db: &SqliteDatabase, body: &str) -> (StatusCode, serde_json::Value) {
    let signature = sign(body);
    post_request(PATH, body, &[("HMAC", signature.as_str())], configure(db.clone(), true)).await
}

#[actix_web::test]
async fn paid_webhook_credits_the_stored_amount_once() {
    let db = prepare_db().await;
    let id = pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "abc", "status": "Paid", "amount": 100}).to_string();

    let (status, body_json) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json, json!({"success": true}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(100)));
    let deposit = db.fetch_transaction(id).await.unwrap().unwrap();
    assert_eq!(deposit.status, TransactionStatus::Completed);

    // Redelivery
    let (status, body_json) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json, json!({"success": true}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(100)));
}

#[actix_web::test]
async fn credit_uses_the_stored_amount_not_the_payload() {
    let db = prepare_db().await;
    pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "abc", "status": "paid", "amount": 1000000}).to_string();
    let (status, _) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(100)));
}

#[actix_web::test]
async fn other_statuses_fail_the_deposit() {
    let db = prepare_db().await;
    let id = pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "abc", "status": "Expired"}).to_string();
    let (status, body_json) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json, json!({"success": true}));
    assert_eq!(db.fetch_transaction(id).await.unwrap().unwrap().status, TransactionStatus::Failed);
    assert_eq!(db.fetch_balance("alice").await.unwrap(), None);

    // The payment itself can still arrive after an interim status
    let body = json!({"track_id": "abc", "status": "Paid"}).to_string();
    let (status, _) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_transaction(id).await.unwrap().unwrap().status, TransactionStatus::Completed);
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(100)));
}

#[actix_web::test]
async fn unknown_track_id_is_not_found() {
    let db = prepare_db().await;
    let id = pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "nope", "status": "paid"}).to_string();
    let (status, body_json) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json, json!({"success": false, "error": "Transaction not found"}));
    assert_eq!(db.fetch_transaction(id).await.unwrap().unwrap().status, TransactionStatus::Pending);
}

#[actix_web::test]
async fn missing_status_is_invalid() {
    let db = prepare_db().await;
    let body = json!({"track_id": "abc"}).to_string();
    let (status, body_json) = signed_post(&db, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json["success"], false);
}

#[actix_web::test]
async fn bad_signature_is_forbidden() {
    let db = prepare_db().await;
    let id = pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "abc", "status": "paid"}).to_string();
    let forged = sign(&json!({"track_id": "abc", "status": "expired"}).to_string());
    let (status, body_json) =
        post_request(PATH, &body, &[("HMAC", forged.as_str())], configure(db.clone(), true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body_json, json!({"success": false, "error": "Invalid HMAC signature"}));
    assert_eq!(db.fetch_transaction(id).await.unwrap().unwrap().status, TransactionStatus::Pending);
    assert_eq!(db.fetch_balance("alice").await.unwrap(), None);
}

#[actix_web::test]
async fn unsigned_webhook_is_forbidden() {
    let db = prepare_db().await;
    let id = pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"track_id": "abc", "status": "paid"}).to_string();
    let (status, _) = post_request(PATH, &body, &[], configure(db.clone(), true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(db.fetch_transaction(id).await.unwrap().unwrap().status, TransactionStatus::Pending);
}

#[actix_web::test]
async fn checks_can_be_disabled() {
    let db = prepare_db().await;
    pending_deposit(&db, "alice", 100, "abc").await;
    let body = json!({"wallet_address": "abc", "status": "confirmed"}).to_string();
    let (status, body_json) = post_request(PATH, &body, &[], configure(db.clone(), false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json, json!({"success": true}));
    assert_eq!(db.fetch_balance("alice").await.unwrap(), Some(MicroUsdt::from_usdt(100)));
}
