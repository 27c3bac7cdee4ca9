use actix_web::{http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use serde_json::Value;
use upg_common::{MicroUsdt, Secret};
use usdt_payment_engine::{
    db_types::NewTransaction,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    SqliteDatabase,
    TransactionManagement,
    WebhookSettings,
};

use crate::{config::WebhookConfig, helpers::calculate_hmac};

pub const BASE_URL: &str = "https://gw.example";
pub const HMAC_SECRET: &str = "test-merchant-key";

pub async fn prepare_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

pub fn webhook_config(hmac_checks: bool) -> WebhookConfig {
    WebhookConfig { hmac_checks, hmac_secret: Secret::new(HMAC_SECRET.to_string()), settings: WebhookSettings::default() }
}

pub fn sign(body: &str) -> String {
    calculate_hmac(HMAC_SECRET, body.as_bytes()).expect("HMAC accepts any key")
}

/// A pending deposit, as the deposit flow would have recorded it.
pub async fn pending_deposit(db: &SqliteDatabase, user_id: &str, usdt: i64, track_id: &str) -> i64 {
    let deposit = NewTransaction::pending_deposit(
        user_id,
        MicroUsdt::from_usdt(usdt),
        track_id,
        &format!("https://pay.example/{track_id}"),
        &format!("{user_id}-1700000000000"),
    );
    db.insert_transaction(deposit).await.expect("Could not insert deposit").id
}

pub async fn post_request<F>(path: &str, body: &str, headers: &[(&str, &str)], configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    for header in headers {
        req = req.insert_header(*header);
    }
    let req = req.set_payload(body.to_string()).to_request();
    let service = test::init_service(App::new().configure(configure)).await;
    debug!("Making request to {path}");
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
