#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use usdt_payment_engine::{
    db_types::{MicroUsdt, NewTransaction, Transaction},
    traits::{Invoice, InvoiceRequest, PayoutReceipt, PayoutRequest},
    PaymentProcessor,
    ProcessorError,
    SqliteDatabase,
    TransactionManagement,
};

/// A fresh, migrated database in the temp directory.
pub async fn prepare_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    let path = std::env::temp_dir().join(format!("upg_engine_test_{}.db", rand::random::<u64>()));
    let url = format!("sqlite://{}", path.display());
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    db.migrate().await.expect("Error running migrations");
    db
}

pub async fn pending_deposit(db: &SqliteDatabase, user_id: &str, usdt: i64, track_id: &str) -> Transaction {
    let url = format!("https://pay.example/{track_id}");
    let tx = NewTransaction::pending_deposit(user_id, MicroUsdt::from_usdt(usdt), track_id, &url, "order-1");
    db.insert_transaction(tx).await.expect("Error inserting deposit")
}

/// A processor that replays scripted answers in order and remembers what it was asked.
#[derive(Clone, Default)]
pub struct FakeProcessor {
    invoices: Arc<Mutex<VecDeque<Result<Invoice, ProcessorError>>>>,
    payouts: Arc<Mutex<VecDeque<Result<PayoutReceipt, ProcessorError>>>>,
    invoice_requests: Arc<Mutex<Vec<InvoiceRequest>>>,
    payout_requests: Arc<Mutex<Vec<PayoutRequest>>>,
}

impl FakeProcessor {
    pub fn with_invoice(self, result: Result<Invoice, ProcessorError>) -> Self {
        self.invoices.lock().unwrap().push_back(result);
        self
    }

    pub fn with_payout(self, result: Result<PayoutReceipt, ProcessorError>) -> Self {
        self.payouts.lock().unwrap().push_back(result);
        self
    }

    pub fn invoice_requests(&self) -> Vec<InvoiceRequest> {
        self.invoice_requests.lock().unwrap().clone()
    }

    pub fn payout_requests(&self) -> Vec<PayoutRequest> {
        self.payout_requests.lock().unwrap().clone()
    }
}

impl PaymentProcessor for FakeProcessor {
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError> {
        self.invoice_requests.lock().unwrap().push(request);
        self.invoices.lock().unwrap().pop_front().expect("No invoice response scripted")
    }

    async fn request_payout(&self, request: PayoutRequest) -> Result<PayoutReceipt, ProcessorError> {
        self.payout_requests.lock().unwrap().push(request);
        self.payouts.lock().unwrap().pop_front().expect("No payout response scripted")
    }
}

pub fn invoice(track_id: &str, payment_url: &str) -> Result<Invoice, ProcessorError> {
    Ok(Invoice { track_id: track_id.to_string(), payment_url: payment_url.to_string(), expires_at: Some(1736501470) })
}

pub fn payout_accepted(track_id: &str) -> Result<PayoutReceipt, ProcessorError> {
    Ok(PayoutReceipt { track_id: track_id.to_string(), status: "processing".to_string() })
}
