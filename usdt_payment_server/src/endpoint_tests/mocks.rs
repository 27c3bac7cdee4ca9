use mockall::mock;
use usdt_payment_engine::{
    traits::{Invoice, InvoiceRequest, PayoutReceipt, PayoutRequest},
    PaymentProcessor,
    ProcessorError,
};

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError>;
        async fn request_payout(&self, request: PayoutRequest) -> Result<PayoutReceipt, ProcessorError>;
    }
}
