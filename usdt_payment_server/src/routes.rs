//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into the payment engine. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits database and processor futures, so
//! workers keep serving other requests while a payout or an invoice is in flight.
use actix_web::{error::JsonPayloadError, get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use usdt_payment_engine::{
    flow_objects::{DepositRequest, WebhookNotification, WebhookOutcome, WithdrawalRequest},
    DepositFlowApi,
    PaymentGatewayDatabase,
    PaymentProcessor,
    WebhookApi,
    WithdrawalFlowApi,
};

use crate::{
    data_objects::{InvoiceResponse, JsonResponse, WithdrawalResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Turns malformed JSON bodies into the standard `{success: false, error}` reply.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, req: &HttpRequest| {
        debug!("💻️ Rejecting malformed JSON body for {}. {err}", req.path());
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Deposits  ----------------------------------------------------
route!(create_invoice => Post "/create-invoice" impl PaymentGatewayDatabase, PaymentProcessor);
/// Creates a processor invoice for a deposit and records it as pending.
///
/// The user's balance does not change here. It is credited when the processor reports the payment on the webhook.
pub async fn create_invoice<B, P>(
    api: web::Data<DepositFlowApi<B, P>>,
    body: web::Json<DepositRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    trace!("💻️ Received deposit request");
    let invoice = api.create_deposit(body.into_inner()).await.map_err(|e| {
        debug!("💻️ Could not create deposit invoice. {e}");
        e
    })?;
    info!("💻️ Deposit invoice {} created. Order {}", invoice.track_id, invoice.order_id);
    Ok(HttpResponse::Ok().json(InvoiceResponse::from(invoice)))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(webhook => Post "" impl PaymentGatewayDatabase);
/// Receives payment status notifications from the processor. Mounted behind the HMAC middleware.
///
/// Repeated deliveries and notifications for deposits that are already settled are acknowledged without any change,
/// so the processor can retry freely.
pub async fn webhook<B>(
    api: web::Data<WebhookApi<B>>,
    body: web::Json<WebhookNotification>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
{
    let notification = body.into_inner();
    info!(
        "💻️ Webhook received for {} with status {}",
        notification.correlation_id().unwrap_or("??"),
        notification.status().unwrap_or("??")
    );
    match api.handle_notification(notification).await? {
        WebhookOutcome::Settled { transaction_id, status } => {
            info!("💻️ Deposit #{transaction_id} is now {status}");
        },
        WebhookOutcome::Duplicate => debug!("💻️ Webhook was delivered before. Acknowledged."),
        WebhookOutcome::AlreadySettled { transaction_id, status } => {
            debug!("💻️ Deposit #{transaction_id} was already {status}. Acknowledged.");
        },
        WebhookOutcome::Ignored { transaction_id } => {
            debug!("💻️ Transaction #{transaction_id} is not a deposit. Acknowledged.");
        },
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success()))
}

//----------------------------------------------   Withdrawals  ----------------------------------------------------
route!(withdraw => Post "/withdraw" impl PaymentGatewayDatabase, PaymentProcessor);
/// Sends funds from the user's balance to an external address.
///
/// A refused payout is refunded and reported as a 400. If the processor's answer is lost the amount stays reserved
/// and the reply is a 202 carrying the withdrawal id, for an operator to resolve.
pub async fn withdraw<B, P>(
    api: web::Data<WithdrawalFlowApi<B, P>>,
    body: web::Json<WithdrawalRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    trace!("💻️ Received withdrawal request");
    let receipt = api.request_withdrawal(body.into_inner()).await.map_err(|e| {
        debug!("💻️ Withdrawal did not complete. {e}");
        e
    })?;
    info!("💻️ Withdrawal #{} paid out. Track id {}", receipt.withdrawal_id, receipt.track_id);
    Ok(HttpResponse::Ok().json(WithdrawalResponse::from(receipt)))
}
