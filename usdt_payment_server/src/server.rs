use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, web::ServiceConfig, App, HttpServer};
use log::*;
use usdt_payment_engine::{
    DepositFlowApi,
    PaymentGatewayDatabase,
    PaymentProcessor,
    SqliteDatabase,
    WebhookApi,
    WithdrawalFlowApi,
};

use crate::{
    config::{ServerConfig, WebhookConfig, WEBHOOK_HMAC_HEADER},
    errors::ServerError,
    integrations::oxapay::OxaPayProcessor,
    middleware::{cors_policy, HmacMiddlewareFactory},
    routes::{health, json_config, CreateInvoiceRoute, WebhookRoute, WithdrawRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let processor =
        OxaPayProcessor::new(config.oxapay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🌐️ Payments are processed by OxaPay at {}", processor.api().config().api_url);
    let srv = create_server_instance(config, db, processor)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    processor: OxaPayProcessor,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let deposit_api = DepositFlowApi::new(db.clone(), processor.clone(), config.gateway_urls());
        let webhook_api = WebhookApi::new(db.clone(), config.webhook.settings.clone());
        let withdrawal_api = WithdrawalFlowApi::new(db.clone(), processor.clone());
        let webhook_config = config.webhook.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("upg::access_log"))
            .wrap(cors_policy(&config.cors_allowed_origins))
            .app_data(web::Data::new(deposit_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(withdrawal_api))
            .service(health)
            .configure(|cfg| configure_oxapay_routes::<SqliteDatabase, OxaPayProcessor>(cfg, &webhook_config))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Mounts the `/api/oxapay` routes. The API objects they use must already be registered as app data.
///
/// Only the webhook sits behind the HMAC check. Deposit and withdrawal requests come from the front end.
pub fn configure_oxapay_routes<B, P>(cfg: &mut ServiceConfig, webhook: &WebhookConfig)
where
    B: PaymentGatewayDatabase + 'static,
    P: PaymentProcessor + 'static,
{
    let hmac = HmacMiddlewareFactory::new(WEBHOOK_HMAC_HEADER, webhook.hmac_secret.clone(), webhook.hmac_checks);
    cfg.app_data(json_config()).service(
        web::scope("/api/oxapay")
            .service(CreateInvoiceRoute::<B, P>::new())
            .service(WithdrawRoute::<B, P>::new())
            .service(web::scope("/webhook").wrap(hmac).service(WebhookRoute::<B>::new())),
    );
}
