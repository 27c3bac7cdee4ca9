use std::env;

use actix_web::http::Uri;
use log::*;
use oxapay_tools::OxaPayConfig;
use upg_common::{
    helpers::{parse_boolean_flag, parse_lowercase_list},
    Secret,
};
use usdt_payment_engine::{db_types::CorrelationField, GatewayUrls, WebhookSettings};

use crate::errors::ServerError;

const DEFAULT_UPG_HOST: &str = "127.0.0.1";
const DEFAULT_UPG_PORT: u16 = 8360;
/// The header OxaPay signs its callbacks in.
pub const WEBHOOK_HMAC_HEADER: &str = "HMAC";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The externally reachable URL of this deployment. Callback and return URLs are derived from it.
    pub public_base_url: String,
    /// Origins allowed to call the API from a browser. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub oxapay: OxaPayConfig,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// If false, webhook signatures are not checked at all. Only for local development.
    pub hmac_checks: bool,
    pub hmac_secret: Secret<String>,
    pub settings: WebhookSettings,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { hmac_checks: true, hmac_secret: Secret::default(), settings: WebhookSettings::default() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UPG_HOST.to_string(),
            port: DEFAULT_UPG_PORT,
            database_url: String::default(),
            public_base_url: String::default(),
            cors_allowed_origins: Vec::default(),
            oxapay: OxaPayConfig::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    /// Loads the configuration from `UPG_*` environment variables. Missing required values are an error, so the server
    /// refuses to start rather than fail on the first request.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("UPG_HOST").ok().unwrap_or_else(|| DEFAULT_UPG_HOST.into());
        let port = env::var("UPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for UPG_PORT. {e} Using the default, {DEFAULT_UPG_PORT}, instead."
                    );
                    DEFAULT_UPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_UPG_PORT);
        let database_url = required_var("UPG_DATABASE_URL", "the URL for the gateway database")?;
        let public_base_url = required_var("UPG_PUBLIC_BASE_URL", "the public URL of this server")?;
        let cors_allowed_origins = match env::var("UPG_CORS_ALLOWED_ORIGINS") {
            Ok(s) => parse_allowed_origins(&s)?,
            Err(_) => Vec::default(),
        };
        if cors_allowed_origins.is_empty() {
            info!("🪛️ Browsers on any origin may call the API. Set UPG_CORS_ALLOWED_ORIGINS to restrict this.");
        } else {
            info!("🪛️ Browsers may call the API from {}", cors_allowed_origins.join(", "));
        }
        let oxapay = OxaPayConfig::try_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        let webhook = WebhookConfig::from_env(&oxapay);
        Ok(Self { host, port, database_url, public_base_url, cors_allowed_origins, oxapay, webhook })
    }

    pub fn gateway_urls(&self) -> GatewayUrls {
        GatewayUrls::from_base_url(&self.public_base_url)
    }
}

impl WebhookConfig {
    pub fn from_env(oxapay: &OxaPayConfig) -> Self {
        let hmac_checks = parse_boolean_flag(env::var("UPG_WEBHOOK_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!(
                "🚨️ Webhook HMAC checks are DISABLED. Anyone who can reach this server can settle deposits. Set \
                 UPG_WEBHOOK_HMAC_CHECKS=true outside of local development."
            );
        }
        let hmac_secret = match env::var("UPG_WEBHOOK_HMAC_SECRET") {
            Ok(s) if !s.trim().is_empty() => Secret::new(s),
            _ => {
                debug!("🪛️ UPG_WEBHOOK_HMAC_SECRET is not set. Webhooks are verified with the merchant API key.");
                oxapay.merchant_api_key.clone()
            },
        };
        let mut settings = WebhookSettings::default();
        if let Ok(s) = env::var("UPG_WEBHOOK_SUCCESS_STATUSES") {
            let statuses = parse_lowercase_list(&s);
            if statuses.is_empty() {
                warn!("🪛️ UPG_WEBHOOK_SUCCESS_STATUSES is empty. Using the defaults, {:?}", settings.success_statuses);
            } else {
                settings.success_statuses = statuses;
            }
        }
        info!("🪛️ Webhook statuses that credit a deposit: {}", settings.success_statuses.join(", "));
        if let Ok(s) = env::var("UPG_CORRELATION_FIELD") {
            settings.correlation_field = s.parse::<CorrelationField>().unwrap_or_else(|e| {
                warn!("🪛️ {e}. Matching webhooks on {} instead.", CorrelationField::default());
                CorrelationField::default()
            });
        }
        info!("🪛️ Webhooks are matched to deposits by {}", settings.correlation_field);
        Self { hmac_checks, hmac_secret, settings }
    }
}

/// Parses a comma-separated list of origins such as `https://app.example, http://localhost:3000`. `*` or an empty
/// list allows every origin.
pub fn parse_allowed_origins(value: &str) -> Result<Vec<String>, ServerError> {
    let origins: Vec<&str> =
        value.split(',').map(|s| s.trim().trim_end_matches('/')).filter(|s| !s.is_empty()).collect();
    if origins.contains(&"*") {
        return Ok(Vec::default());
    }
    origins
        .into_iter()
        .map(|origin| match origin.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => Ok(origin.to_ascii_lowercase()),
            _ => {
                error!("🪛️ {origin} in UPG_CORS_ALLOWED_ORIGINS is not an origin like https://app.example");
                Err(ServerError::ConfigurationError(format!("Invalid CORS origin: {origin}")))
            },
        })
        .collect()
}

fn required_var(name: &str, purpose: &str) -> Result<String, ServerError> {
    match env::var(name) {
        Ok(s) if !s.trim().is_empty() => Ok(s),
        _ => {
            error!("🪛️ {name} is not set. Please set it to {purpose}.");
            Err(ServerError::ConfigurationError(format!("{name} is not set")))
        },
    }
}
