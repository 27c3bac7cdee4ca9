//! Cross-origin access for the browser front end.
//!
//! The dashboard calls `/create-invoice` and `/withdraw` straight from the browser, usually from another origin than
//! this server. Preflight requests are answered here and never reach a route.
use actix_cors::Cors;
use actix_web::http::header;

const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// The CORS policy for the whole app. An empty origin list allows every origin.
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(["GET", "POST"])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE_SECS);
    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    allowed_origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}
