mod cors;
mod hmac;

pub use cors::cors_policy;
pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService};
