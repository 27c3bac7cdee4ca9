use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use serde_json::json;
use thiserror::Error;
use usdt_payment_engine::PaymentFlowError;

const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid HMAC signature")]
    InvalidSignature,
    #[error("{0}")]
    PaymentFlowError(#[from] PaymentFlowError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The message clients see. Details of local failures stay in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::PaymentFlowError(PaymentFlowError::InternalError(msg)) => msg.clone(),
            Self::PaymentFlowError(e) => e.to_string(),
            Self::InvalidRequestBody(_) | Self::InvalidSignature => self.to_string(),
            _ => GENERIC_INTERNAL_ERROR.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::PaymentFlowError(e) => match e {
                PaymentFlowError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::GatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentFlowError::InsufficientBalance => StatusCode::BAD_REQUEST,
                PaymentFlowError::UserNotFound => StatusCode::BAD_REQUEST,
                PaymentFlowError::NotFound(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentFlowError::PayoutFailed(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::PayoutPending { .. } => StatusCode::ACCEPTED,
            },
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::PaymentFlowError(PaymentFlowError::PayoutPending { withdrawal_id }) => {
                json!({ "success": false, "error": self.client_message(), "withdrawal_id": withdrawal_id })
            },
            _ => json!({ "success": false, "error": self.client_message() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
