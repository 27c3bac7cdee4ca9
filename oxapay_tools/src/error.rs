use thiserror::Error;

/// Errors from the OxaPay client.
///
/// `Initialization`, `Unreachable` and `QueryError` mean OxaPay did not act on the request. For the others the request
/// may have been carried out.
#[derive(Debug, Clone, Error)]
pub enum OxaPayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach OxaPay: {0}")]
    Unreachable(String),
    #[error("Request to OxaPay timed out: {0}")]
    Timeout(String),
    #[error("Transport error after the request was sent: {0}")]
    TransportError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    /// OxaPay answered with its own error reply.
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    /// A server error that did not come with an OxaPay error reply, typically from a gateway or proxy in front of it.
    #[error("OxaPay is unavailable. Error {status}. {message}")]
    ServiceUnavailable { status: u16, message: String },
    #[error("OxaPay returned an empty response")]
    EmptyResponse,
}
