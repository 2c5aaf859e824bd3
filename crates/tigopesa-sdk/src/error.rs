//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every outbound
//! operation. [`InboundError`] covers the provider-initiated routes and
//! implements [`axum::response::IntoResponse`] so the dispatcher can
//! answer failures directly.
//!
//! Business failures reported *inside* a decoded response body
//! (`TXNSTATUS`, `ResponseStatus: false`) are data, not errors.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tigopesa_models::CodecError;

/// Error returned by a caller-supplied inbound handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for all outbound SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid or missing configuration (e.g. HTTP client could not be built).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connection refused, TLS, reset…).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete within the client timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The client's cancellation scope fired while the call was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The token endpoint answered with an error code.
    #[error("authentication failed: {code}: {description}")]
    Auth {
        /// Provider error code (`error`).
        code: String,
        /// Provider error description (`error_description`).
        description: String,
    },

    /// The token request itself could not be completed.
    #[error("could not obtain access token: {0}")]
    TokenUnavailable(#[source] Box<SdkError>),

    /// Payload could not be encoded or a non-empty body failed to decode.
    #[error("payload error: {0}")]
    Codec(#[from] CodecError),
}

/// Failure while serving a provider-initiated request.
///
/// Every variant is answered with HTTP 500 and the error text as a
/// plain-text body; the provider gets no structured error envelope.
#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    /// The request body did not decode into the route's request type.
    #[error("invalid request body: {0}")]
    Decode(#[source] CodecError),

    /// The handler returned an error.
    #[error("{0}")]
    Handler(#[source] HandlerError),

    /// The handler did not finish within the client timeout.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// The client's cancellation scope fired while the handler was running.
    #[error("request cancelled")]
    Cancelled,

    /// The handler's response could not be encoded.
    #[error("could not encode response: {0}")]
    Encode(#[source] CodecError),
}

impl IntoResponse for InboundError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "inbound request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_combines_code_and_description() {
        let err = SdkError::Auth {
            code: "invalid_grant".into(),
            description: "bad credentials".into(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid_grant: bad credentials"
        );
    }

    #[test]
    fn token_unavailable_keeps_source() {
        use std::error::Error as _;

        let err = SdkError::TokenUnavailable(Box::new(SdkError::Timeout(Duration::from_secs(5))));
        assert!(err.to_string().starts_with("could not obtain access token"));
        assert!(err.source().is_some());
    }

    #[test]
    fn inbound_error_is_plain_text_500() {
        let err = InboundError::Handler("reference not found".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/plain"), "{content_type}");
    }
}
