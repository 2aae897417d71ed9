//! Hub error types.
//!
//! Errors here affect whether a registry change is committed, so they are
//! always reported back to the caller of the intent endpoint. Delivery
//! failures are not errors: they become a [`DeliveryOutcome`] instead.
//!
//! [`DeliveryOutcome`]: crate::domain::DeliveryOutcome

use std::time::Duration;

/// HTTP status codes the boundary uses for each error class.
pub mod status {
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const BAD_GATEWAY: u16 = 502;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// Errors raised while parsing or verifying a subscription intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// A required parameter is missing or empty
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `hub.mode` is neither `subscribe` nor `unsubscribe`
    #[error("unsupported hub.mode: {0}")]
    UnknownMode(String),

    /// `hub.callback` is not an absolute http(s) URL
    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    /// The callback answered 2xx but echoed the wrong body
    #[error("challenge mismatch")]
    ChallengeMismatch,

    /// The callback answered with a non-2xx status
    #[error("subscriber did not confirm intent (status {status})")]
    IntentNotConfirmed { status: u16 },

    /// DNS, connect or read failure while reaching the callback
    #[error("callback unreachable: {0}")]
    CallbackUnreachable(String),

    /// The challenge round-trip exceeded the verification timeout
    #[error("verification timed out after {}ms", .0.as_millis())]
    VerificationTimeout(Duration),
}

impl HubError {
    /// Missing or empty form field.
    pub fn missing(field: &str) -> Self {
        HubError::InvalidRequest(format!("missing {}", field))
    }

    /// HTTP status reported to the inbound caller.
    pub fn status_code(&self) -> u16 {
        match self {
            HubError::InvalidRequest(_)
            | HubError::UnknownMode(_)
            | HubError::InvalidCallback(_) => status::BAD_REQUEST,
            HubError::ChallengeMismatch | HubError::IntentNotConfirmed { .. } => {
                status::FORBIDDEN
            }
            HubError::CallbackUnreachable(_) => status::BAD_GATEWAY,
            HubError::VerificationTimeout(_) => status::GATEWAY_TIMEOUT,
        }
    }
}

/// Result type for hub operations
pub type HubResult<T> = Result<T, HubError>;
