//! # Outbound Ports (Driven Ports)
//!
//! The hub talks to subscribers through exactly two requests: the challenge
//! GET during verification and the signed content POST during fan-out.
//! [`CallbackClient`] abstracts both so the services can be driven by the
//! `reqwest` adapter in production and by in-memory mocks in tests.

use crate::domain::{validate_callback, Mode};
use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Query parameter names of the challenge request.
pub mod params {
    pub const MODE: &str = "hub.mode";
    pub const TOPIC: &str = "hub.topic";
    pub const CHALLENGE: &str = "hub.challenge";
}

/// Challenge sent to a callback before (un)subscribing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    pub callback: String,
    pub mode: Mode,
    pub topic: String,
    pub challenge: String,
}

impl ChallengeRequest {
    /// Callback URL with the `hub.*` parameters appended.
    ///
    /// Query parameters already present on the callback are kept.
    pub fn url(&self) -> Result<Url, TransportError> {
        let mut url = validate_callback(&self.callback)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair(params::MODE, self.mode.as_str())
            .append_pair(params::TOPIC, &self.topic)
            .append_pair(params::CHALLENGE, &self.challenge);
        Ok(url)
    }
}

/// Callback's answer to a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    pub status: u16,
    /// Body as read by the adapter, possibly truncated to the read limit
    pub body: Bytes,
}

/// One signed content delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub callback: String,
    pub payload: Bytes,
    pub content_type: String,
    /// Header name, e.g. `X-Hub-Signature`
    pub signature_header: String,
    /// Header value, `sha256=<hex>`
    pub signature: String,
}

/// Failures below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// DNS resolution, connect or TLS failure
    #[error("connection failed: {0}")]
    Connect(String),
    /// The adapter's own timeout fired
    #[error("request timed out")]
    Timeout,
    /// The request could not be built (bad URL, bad header)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The response body could not be read
    #[error("failed to read response: {0}")]
    Body(String),
}

/// Outbound HTTP capability used by verification and distribution.
#[async_trait]
pub trait CallbackClient: Send + Sync {
    /// `GET callback?hub.mode=..&hub.topic=..&hub.challenge=..`
    async fn send_challenge(
        &self,
        request: &ChallengeRequest,
    ) -> Result<ChallengeResponse, TransportError>;

    /// `POST callback` with the signed payload. Returns the HTTP status.
    async fn deliver(&self, request: &DeliveryRequest) -> Result<u16, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge_for(callback: &str) -> ChallengeRequest {
        ChallengeRequest {
            callback: callback.to_string(),
            mode: Mode::Subscribe,
            topic: "news & weather".to_string(),
            challenge: "abc123".to_string(),
        }
    }

    #[test]
    fn test_challenge_url_params() {
        let url = challenge_for("http://sub1/cb").url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("hub.mode".to_string(), "subscribe".to_string()),
                ("hub.topic".to_string(), "news & weather".to_string()),
                ("hub.challenge".to_string(), "abc123".to_string()),
            ]
        );
    }

    #[test]
    fn test_challenge_url_keeps_existing_query() {
        let url = challenge_for("https://sub1/cb?token=xyz").url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("token".to_string(), "xyz".to_string()));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_challenge_url_invalid_callback() {
        assert!(matches!(
            challenge_for("not a url").url(),
            Err(TransportError::InvalidRequest(_))
        ));
    }
}
