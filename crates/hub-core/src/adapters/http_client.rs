//! `reqwest` implementation of the callback client.

use crate::domain::HubConfig;
use crate::ports::outbound::{
    CallbackClient, ChallengeRequest, ChallengeResponse, DeliveryRequest, TransportError,
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use tracing::trace;

/// HTTP client for challenge GETs and content POSTs.
///
/// Redirects are not followed: a callback that redirects has not confirmed
/// anything.
#[derive(Debug, Clone)]
pub struct ReqwestCallbackClient {
    client: Client,
    max_response_bytes: usize,
}

impl ReqwestCallbackClient {
    /// Build a client whose request timeout is the larger of the verification
    /// and delivery timeouts. The services apply the exact bound per call.
    pub fn new(config: &HubConfig) -> Result<Self, TransportError> {
        let timeout: Duration = config
            .verification
            .timeout
            .max(config.distribution.timeout);

        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(concat!("hub-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            max_response_bytes: config.verification.max_response_bytes,
        })
    }

    /// Read at most `max_response_bytes` of the body, then stop.
    async fn read_capped(&self, mut response: Response) -> Result<Bytes, TransportError> {
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            let room = self.max_response_bytes + 1 - body.len();
            if chunk.len() >= room {
                // One byte past the limit marks the body as oversized
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait]
impl CallbackClient for ReqwestCallbackClient {
    async fn send_challenge(
        &self,
        request: &ChallengeRequest,
    ) -> Result<ChallengeResponse, TransportError> {
        let url = request.url()?;
        trace!(%url, "Sending challenge");

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = self.read_capped(response).await?;

        Ok(ChallengeResponse { status, body })
    }

    async fn deliver(&self, request: &DeliveryRequest) -> Result<u16, TransportError> {
        let header = HeaderName::from_bytes(request.signature_header.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let signature = HeaderValue::from_str(&request.signature)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let content_type = HeaderValue::from_str(&request.content_type)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        // Content-Length is derived from the body
        let response = self
            .client
            .post(&request.callback)
            .header(CONTENT_TYPE, content_type)
            .header(header, signature)
            .body(request.payload.clone())
            .send()
            .await
            .map_err(classify)?;

        Ok(response.status().as_u16())
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}
