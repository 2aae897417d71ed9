//! Centralized Testing Utilities
//!
//! Mock [`CallbackClient`] that records every outbound request and answers
//! according to per-callback scripted behavior. Available in unit tests and
//! with the `test-utils` feature flag.

use crate::ports::outbound::{
    CallbackClient, ChallengeRequest, ChallengeResponse, DeliveryRequest, TransportError,
};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// How a mocked callback answers the challenge GET.
#[derive(Debug, Clone)]
pub enum ChallengeBehavior {
    /// 200 with the challenge echoed back (a well-behaved subscriber)
    Echo,
    /// Echo the challenge with a different status
    EchoWithStatus(u16),
    /// Fixed status and body
    Respond { status: u16, body: Bytes },
    /// Transport failure
    Fail(TransportError),
    /// Never answer
    Hang,
}

/// How a mocked callback answers a content POST.
#[derive(Debug, Clone)]
pub enum DeliveryBehavior {
    Status(u16),
    /// Answer with `status` after sleeping (tokio time)
    Delay(Duration, u16),
    Fail(TransportError),
    Hang,
}

/// Recording, scriptable callback client.
///
/// Unscripted callbacks echo challenges and accept deliveries with 200.
#[derive(Debug, Default)]
pub struct MockCallbackClient {
    challenge_behaviors: Mutex<HashMap<String, ChallengeBehavior>>,
    delivery_behaviors: Mutex<HashMap<String, DeliveryBehavior>>,
    challenges: Mutex<Vec<ChallengeRequest>>,
    deliveries: Mutex<Vec<DeliveryRequest>>,
}

impl MockCallbackClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_challenge(&self, callback: &str, behavior: ChallengeBehavior) {
        self.challenge_behaviors
            .lock()
            .insert(callback.to_string(), behavior);
    }

    pub fn on_delivery(&self, callback: &str, behavior: DeliveryBehavior) {
        self.delivery_behaviors
            .lock()
            .insert(callback.to_string(), behavior);
    }

    /// Every challenge request seen, in order.
    pub fn challenges(&self) -> Vec<ChallengeRequest> {
        self.challenges.lock().clone()
    }

    /// Every delivery request seen, in arrival order.
    pub fn deliveries(&self) -> Vec<DeliveryRequest> {
        self.deliveries.lock().clone()
    }

    pub fn deliveries_to(&self, callback: &str) -> Vec<DeliveryRequest> {
        self.deliveries
            .lock()
            .iter()
            .filter(|d| d.callback == callback)
            .cloned()
            .collect()
    }

    /// Total outbound requests of either kind.
    pub fn request_count(&self) -> usize {
        self.challenges.lock().len() + self.deliveries.lock().len()
    }
}

#[async_trait]
impl CallbackClient for MockCallbackClient {
    async fn send_challenge(
        &self,
        request: &ChallengeRequest,
    ) -> Result<ChallengeResponse, TransportError> {
        self.challenges.lock().push(request.clone());
        let behavior = self
            .challenge_behaviors
            .lock()
            .get(&request.callback)
            .cloned()
            .unwrap_or(ChallengeBehavior::Echo);

        match behavior {
            ChallengeBehavior::Echo => Ok(ChallengeResponse {
                status: 200,
                body: Bytes::from(request.challenge.clone()),
            }),
            ChallengeBehavior::EchoWithStatus(status) => Ok(ChallengeResponse {
                status,
                body: Bytes::from(request.challenge.clone()),
            }),
            ChallengeBehavior::Respond { status, body } => Ok(ChallengeResponse { status, body }),
            ChallengeBehavior::Fail(err) => Err(err),
            ChallengeBehavior::Hang => std::future::pending().await,
        }
    }

    async fn deliver(&self, request: &DeliveryRequest) -> Result<u16, TransportError> {
        self.deliveries.lock().push(request.clone());
        let behavior = self
            .delivery_behaviors
            .lock()
            .get(&request.callback)
            .cloned()
            .unwrap_or(DeliveryBehavior::Status(200));

        match behavior {
            DeliveryBehavior::Status(status) => Ok(status),
            DeliveryBehavior::Delay(delay, status) => {
                tokio::time::sleep(delay).await;
                Ok(status)
            }
            DeliveryBehavior::Fail(err) => Err(err),
            DeliveryBehavior::Hang => std::future::pending().await,
        }
    }
}
