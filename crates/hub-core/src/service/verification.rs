//! Intent verification handshake.
//!
//! ```text
//! intent ──→ [fresh Challenge] ──GET callback?hub.*──→ subscriber
//!                                                        │
//!        ←── 2xx + body == challenge ────────────────────┘
//!                     │
//!                     ↓
//!          registry.add / registry.remove
//! ```
//!
//! The registry is only touched after the round-trip has completed.

use crate::domain::{
    Challenge, HubError, HubResult, Intent, Mode, Subscription, SubscriptionRegistry,
    VerificationConfig,
};
use crate::metrics::HubMetrics;
use crate::ports::outbound::{CallbackClient, ChallengeRequest, TransportError};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};

/// Runs the challenge/response exchange and commits on success.
pub struct VerificationHandshake {
    registry: Arc<SubscriptionRegistry>,
    client: Arc<dyn CallbackClient>,
    metrics: Arc<HubMetrics>,
    config: VerificationConfig,
}

impl VerificationHandshake {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        client: Arc<dyn CallbackClient>,
        metrics: Arc<HubMetrics>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            registry,
            client,
            metrics,
            config,
        }
    }

    /// Verify `intent` with its callback, then add or remove the subscription.
    ///
    /// Failures leave the registry untouched and are never retried.
    pub async fn verify(&self, intent: Intent) -> HubResult<Subscription> {
        let span = info_span!(
            "verify_intent",
            mode = %intent.mode,
            topic = %intent.topic,
            callback = %intent.callback,
        );

        async move {
            match self.challenge(&intent).await {
                Ok(()) => Ok(self.commit(intent)),
                Err(err) => {
                    self.metrics.record_verification_failure();
                    warn!(error = %err, "Intent verification failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// One challenge round-trip. No lock is held here.
    async fn challenge(&self, intent: &Intent) -> HubResult<()> {
        let challenge = Challenge::generate();
        let request = ChallengeRequest {
            callback: intent.callback.clone(),
            mode: intent.mode,
            topic: intent.topic.clone(),
            challenge: challenge.as_str().to_string(),
        };

        let response = match timeout(self.config.timeout, self.client.send_challenge(&request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::Timeout)) | Err(_) => {
                return Err(HubError::VerificationTimeout(self.config.timeout))
            }
            Ok(Err(TransportError::InvalidRequest(reason))) => {
                return Err(HubError::InvalidCallback(reason))
            }
            Ok(Err(err)) => return Err(HubError::CallbackUnreachable(err.to_string())),
        };

        if !(200..300).contains(&response.status) {
            return Err(HubError::IntentNotConfirmed {
                status: response.status,
            });
        }

        // A body longer than the read limit cannot be the challenge.
        if response.body.len() > self.config.max_response_bytes
            || !challenge.matches(&response.body)
        {
            return Err(HubError::ChallengeMismatch);
        }

        Ok(())
    }

    fn commit(&self, intent: Intent) -> Subscription {
        match intent.mode {
            Mode::Subscribe => {
                let replaced = self
                    .registry
                    .add(&intent.topic, &intent.callback, &intent.secret)
                    .is_some();
                info!(replaced, "Subscription verified");
            }
            Mode::Unsubscribe => {
                let removed = self.registry.remove(&intent.topic, &intent.callback);
                info!(removed, "Unsubscription verified");
            }
        }
        self.metrics
            .record_verification_success(intent.mode == Mode::Subscribe);

        Subscription {
            topic: intent.topic,
            callback: intent.callback,
            secret: intent.secret,
        }
    }
}
