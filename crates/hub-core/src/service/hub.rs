//! Hub service: owns the registry and wires the handshake and fan-out to it.

use super::{DistributionEngine, VerificationHandshake};
use crate::domain::{
    ConfigError, Content, HubConfig, HubResult, Intent, PublishReport, Subscription,
    SubscriptionRegistry, TopicSummary,
};
use crate::metrics::HubMetrics;
use crate::ports::inbound::HubApi;
use crate::ports::outbound::CallbackClient;
use async_trait::async_trait;
use std::sync::Arc;

/// The hub. One registry, shared by verification and distribution.
pub struct HubService {
    registry: Arc<SubscriptionRegistry>,
    metrics: Arc<HubMetrics>,
    verification: VerificationHandshake,
    distribution: DistributionEngine,
}

impl HubService {
    /// Build a hub on top of `client`. Fails if `config` is invalid.
    pub fn new(config: HubConfig, client: Arc<dyn CallbackClient>) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = Arc::new(SubscriptionRegistry::new());
        let metrics = Arc::new(HubMetrics::new());
        let verification = VerificationHandshake::new(
            Arc::clone(&registry),
            Arc::clone(&client),
            Arc::clone(&metrics),
            config.verification.clone(),
        );
        let distribution = DistributionEngine::new(
            Arc::clone(&registry),
            client,
            Arc::clone(&metrics),
            config.distribution.clone(),
        );

        Ok(Self {
            registry,
            metrics,
            verification,
            distribution,
        })
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<HubMetrics> {
        &self.metrics
    }
}

#[async_trait]
impl HubApi for HubService {
    async fn verify_intent(&self, intent: Intent) -> HubResult<Subscription> {
        self.verification.verify(intent).await
    }

    async fn publish(&self, topic: &str, content: Content) -> PublishReport {
        self.distribution.publish(topic, content).await
    }

    async fn broadcast(&self, content: Content) -> Vec<PublishReport> {
        self.distribution.broadcast(content).await
    }

    fn topics(&self) -> Vec<TopicSummary> {
        self.registry.topics()
    }

    fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.subscriber_count(topic)
    }

    fn metrics_snapshot(&self) -> serde_json::Value {
        let mut json = self.metrics.to_json();
        json["registry"] = serde_json::json!({
            "topics": self.registry.topic_count(),
            "subscriptions": self.registry.subscription_count(),
        });
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCallbackClient;
    use std::time::Duration;

    fn hub() -> (HubService, Arc<MockCallbackClient>) {
        let client = Arc::new(MockCallbackClient::new());
        let hub = HubService::new(
            HubConfig::default(),
            Arc::clone(&client) as Arc<dyn CallbackClient>,
        )
        .unwrap();
        (hub, client)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = HubConfig::default();
        config.distribution.timeout = Duration::ZERO;

        let result = HubService::new(config, Arc::new(MockCallbackClient::new()));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }

    #[tokio::test]
    async fn test_subscribe_then_publish() {
        let (hub, client) = hub();

        hub.verify_intent(Intent::subscribe("news", "http://sub1/cb", "s1"))
            .await
            .unwrap();
        let report = hub.publish("news", Content::json(r#"{"id":1}"#)).await;

        assert_eq!(report.delivered(), 1);
        assert_eq!(client.challenges().len(), 1);
        assert_eq!(client.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribed_callback_gets_nothing() {
        let (hub, client) = hub();
        hub.verify_intent(Intent::subscribe("news", "http://sub1/cb", "s1"))
            .await
            .unwrap();
        hub.verify_intent(Intent::unsubscribe("news", "http://sub1/cb"))
            .await
            .unwrap();

        let report = hub.publish("news", Content::json("{}")).await;

        assert_eq!(report.attempted(), 0);
        assert!(client.deliveries().is_empty());
        assert!(hub.topics().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_snapshot_includes_registry() {
        let (hub, _client) = hub();
        hub.verify_intent(Intent::subscribe("news", "http://sub1/cb", "s1"))
            .await
            .unwrap();
        hub.publish("news", Content::json("{}")).await;

        let json = hub.metrics_snapshot();
        assert_eq!(json["registry"]["topics"], 1);
        assert_eq!(json["registry"]["subscriptions"], 1);
        assert_eq!(json["verifications"]["succeeded"], 1);
        assert_eq!(json["deliveries"]["succeeded"], 1);
    }
}
