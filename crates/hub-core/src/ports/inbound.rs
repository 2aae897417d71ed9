//! # Inbound Ports (Driving Ports)
//!
//! The API the HTTP boundary drives. Implemented by
//! [`HubService`](crate::service::HubService).

use crate::domain::{Content, HubResult, Intent, PublishReport, Subscription, TopicSummary};
use async_trait::async_trait;

/// Primary API of the hub.
#[async_trait]
pub trait HubApi: Send + Sync {
    /// Run the verification handshake for `intent` and commit on success.
    ///
    /// ## Returns
    ///
    /// - `Ok(Subscription)`: the (topic, callback) pair that was added or removed
    /// - `Err(HubError)`: nothing was committed
    async fn verify_intent(&self, intent: Intent) -> HubResult<Subscription>;

    /// Deliver `content` to every current subscriber of `topic`.
    ///
    /// Never fails; per-subscriber outcomes are in the report.
    async fn publish(&self, topic: &str, content: Content) -> PublishReport;

    /// Deliver `content` to every subscriber of every topic.
    async fn broadcast(&self, content: Content) -> Vec<PublishReport>;

    /// Topics with their subscriber counts.
    fn topics(&self) -> Vec<TopicSummary>;

    /// Current subscriber count of one topic.
    fn subscriber_count(&self, topic: &str) -> usize;

    /// Counter snapshot for the admin endpoint.
    fn metrics_snapshot(&self) -> serde_json::Value;
}
