//! Signed fan-out of published content.
//!
//! Each publish takes a registry snapshot, then spawns one task per
//! subscriber. Tasks share one payload buffer and a semaphore owned by that
//! publish, so a slow callback only ever holds a permit of its own topic's
//! fan-out and never one that another publish is waiting on.

use crate::domain::{
    sign, Content, DeliveryOutcome, DeliveryRecord, DistributionConfig, PublishReport, Subscriber,
    SubscriptionRegistry,
};
use crate::metrics::HubMetrics;
use crate::ports::outbound::{CallbackClient, DeliveryRequest, TransportError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

/// Delivers content to the subscribers of a topic.
pub struct DistributionEngine {
    registry: Arc<SubscriptionRegistry>,
    dispatch: Dispatch,
}

/// Everything a fan-out needs, detached from the engine so broadcast can
/// run one fan-out per topic as its own task.
#[derive(Clone)]
struct Dispatch {
    client: Arc<dyn CallbackClient>,
    metrics: Arc<HubMetrics>,
    config: Arc<DistributionConfig>,
}

impl DistributionEngine {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        client: Arc<dyn CallbackClient>,
        metrics: Arc<HubMetrics>,
        config: DistributionConfig,
    ) -> Self {
        Self {
            registry,
            dispatch: Dispatch {
                client,
                metrics,
                config: Arc::new(config),
            },
        }
    }

    /// Deliver `content` to every subscriber of `topic` at the time of the call.
    ///
    /// Subscriptions added or removed while deliveries are in flight do not
    /// affect this publish. Returns once every attempt has an outcome.
    pub async fn publish(&self, topic: &str, content: Content) -> PublishReport {
        let subscribers = self.registry.snapshot(topic);
        self.dispatch
            .clone()
            .fan_out(topic.to_string(), subscribers, content)
            .await
    }

    /// Deliver `content` to every subscriber of every topic.
    ///
    /// A callback subscribed to several topics receives one POST per topic.
    /// Topics fan out concurrently; reports come back sorted by topic.
    pub async fn broadcast(&self, content: Content) -> Vec<PublishReport> {
        let snapshot = self.registry.snapshot_all();
        info!(topics = snapshot.len(), "Broadcasting to all topics");

        let mut fan_outs = JoinSet::new();
        for (topic, subscribers) in snapshot {
            let dispatch = self.dispatch.clone();
            fan_outs.spawn(
                dispatch
                    .fan_out(topic, subscribers, content.clone())
                    .in_current_span(),
            );
        }

        let mut reports = Vec::with_capacity(fan_outs.len());
        while let Some(joined) = fan_outs.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "Broadcast fan-out aborted"),
            }
        }
        reports.sort_by(|a, b| a.topic.cmp(&b.topic));
        reports
    }
}

impl Dispatch {
    async fn fan_out(
        self,
        topic: String,
        subscribers: Vec<Subscriber>,
        content: Content,
    ) -> PublishReport {
        let span = info_span!("publish", topic = %topic, subscribers = subscribers.len());
        async move {
            self.metrics.record_publish(subscribers.len());
            if subscribers.is_empty() {
                debug!("No subscribers, nothing to deliver");
                return PublishReport::empty(&topic);
            }

            let count = subscribers.len();
            let permits = Arc::new(Semaphore::new(self.config.max_concurrent_deliveries));
            let mut tasks = JoinSet::new();
            for subscriber in subscribers {
                let request = DeliveryRequest {
                    signature: sign(&content.payload, &subscriber.secret),
                    callback: subscriber.callback,
                    payload: content.payload.clone(),
                    content_type: content.content_type.clone(),
                    signature_header: self.config.signature_header.clone(),
                };
                tasks.spawn(
                    deliver_one(
                        Arc::clone(&self.client),
                        Arc::clone(&permits),
                        self.config.timeout,
                        request,
                    )
                    .in_current_span(),
                );
            }

            let mut deliveries = Vec::with_capacity(count);
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(record) => {
                        self.metrics.record_delivery(&record.outcome, content.len());
                        deliveries.push(record);
                    }
                    // deliver_one does not panic; a join error means the runtime is shutting down
                    Err(e) => warn!(error = %e, "Delivery task aborted"),
                }
            }
            deliveries.sort_by(|a, b| a.callback.cmp(&b.callback));

            let report = PublishReport { topic, deliveries };
            info!(
                attempted = report.attempted(),
                delivered = report.delivered(),
                failed = report.failed(),
                "Publish complete"
            );
            report
        }
        .instrument(span)
        .await
    }
}

async fn deliver_one(
    client: Arc<dyn CallbackClient>,
    permits: Arc<Semaphore>,
    limit: std::time::Duration,
    request: DeliveryRequest,
) -> DeliveryRecord {
    let outcome = match permits.acquire_owned().await {
        Ok(_permit) => match timeout(limit, client.deliver(&request)).await {
            Ok(Ok(status)) => DeliveryOutcome::from_status(status),
            Ok(Err(TransportError::Timeout)) | Err(_) => DeliveryOutcome::TimedOut,
            Ok(Err(err)) => DeliveryOutcome::Failed {
                reason: err.to_string(),
            },
        },
        Err(_) => DeliveryOutcome::Failed {
            reason: "delivery pool closed".to_string(),
        },
    };

    match &outcome {
        DeliveryOutcome::Delivered { status } => {
            debug!(callback = %request.callback, status, "Delivered")
        }
        other => warn!(callback = %request.callback, outcome = ?other, "Delivery failed"),
    }

    DeliveryRecord {
        callback: request.callback,
        outcome,
    }
}
