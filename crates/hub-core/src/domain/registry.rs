//! Subscriber registry.
//!
//! `topic -> (callback -> secret)` behind a single `RwLock`. Every critical
//! section is a pure map operation; callers copy data out with
//! [`SubscriptionRegistry::snapshot`] and do network I/O after the guard is
//! dropped.

use super::subscription::{Subscriber, Subscription};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

type TopicMap = HashMap<String, HashMap<String, String>>;

/// Topic summary for the admin listing. Never carries callbacks or secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub subscribers: usize,
}

/// Volatile, in-memory store of verified subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    topics: RwLock<TopicMap>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the secret for `(topic, callback)`.
    ///
    /// Returns the previous secret when the pair was already subscribed.
    /// Callers reject empty topics and callbacks before calling.
    pub fn add(&self, topic: &str, callback: &str, secret: &str) -> Option<String> {
        debug_assert!(!topic.is_empty() && !callback.is_empty());
        self.topics
            .write()
            .entry(topic.to_string())
            .or_default()
            .insert(callback.to_string(), secret.to_string())
    }

    /// Remove `(topic, callback)`. Absent pairs are a no-op.
    ///
    /// The topic key is pruned with its last callback.
    pub fn remove(&self, topic: &str, callback: &str) -> bool {
        let mut topics = self.topics.write();
        let Some(callbacks) = topics.get_mut(topic) else {
            return false;
        };
        let removed = callbacks.remove(callback).is_some();
        if callbacks.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Independent copy of the subscribers of `topic`, empty if unknown.
    pub fn snapshot(&self, topic: &str) -> Vec<Subscriber> {
        self.topics
            .read()
            .get(topic)
            .map(|callbacks| {
                callbacks
                    .iter()
                    .map(|(callback, secret)| Subscriber::new(callback.as_str(), secret.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One consistent copy of every topic's subscribers.
    pub fn snapshot_all(&self) -> Vec<(String, Vec<Subscriber>)> {
        self.topics
            .read()
            .iter()
            .map(|(topic, callbacks)| {
                let subscribers = callbacks
                    .iter()
                    .map(|(callback, secret)| Subscriber::new(callback.as_str(), secret.as_str()))
                    .collect();
                (topic.clone(), subscribers)
            })
            .collect()
    }

    /// Look up a single subscription.
    pub fn get(&self, topic: &str, callback: &str) -> Option<Subscription> {
        self.topics
            .read()
            .get(topic)
            .and_then(|callbacks| callbacks.get(callback))
            .map(|secret| Subscription {
                topic: topic.to_string(),
                callback: callback.to_string(),
                secret: secret.clone(),
            })
    }

    pub fn contains(&self, topic: &str, callback: &str) -> bool {
        self.topics
            .read()
            .get(topic)
            .is_some_and(|callbacks| callbacks.contains_key(callback))
    }

    /// Topics with at least one subscriber, sorted by name.
    pub fn topics(&self) -> Vec<TopicSummary> {
        let mut summaries: Vec<TopicSummary> = self
            .topics
            .read()
            .iter()
            .map(|(topic, callbacks)| TopicSummary {
                topic: topic.clone(),
                subscribers: callbacks.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.topic.cmp(&b.topic));
        summaries
    }

    /// Number of subscribers of `topic`, zero if unknown.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.read().get(topic).map_or(0, HashMap::len)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    /// Total number of (topic, callback) pairs.
    pub fn subscription_count(&self) -> usize {
        self.topics.read().values().map(HashMap::len).sum()
    }
}
