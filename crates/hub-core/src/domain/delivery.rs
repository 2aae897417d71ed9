//! Published content and per-subscriber delivery results.

use bytes::Bytes;
use serde::Serialize;

/// Media type used when a publisher does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// A payload ready for fan-out.
///
/// The payload is reference counted, so every delivery task shares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub payload: Bytes,
    pub content_type: String,
}

impl Content {
    pub fn new(payload: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
        }
    }

    /// `application/json` content.
    pub fn json(payload: impl Into<Bytes>) -> Self {
        Self::new(payload, DEFAULT_CONTENT_TYPE)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Subscriber answered 2xx
    Delivered { status: u16 },
    /// Subscriber answered with a non-2xx status
    Rejected { status: u16 },
    /// Connection or protocol failure
    Failed { reason: String },
    /// No answer within the delivery timeout
    TimedOut,
}

impl DeliveryOutcome {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            DeliveryOutcome::Delivered { status }
        } else {
            DeliveryOutcome::Rejected { status }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Outcome of one delivery, tagged with its callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRecord {
    pub callback: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

/// Summary of a publish to one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub topic: String,
    pub deliveries: Vec<DeliveryRecord>,
}

impl PublishReport {
    pub fn empty(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            deliveries: Vec::new(),
        }
    }

    /// Number of subscribers in the snapshot that was published to.
    pub fn attempted(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|record| record.outcome.is_delivered())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }

    /// Outcome for a given callback, if it was part of the snapshot.
    pub fn outcome_for(&self, callback: &str) -> Option<&DeliveryOutcome> {
        self.deliveries
            .iter()
            .find(|record| record.callback == callback)
            .map(|record| &record.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_status() {
        assert!(DeliveryOutcome::from_status(200).is_delivered());
        assert!(DeliveryOutcome::from_status(204).is_delivered());
        assert_eq!(
            DeliveryOutcome::from_status(500),
            DeliveryOutcome::Rejected { status: 500 }
        );
        assert_eq!(
            DeliveryOutcome::from_status(301),
            DeliveryOutcome::Rejected { status: 301 }
        );
    }

    #[test]
    fn test_report_counts() {
        let report = PublishReport {
            topic: "news".into(),
            deliveries: vec![
                DeliveryRecord {
                    callback: "http://a/cb".into(),
                    outcome: DeliveryOutcome::Delivered { status: 200 },
                },
                DeliveryRecord {
                    callback: "http://b/cb".into(),
                    outcome: DeliveryOutcome::TimedOut,
                },
            ],
        };
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcome_for("http://b/cb"), Some(&DeliveryOutcome::TimedOut));
        assert_eq!(report.outcome_for("http://c/cb"), None);
    }

    #[test]
    fn test_record_serialization() {
        let record = DeliveryRecord {
            callback: "http://a/cb".into(),
            outcome: DeliveryOutcome::Rejected { status: 503 },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["callback"], "http://a/cb");
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["status"], 503);
    }

    #[test]
    fn test_json_content() {
        let content = Content::json(&b"{\"id\":1}"[..]);
        assert_eq!(content.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(content.len(), 8);
    }
}
