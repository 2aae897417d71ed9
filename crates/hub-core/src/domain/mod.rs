//! Domain types for the hub.
//!
//! Pure logic with no network I/O: the subscriber registry, intent parsing,
//! challenge tokens, delivery signatures, configuration and errors.

pub mod challenge;
pub mod config;
pub mod delivery;
pub mod error;
pub mod registry;
pub mod signature;
pub mod subscription;

// Re-exports for convenience
pub use challenge::Challenge;
pub use config::{
    ConfigError, DistributionConfig, HttpConfig, HubConfig, LimitsConfig, VerificationConfig,
};
pub use delivery::{Content, DeliveryOutcome, DeliveryRecord, PublishReport, DEFAULT_CONTENT_TYPE};
pub use error::{HubError, HubResult};
pub use registry::{SubscriptionRegistry, TopicSummary};
pub use signature::{sign, verify_signature, SIGNATURE_ALGORITHM, SIGNATURE_HEADER};
pub use subscription::{validate_callback, Intent, Mode, Subscriber, Subscription};
