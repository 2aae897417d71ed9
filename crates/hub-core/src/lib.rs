//! Callback Hub - verified subscriptions and signed content fan-out.
//!
//! Subscribers register a callback URL for a topic. The hub proves the
//! callback wants the subscription with a random challenge, then POSTs every
//! piece of content published to that topic to the callback, authenticated
//! with `X-Hub-Signature: sha256=<hex>`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        HTTP boundary (axum)                      │
//! │   GET|POST /      POST /publish     POST /publish/all    admin   │
//! └──────┬─────────────────┬──────────────────┬──────────────────────┘
//!        │                 │                  │
//! ┌──────┴──────┐   ┌──────┴──────────────────┴───┐
//! │ Verification│   │     DistributionEngine      │
//! │  Handshake  │   │ snapshot → sign → JoinSet   │
//! └──────┬──────┘   └──────┬──────────────────────┘
//!        │  add/remove     │  snapshot
//!        └──────┬──────────┘
//!        ┌──────┴───────────────┐         ┌──────────────────────┐
//!        │ SubscriptionRegistry │         │ CallbackClient port  │
//!        │   (RwLock, no I/O)   │         │   (reqwest adapter)  │
//!        └──────────────────────┘         └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hub_core::{build_router, HubConfig, HubService, ReqwestCallbackClient};
//!
//! let config = HubConfig::default();
//! let client = Arc::new(ReqwestCallbackClient::new(&config)?);
//! let hub = Arc::new(HubService::new(config.clone(), client)?);
//! let router = build_router(hub, &config);
//! axum::serve(listener, router).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod http;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use adapters::ReqwestCallbackClient;
pub use domain::{
    sign, verify_signature, Challenge, ConfigError, Content, DeliveryOutcome, DeliveryRecord,
    HubConfig, HubError, HubResult, Intent, Mode, PublishReport, Subscriber, Subscription,
    SubscriptionRegistry, TopicSummary, SIGNATURE_HEADER,
};
pub use http::build_router;
pub use metrics::HubMetrics;
pub use ports::{CallbackClient, HubApi, TransportError};
pub use service::{DistributionEngine, HubService, VerificationHandshake};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
