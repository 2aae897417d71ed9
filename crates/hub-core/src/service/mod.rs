//! Application services.
//!
//! [`VerificationHandshake`] and [`DistributionEngine`] share one
//! [`SubscriptionRegistry`](crate::domain::SubscriptionRegistry) through
//! [`HubService`].

pub mod distribution;
pub mod hub;
pub mod verification;

pub use distribution::DistributionEngine;
pub use hub::HubService;
pub use verification::VerificationHandshake;
