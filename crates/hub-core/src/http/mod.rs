//! HTTP boundary.
//!
//! | Route            | Method    | Purpose                               |
//! |------------------|-----------|---------------------------------------|
//! | `/`              | GET, POST | subscribe / unsubscribe intent        |
//! | `/publish`       | POST      | publish to `hub.topic`                |
//! | `/publish/all`   | POST      | publish to every topic                |
//! | `/health`        | GET       | liveness                              |
//! | `/metrics`       | GET       | counters                              |
//! | `/topics`        | GET       | topics with subscriber counts         |

pub mod error;
pub mod handlers;
pub mod router;

pub use router::build_router;

use crate::ports::inbound::HubApi;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<dyn HubApi>,
    /// Media type for publish requests without a `Content-Type`
    pub default_content_type: String,
}
