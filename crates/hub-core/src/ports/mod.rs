//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: [`HubApi`], consumed by the HTTP boundary
//! - **Driven Ports (Outbound)**: [`CallbackClient`], implemented by adapters

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
