//! # Adapters Layer
//!
//! Implementations of the outbound ports.
//!
//! - [`ReqwestCallbackClient`]: [`CallbackClient`](crate::ports::CallbackClient)
//!   over HTTP using `reqwest`

pub mod http_client;

pub use http_client::ReqwestCallbackClient;
