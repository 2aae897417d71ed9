//! Subscription value types and intent parsing.

use super::error::{HubError, HubResult};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Requested subscription mode (`hub.mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Subscribe,
    Unsubscribe,
}

impl Mode {
    /// Wire value sent back to the callback in `hub.mode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Subscribe => "subscribe",
            Mode::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribe" => Ok(Mode::Subscribe),
            "unsubscribe" => Ok(Mode::Unsubscribe),
            "" => Err(HubError::missing("hub.mode")),
            other => Err(HubError::UnknownMode(other.to_string())),
        }
    }
}

/// One entry of a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscriber {
    pub callback: String,
    pub secret: String,
}

impl Subscriber {
    pub fn new(callback: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            callback: callback.into(),
            secret: secret.into(),
        }
    }
}

/// A verified (topic, callback) pair with its shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub topic: String,
    pub callback: String,
    pub secret: String,
}

/// A validated subscribe/unsubscribe request.
///
/// Construction guarantees a known mode, a non-empty topic and an absolute
/// http(s) callback, so the registry never sees malformed keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub mode: Mode,
    pub topic: String,
    pub callback: String,
    /// Only meaningful for [`Mode::Subscribe`]
    pub secret: String,
}

impl Intent {
    /// Validate raw form values. Absent and empty values are treated alike.
    pub fn parse(
        mode: Option<&str>,
        topic: Option<&str>,
        callback: Option<&str>,
        secret: Option<&str>,
    ) -> HubResult<Self> {
        let mode: Mode = mode.unwrap_or_default().parse()?;

        let topic = topic.unwrap_or_default();
        if topic.is_empty() {
            return Err(HubError::missing("hub.topic"));
        }

        let callback = callback.unwrap_or_default();
        if callback.is_empty() {
            return Err(HubError::missing("hub.callback"));
        }
        validate_callback(callback)?;

        let secret = match mode {
            Mode::Subscribe => secret.unwrap_or_default().to_string(),
            Mode::Unsubscribe => String::new(),
        };

        Ok(Self {
            mode,
            topic: topic.to_string(),
            callback: callback.to_string(),
            secret,
        })
    }

    pub fn subscribe(
        topic: impl Into<String>,
        callback: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            mode: Mode::Subscribe,
            topic: topic.into(),
            callback: callback.into(),
            secret: secret.into(),
        }
    }

    pub fn unsubscribe(topic: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            mode: Mode::Unsubscribe,
            topic: topic.into(),
            callback: callback.into(),
            secret: String::new(),
        }
    }
}

/// Callbacks must be absolute http or https URLs with a host.
pub fn validate_callback(callback: &str) -> HubResult<Url> {
    let url = Url::parse(callback).map_err(|e| HubError::InvalidCallback(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(HubError::InvalidCallback(format!(
                "unsupported scheme {}",
                other
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(HubError::InvalidCallback("missing host".into()));
    }
    Ok(url)
}
