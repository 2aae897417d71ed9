//! Hub configuration with validation.

use super::delivery::DEFAULT_CONTENT_TYPE;
use super::signature::SIGNATURE_HEADER;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main hub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Inbound HTTP server
    pub http: HttpConfig,
    /// Intent verification (challenge round-trip)
    pub verification: VerificationConfig,
    /// Content fan-out
    pub distribution: DistributionConfig,
    /// Inbound request size limits
    pub limits: LimitsConfig,
}

impl HubConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verification.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "verification timeout cannot be 0".into(),
            ));
        }
        if self.verification.max_response_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_response_bytes cannot be 0".into(),
            ));
        }

        if self.distribution.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "delivery timeout cannot be 0".into(),
            ));
        }
        if self.distribution.max_concurrent_deliveries == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_concurrent_deliveries cannot be 0".into(),
            ));
        }
        if axum::http::HeaderName::from_bytes(self.distribution.signature_header.as_bytes())
            .is_err()
        {
            return Err(ConfigError::InvalidHeader(
                self.distribution.signature_header.clone(),
            ));
        }
        if self.distribution.default_content_type.is_empty() {
            return Err(ConfigError::Invalid(
                "default_content_type cannot be empty".into(),
            ));
        }

        if self.limits.max_payload_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_payload_bytes cannot be 0".into(),
            ));
        }
        if self.limits.max_form_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_form_bytes cannot be 0".into()));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
        }
    }
}

/// Intent verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Upper bound for the whole challenge round-trip
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Bytes of the callback's answer that are read before giving up
    pub max_response_bytes: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_response_bytes: 4096,
        }
    }
}

/// Fan-out configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Upper bound for one delivery
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// In-flight deliveries within one publish
    pub max_concurrent_deliveries: usize,
    /// Header carrying `sha256=<hex>`
    pub signature_header: String,
    /// Media type used when the publisher declares none
    pub default_content_type: String,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrent_deliveries: 64,
            signature_header: SIGNATURE_HEADER.to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// Inbound request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max publish body size in bytes (default: 1MB)
    pub max_payload_bytes: usize,
    /// Max intent form size in bytes (default: 64KB)
    pub max_form_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024, // 1MB
            max_form_bytes: 64 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Signature header is not a valid HTTP header name
    #[error("invalid signature header name: {0:?}")]
    InvalidHeader(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" must be checked before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
