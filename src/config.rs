//! Client configuration.
//!
//! Everything a [`crate::Client`] needs to reach the service lives in
//! [`ClientConfig`], built via [`ClientConfigBuilder`]. Per-request options
//! (auth, trace id, webhooks) belong on the request builders instead.

use crate::error::{GotenbergError, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for a Gotenberg service.
///
/// # Example
/// ```rust
/// use gotenberg_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .hostname("http://localhost:3000")
///     .timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.hostname, "http://localhost:3000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:3000`. No trailing slash.
    pub hostname: String,

    /// Whole-request timeout in seconds, covering upload, conversion and
    /// download. Default: none.
    ///
    /// Conversions of large office documents can take minutes, so there is
    /// no default cap. Set one when a stuck service must not block forever.
    pub timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// `User-Agent` sent to the service. Default: `gotenberg-client/<version>`.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            timeout_secs: None,
            connect_timeout_secs: 10,
            user_agent: concat!("gotenberg-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default settings for `hostname`.
    pub fn new(hostname: impl Into<String>) -> Result<Self> {
        Self::builder().hostname(hostname).build()
    }

    /// Full URL of an endpoint path such as `/forms/pdfengines/merge`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.hostname, path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = hostname.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs.max(1));
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration, validating the hostname.
    pub fn build(mut self) -> Result<ClientConfig> {
        let trimmed = self.config.hostname.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(GotenbergError::EmptyHostname);
        }

        let url = reqwest::Url::parse(&trimmed).map_err(|e| GotenbergError::InvalidHostname {
            hostname: trimmed.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GotenbergError::InvalidHostname {
                hostname: trimmed,
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(GotenbergError::InvalidHostname {
                hostname: trimmed,
                reason: "query strings and fragments are not allowed".into(),
            });
        }

        self.config.hostname = trimmed;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::new("http://localhost:3000").unwrap();
        assert_eq!(c.timeout_secs, None);
        assert_eq!(c.connect_timeout_secs, 10);
        assert!(c.user_agent.starts_with("gotenberg-client/"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = ClientConfig::new("http://gotenberg:3000/").unwrap();
        assert_eq!(c.hostname, "http://gotenberg:3000");
        assert_eq!(
            c.endpoint_url("/forms/pdfengines/merge"),
            "http://gotenberg:3000/forms/pdfengines/merge"
        );
    }

    #[test]
    fn path_prefix_is_kept() {
        let c = ClientConfig::new("https://proxy.example.com/gotenberg").unwrap();
        assert_eq!(
            c.endpoint_url("/forms/libreoffice/convert"),
            "https://proxy.example.com/gotenberg/forms/libreoffice/convert"
        );
    }

    #[test]
    fn empty_hostname_is_rejected() {
        assert!(matches!(ClientConfig::new(""), Err(GotenbergError::EmptyHostname)));
        assert!(matches!(ClientConfig::new("  / "), Err(GotenbergError::EmptyHostname)));
    }

    #[test]
    fn non_http_hostname_is_rejected() {
        let err = ClientConfig::new("ftp://files.example.com").unwrap_err();
        assert!(matches!(err, GotenbergError::InvalidHostname { .. }), "got: {err:?}");
        let err = ClientConfig::new("localhost:3000 with spaces").unwrap_err();
        assert!(matches!(err, GotenbergError::InvalidHostname { .. }), "got: {err:?}");
    }

    #[test]
    fn timeouts_are_at_least_one_second() {
        let c = ClientConfig::builder()
            .hostname("http://localhost:3000")
            .timeout_secs(0)
            .connect_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.timeout_secs, Some(1));
        assert_eq!(c.connect_timeout_secs, 1);
    }
}
