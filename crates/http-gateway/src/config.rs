use std::fmt::Debug;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for [`GatewayConfig`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct GatewayConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    default_headers: Vec<(String, String)>,
}

impl GatewayConfigBuilder {
    /// Creates a builder with every option left to its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the overall timeout applied to every request.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every request.
    #[inline]
    pub fn with_default_header<K: Into<String>, V: Into<String>>(
        mut self,
        name: K,
        value: V,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> GatewayConfig {
        GatewayConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            default_headers: self.default_headers,
        }
    }
}

impl Debug for GatewayConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfigBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_headers", &redacted(&self.default_headers))
            .finish()
    }
}

/// Configuration for [`HttpGateway`](crate::HttpGateway).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GatewayConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) default_headers: Vec<(String, String)>,
}

impl GatewayConfig {
    /// Returns the base URL requests are sent to.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the overall request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for GatewayConfig {
    #[inline]
    fn default() -> Self {
        GatewayConfigBuilder::new().build()
    }
}

impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_headers", &redacted(&self.default_headers))
            .finish()
    }
}

fn redacted(headers: &[(String, String)]) -> Vec<(&str, &str)> {
    headers
        .iter()
        .map(|(name, _)| (name.as_str(), "<redacted>"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.default_headers.is_empty());
    }

    #[test]
    fn test_debug_hides_header_values() {
        let config = GatewayConfigBuilder::new()
            .with_default_header("x-api-key", "secret")
            .build();
        let debug = format!("{config:?}");
        assert!(debug.contains("x-api-key"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }
}
