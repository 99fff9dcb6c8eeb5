//! Resolver configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use web3_probe_error::{Result, Web3Error};

/// Logged when no provider can be found.
pub const DEFAULT_INSTALL_HINT: &str =
    "Non-ethereum browser detected. You should consider using MetaMask!";

/// Configuration for [`ProviderResolver`](crate::ProviderResolver).
///
/// Deserializes from camelCase keys so a plain JavaScript object can be
/// passed straight through. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Ask an injected provider for account access during resolution
    pub request_accounts: bool,
    /// Fall back to `enable()` when `eth_requestAccounts` is unsupported
    pub legacy_enable_fallback: bool,
    /// Upper bound on the authorization prompt; unbounded when `None`
    pub authorization_timeout_ms: Option<u64>,
    /// Diagnostic emitted when no provider is found
    pub install_hint: String,
}

impl ResolverConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the authorization request
    pub fn with_request_accounts(mut self, enable: bool) -> Self {
        self.request_accounts = enable;
        self
    }

    /// Enables or disables the `enable()` fallback
    pub fn with_legacy_enable_fallback(mut self, enable: bool) -> Self {
        self.legacy_enable_fallback = enable;
        self
    }

    /// Bounds the authorization prompt, rounded up to whole milliseconds
    pub fn with_authorization_timeout(mut self, timeout: Duration) -> Self {
        let mut millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        if timeout > Duration::from_millis(millis) {
            millis = millis.saturating_add(1);
        }
        self.authorization_timeout_ms = Some(millis);
        self
    }

    /// Sets the install hint
    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }

    /// Returns the authorization timeout, if any
    pub fn authorization_timeout(&self) -> Option<Duration> {
        self.authorization_timeout_ms.map(Duration::from_millis)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.authorization_timeout_ms == Some(0) {
            return Err(Web3Error::InvalidConfig(
                "authorization timeout must be greater than zero".to_string(),
            ));
        }
        if self.install_hint.trim().is_empty() {
            return Err(Web3Error::InvalidConfig("install hint must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_accounts: true,
            legacy_enable_fallback: true,
            authorization_timeout_ms: None,
            install_hint: DEFAULT_INSTALL_HINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(config.request_accounts);
        assert!(config.legacy_enable_fallback);
        assert_eq!(config.authorization_timeout(), None);
        assert!(config.install_hint.contains("MetaMask"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::new()
            .with_request_accounts(false)
            .with_legacy_enable_fallback(false)
            .with_authorization_timeout(Duration::from_secs(30))
            .with_install_hint("Install a wallet");

        assert!(!config.request_accounts);
        assert!(!config.legacy_enable_fallback);
        assert_eq!(config.authorization_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.install_hint, "Install a wallet");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ResolverConfig::new().with_authorization_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sub_millisecond_timeout_rounds_up() {
        let config = ResolverConfig::new().with_authorization_timeout(Duration::from_micros(300));
        assert_eq!(config.authorization_timeout_ms, Some(1));
        assert!(config.validate().is_ok());

        let config = ResolverConfig::new().with_authorization_timeout(Duration::from_micros(1500));
        assert_eq!(config.authorization_timeout_ms, Some(2));

        let config = ResolverConfig::new().with_authorization_timeout(Duration::MAX);
        assert_eq!(config.authorization_timeout_ms, Some(u64::MAX));
    }

    #[test]
    fn test_validate_rejects_blank_hint() {
        let config = ResolverConfig::new().with_install_hint("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"authorizationTimeoutMs": 1500, "requestAccounts": false}"#)
                .unwrap();
        assert!(!config.request_accounts);
        assert!(config.legacy_enable_fallback);
        assert_eq!(config.authorization_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.install_hint, DEFAULT_INSTALL_HINT);
    }
}
