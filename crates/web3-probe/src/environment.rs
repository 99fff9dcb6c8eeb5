//! Ambient capabilities of the host.

use crate::provider::InjectedProvider;
use async_trait::async_trait;
use std::time::Duration;

/// What the host environment exposes to the resolver.
///
/// In a browser this is the `window` object; tests script it directly.
#[async_trait(?Send)]
pub trait Environment {
    /// Provider object type found in this environment
    type Provider: InjectedProvider + Clone;

    /// The modern injected provider, if present
    fn injected_provider(&self) -> Option<Self::Provider>;

    /// The legacy provider's current transport, if present
    fn legacy_provider(&self) -> Option<Self::Provider>;

    /// Resolves after `duration`; only used to bound the authorization prompt
    async fn delay(&self, duration: Duration);
}
