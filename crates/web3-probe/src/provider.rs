//! The seam between the resolver and whatever object the host injected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use web3_probe_error::Result;

/// Where a provider was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderSource {
    /// An EIP-1193 provider injected as `window.ethereum`
    Injected,
    /// The `currentProvider` of a legacy `window.web3` instance
    Legacy,
}

impl fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSource::Injected => f.write_str("injected"),
            ProviderSource::Legacy => f.write_str("legacy"),
        }
    }
}

/// A wallet provider object exposed by the host environment.
///
/// Implementations forward requests to the wallet; they do not interpret
/// results beyond decoding the transport. Browser providers are
/// single-threaded, so futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait InjectedProvider {
    /// Sends an RPC request and returns the raw JSON result
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Legacy account access (`ethereum.enable()`, EIP-1102)
    async fn enable(&self) -> Result<Vec<String>>;

    /// True if the provider advertises itself as MetaMask
    fn is_metamask(&self) -> bool {
        false
    }
}
