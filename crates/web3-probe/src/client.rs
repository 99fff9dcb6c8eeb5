//! The handle the rest of the application talks to the chain through.

use crate::address::Address;
use crate::provider::{InjectedProvider, ProviderSource};
use crate::rpc::{parse_quantity, parse_quantity_u64};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use web3_probe_error::Result;

/// A connected client wrapping one provider.
///
/// Created once per resolution and never mutated; clone it to share.
#[derive(Debug, Clone)]
pub struct Web3Client<P> {
    provider: P,
    source: ProviderSource,
}

impl<P: InjectedProvider> Web3Client<P> {
    /// Wraps a provider found at `source`
    pub fn new(provider: P, source: ProviderSource) -> Self {
        Self { provider, source }
    }

    /// Where the wrapped provider came from
    pub fn source(&self) -> ProviderSource {
        self.source
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sends a request and decodes the result
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> Result<R> {
        let params = serde_json::to_value(params)?;
        tracing::trace!(method, source = %self.source, "Provider request");
        let value = self.provider.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Accounts already exposed to this page (`eth_accounts`); never prompts
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.request("eth_accounts", json!([])).await?;
        parse_accounts(&raw)
    }

    /// Prompts for account access (`eth_requestAccounts`)
    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.request("eth_requestAccounts", json!([])).await?;
        parse_accounts(&raw)
    }

    /// Current chain id (`eth_chainId`)
    pub async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity_u64(&raw)
    }

    /// Latest block number (`eth_blockNumber`)
    pub async fn block_number(&self) -> Result<u64> {
        let raw: String = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity_u64(&raw)
    }

    /// Balance in wei at the latest block (`eth_getBalance`)
    pub async fn balance(&self, address: &Address) -> Result<u128> {
        let raw: String = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_quantity(&raw)
    }

    /// Network id as reported by `net_version`
    pub async fn net_version(&self) -> Result<String> {
        let raw: Value = self.request("net_version", json!([])).await?;
        // Some legacy providers answer with a number.
        Ok(match raw {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

pub(crate) fn parse_accounts(raw: &[String]) -> Result<Vec<Address>> {
    raw.iter().map(|account| Address::parse(account)).collect()
}
