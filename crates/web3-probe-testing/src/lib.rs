//! # web3-probe Testing Infrastructure
//!
//! Testing utilities for the web3-probe crates:
//! - Scripted providers and environments
//! - Edge case account inputs
//! - Property-based testing strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use web3_probe_testing::*;
//!
//! let wallet = MockProvider::granting(&[EdgeCaseAddresses::ETH_VALID]);
//! let env = MockEnvironment::injected(wallet.clone());
//!
//! let resolution = web3_probe::resolve(&env).await;
//! assert_eq!(wallet.call_count("eth_requestAccounts"), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use web3_probe::{Environment, InjectedProvider};
use web3_probe_error::{Result, Web3Error};

// ============================================================================
// Scripted Provider
// ============================================================================

/// How a scripted provider answers one method
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Resolve with this value
    Result(Value),
    /// Fail with this error
    Error(Web3Error),
    /// Never resolve, like a prompt the user walked away from
    Pending,
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, MockReply>,
    enable: Option<MockReply>,
    calls: Vec<String>,
}

/// A provider that answers from a script and records every call.
///
/// Clones share the script and the call log, so a test can keep one copy
/// while the resolver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
    metamask: bool,
}

impl MockProvider {
    /// An empty script; every method answers 4200 (unsupported)
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet that grants `accounts` to `eth_requestAccounts`
    pub fn granting(accounts: &[&str]) -> Self {
        Self::new()
            .with_result("eth_requestAccounts", json!(accounts))
            .with_result("eth_accounts", json!(accounts))
    }

    /// A wallet whose user clicks "reject"
    pub fn rejecting() -> Self {
        Self::new().with_error(
            "eth_requestAccounts",
            Web3Error::from_rpc(4001, "User rejected the request."),
        )
    }

    /// A wallet that predates `eth_requestAccounts` and only has `enable()`
    pub fn enable_only(accounts: &[&str]) -> Self {
        Self::new().with_enable(MockReply::Result(json!(accounts)))
    }

    /// Scripts a successful result
    pub fn with_result(self, method: &str, value: Value) -> Self {
        self.with_reply(method, MockReply::Result(value))
    }

    /// Scripts an error
    pub fn with_error(self, method: &str, error: Web3Error) -> Self {
        self.with_reply(method, MockReply::Error(error))
    }

    /// Scripts a request that never resolves
    pub fn with_pending(self, method: &str) -> Self {
        self.with_reply(method, MockReply::Pending)
    }

    /// Scripts any reply
    pub fn with_reply(self, method: &str, reply: MockReply) -> Self {
        self.lock().replies.insert(method.to_string(), reply);
        self
    }

    /// Scripts the legacy `enable()` call
    pub fn with_enable(self, reply: MockReply) -> Self {
        self.lock().enable = Some(reply);
        self
    }

    /// Sets the `isMetaMask` flag
    pub fn metamask(mut self, flag: bool) -> Self {
        self.metamask = flag;
        self
    }

    /// All calls so far, in order; `enable()` is recorded as `"enable"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls to `method`
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == method).count()
    }

    /// Shares state with `other`
    pub fn same_as(&self, other: &MockProvider) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test poisons the lock; the script is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: &str) -> Option<MockReply> {
        let mut state = self.lock();
        state.calls.push(call.to_string());
        if call == "enable" {
            state.enable.clone()
        } else {
            state.replies.get(call).cloned()
        }
    }

    async fn play(reply: MockReply) -> Result<Value> {
        match reply {
            MockReply::Result(value) => Ok(value),
            MockReply::Error(error) => Err(error),
            MockReply::Pending => futures::future::pending().await,
        }
    }
}

#[async_trait(?Send)]
impl InjectedProvider for MockProvider {
    async fn request(&self, method: &str, _params: Value) -> Result<Value> {
        match self.record(method) {
            Some(reply) => Self::play(reply).await,
            None => Err(Web3Error::from_rpc(4200, format!("{method} not supported"))),
        }
    }

    async fn enable(&self) -> Result<Vec<String>> {
        match self.record("enable") {
            Some(reply) => Ok(serde_json::from_value(Self::play(reply).await?)?),
            None => Err(Web3Error::Transport("enable is not a function".to_string())),
        }
    }

    fn is_metamask(&self) -> bool {
        self.metamask
    }
}

// ============================================================================
// Scripted Environment
// ============================================================================

/// An environment exposing whichever providers the test installs.
///
/// `delay` runs on tokio's timer, so tests can use paused time.
#[derive(Debug, Clone, Default)]
pub struct MockEnvironment {
    injected: Option<MockProvider>,
    legacy: Option<MockProvider>,
}

impl MockEnvironment {
    /// A browser with no wallet extension
    pub fn empty() -> Self {
        Self::default()
    }

    /// A browser exposing `window.ethereum`
    pub fn injected(provider: MockProvider) -> Self {
        Self::default().with_injected(provider)
    }

    /// A browser exposing only `window.web3.currentProvider`
    pub fn legacy(provider: MockProvider) -> Self {
        Self::default().with_legacy(provider)
    }

    /// Installs `window.ethereum`
    pub fn with_injected(mut self, provider: MockProvider) -> Self {
        self.injected = Some(provider);
        self
    }

    /// Installs `window.web3.currentProvider`
    pub fn with_legacy(mut self, provider: MockProvider) -> Self {
        self.legacy = Some(provider);
        self
    }
}

#[async_trait(?Send)]
impl Environment for MockEnvironment {
    type Provider = MockProvider;

    fn injected_provider(&self) -> Option<MockProvider> {
        self.injected.clone()
    }

    fn legacy_provider(&self) -> Option<MockProvider> {
        self.legacy.clone()
    }

    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Edge Case Accounts
// ============================================================================

/// Edge case account strings as wallets return them
pub struct EdgeCaseAddresses;

impl EdgeCaseAddresses {
    /// A checksummed account (EIP-55 test vector)
    pub const ETH_VALID: &'static str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    /// The same account in the lowercase form most wallets return
    pub const ETH_VALID_LOWER: &'static str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    /// Zero address
    pub const ETH_ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// Max address
    pub const ETH_MAX: &'static str = "0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";

    /// Accounts that must parse
    pub fn valid() -> Vec<&'static str> {
        vec![
            Self::ETH_VALID,
            Self::ETH_VALID_LOWER,
            Self::ETH_ZERO,
            Self::ETH_MAX,
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        ]
    }

    /// Accounts that must be rejected
    pub fn invalid() -> Vec<&'static str> {
        vec![
            "",
            "0x",
            "0xGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGG", // Invalid hex
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea",   // Too short
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00", // Too long
            "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", // Bad checksum
        ]
    }
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

/// Generates raw 20-byte addresses
pub fn address_bytes() -> impl Strategy<Value = [u8; 20]> {
    prop::array::uniform20(any::<u8>())
}

/// Generates lowercase `0x` addresses as wallets usually return them
pub fn lowercase_address() -> impl Strategy<Value = String> {
    address_bytes().prop_map(|bytes| format!("0x{}", hex::encode(bytes)))
}

/// Generates `0x` hex quantities together with their value
pub fn hex_quantity() -> impl Strategy<Value = (String, u64)> {
    any::<u64>().prop_map(|n| (format!("{n:#x}"), n))
}
