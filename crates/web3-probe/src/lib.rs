//! # web3-probe
//!
//! Detects the wallet provider a browser extension injected into the page,
//! asks it for account access, and hands back one client for the rest of
//! the application to use.
//!
//! Resolution reaches one of three terminal states:
//!
//! - a modern EIP-1193 provider (`window.ethereum`) was found and wrapped,
//!   then account access was requested;
//! - only a legacy `window.web3` was found and its `currentProvider` wrapped,
//!   with no authorization step;
//! - nothing was found, and an install hint was logged.
//!
//! A refused authorization is not an error. The handle is built before the
//! prompt, so it exists either way, and the refusal is reported through
//! [`Authorization::Declined`].
//!
//! ## Example
//!
//! ```ignore
//! use web3_probe::{ProviderResolver, ResolverConfig, ResolutionOutcome};
//! use std::time::Duration;
//!
//! let resolver = ProviderResolver::new(
//!     ResolverConfig::new().with_authorization_timeout(Duration::from_secs(60)),
//! )?;
//!
//! let resolution = resolver.resolve(&environment).await;
//! if let Some(client) = resolution.client() {
//!     let chain_id = client.chain_id().await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod client;
pub mod config;
pub mod environment;
pub mod provider;
pub mod resolver;
pub mod rpc;
pub mod timeout;

pub use address::Address;
pub use client::Web3Client;
pub use config::{ResolverConfig, DEFAULT_INSTALL_HINT};
pub use environment::Environment;
pub use provider::{InjectedProvider, ProviderSource};
pub use resolver::{
    resolve, Authorization, Connection, ProviderResolver, Resolution, ResolutionOutcome,
};
pub use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use web3_probe_error::{ErrorCode, Result, Web3Error};
