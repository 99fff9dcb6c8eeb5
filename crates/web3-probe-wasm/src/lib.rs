//! # web3-probe WASM
//!
//! WebAssembly bindings that resolve the wallet provider injected into the
//! page and hand one client back to JavaScript.
//!
//! ## Usage in JavaScript/TypeScript
//!
//! ```javascript
//! import init, { resolveWeb3 } from 'web3-probe-wasm';
//!
//! async function main() {
//!     await init();
//!
//!     const resolution = resolveWeb3({ authorizationTimeoutMs: 60000 });
//!     console.log(resolution.outcome);  // "injectedConnected" | "legacyConnected" | "noProvider"
//!
//!     // Usable while the wallet prompt is still open
//!     const web3 = resolution.handle();
//!     if (web3) {
//!         console.log("Chain:", await web3.chainId());
//!     }
//!
//!     console.log(await resolution.authorization);  // { status, accounts, error }
//! }
//! ```

pub mod environment;
pub mod provider;

pub use environment::BrowserEnvironment;
pub use provider::{error_to_js, js_error, JsProvider};

use js_sys::Promise;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web3_probe::{
    Address, Authorization, Connection, ProviderResolver, ResolverConfig, Web3Client,
};
use web3_probe_error::{ErrorCode, Web3Error};

// Initialize panic hook for better error messages in browser console
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

// ============================================================================
// Initialization
// ============================================================================

/// Installs the panic hook and routes `tracing` output to the console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    #[cfg(target_arch = "wasm32")]
    let _ = wasm_tracing::set_as_global_default();
}

/// Returns the web3-probe WASM version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves the page's wallet provider.
///
/// Returns at once: the handle is usable while the wallet prompt is still
/// open, and `authorization` settles when the user answers.
///
/// `config` is an optional plain object with any of `requestAccounts`,
/// `legacyEnableFallback`, `authorizationTimeoutMs` and `installHint`.
#[wasm_bindgen(js_name = resolveWeb3)]
pub fn resolve_web3(config: JsValue) -> Result<Web3Resolution, JsError> {
    let config: ResolverConfig = if config.is_undefined() || config.is_null() {
        ResolverConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
    };

    let resolver = ProviderResolver::new(config).map_err(|e| JsError::new(&e.to_string()))?;
    let env = BrowserEnvironment::new().map_err(|e| JsError::new(&e.to_string()))?;

    let inner = resolver.connect(&env);
    // Show the prompt now rather than when JS first reads `authorization`.
    let pending = inner.authorization();
    spawn_local(async move {
        pending.await;
    });

    Ok(Web3Resolution { inner })
}

/// Outcome of [`resolve_web3`]
#[wasm_bindgen]
pub struct Web3Resolution {
    inner: Connection<JsProvider>,
}

#[wasm_bindgen]
impl Web3Resolution {
    /// `"injectedConnected"`, `"legacyConnected"` or `"noProvider"`
    #[wasm_bindgen(getter)]
    pub fn outcome(&self) -> String {
        self.inner.outcome().as_str().to_string()
    }

    /// Promise of `{ status, accounts, error }` describing the authorization step
    #[wasm_bindgen(getter)]
    pub fn authorization(&self) -> Promise {
        let pending = self.inner.authorization();
        future_to_promise(async move {
            let report = AuthorizationReport::from(&pending.await);
            provider::to_js(&report).map_err(|e| error_to_js(&e))
        })
    }

    /// Promise of the granted accounts; empty unless authorized
    pub fn accounts(&self) -> Promise {
        let pending = self.inner.authorization();
        future_to_promise(async move {
            let authorization = pending.await;
            provider::to_js(authorization.accounts()).map_err(|e| error_to_js(&e))
        })
    }

    /// The client handle, or `undefined` when no provider was found
    pub fn handle(&self) -> Option<Web3Handle> {
        self.inner.client().cloned().map(|client| Web3Handle { client })
    }
}

// ============================================================================
// Client Handle
// ============================================================================

/// The connected client, shared with the rest of the front-end
#[wasm_bindgen]
pub struct Web3Handle {
    client: Web3Client<JsProvider>,
}

#[wasm_bindgen]
impl Web3Handle {
    /// `"injected"` or `"legacy"`
    #[wasm_bindgen(getter)]
    pub fn source(&self) -> String {
        self.client.source().to_string()
    }

    /// The wrapped provider object
    #[wasm_bindgen(getter)]
    pub fn provider(&self) -> JsValue {
        self.client.provider().as_object().clone().into()
    }

    /// Sends any RPC request; `params` defaults to `[]`
    pub fn request(&self, method: String, params: JsValue) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let params: Value = if params.is_undefined() || params.is_null() {
                json!([])
            } else {
                provider::from_js(params).map_err(|e| error_to_js(&e))?
            };
            let result: Value = client
                .request(&method, params)
                .await
                .map_err(|e| error_to_js(&e))?;
            provider::to_js(&result).map_err(|e| error_to_js(&e))
        })
    }

    /// Checksummed accounts already exposed to the page
    pub fn accounts(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let accounts = client.accounts().await.map_err(|e| error_to_js(&e))?;
            provider::to_js(&accounts).map_err(|e| error_to_js(&e))
        })
    }

    /// Current chain id as a number
    #[wasm_bindgen(js_name = chainId)]
    pub fn chain_id(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let chain_id = client.chain_id().await.map_err(|e| error_to_js(&e))?;
            Ok(JsValue::from_f64(chain_id as f64))
        })
    }

    /// Latest block number as a number
    #[wasm_bindgen(js_name = blockNumber)]
    pub fn block_number(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let number = client.block_number().await.map_err(|e| error_to_js(&e))?;
            Ok(JsValue::from_f64(number as f64))
        })
    }
}

// ============================================================================
// Types for JS Interop
// ============================================================================

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AuthorizationReport {
    status: &'static str,
    accounts: Vec<Address>,
    error: Option<ErrorReport>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ErrorReport {
    kind: ErrorCode,
    rpc_code: Option<i64>,
    message: String,
}

impl From<&Web3Error> for ErrorReport {
    fn from(err: &Web3Error) -> Self {
        Self {
            kind: err.code(),
            rpc_code: err.rpc_code(),
            message: err.to_string(),
        }
    }
}

impl From<&Authorization> for AuthorizationReport {
    fn from(authorization: &Authorization) -> Self {
        let status = match authorization {
            Authorization::Authorized(_) => "authorized",
            Authorization::Declined(_) => "declined",
            Authorization::NotRequested => "notRequested",
            Authorization::Unavailable => "unavailable",
        };
        Self {
            status,
            accounts: authorization.accounts().to_vec(),
            error: authorization.cause().map(ErrorReport::from),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_authorized() {
        let address = Address::new([0x11; 20]);
        let report = AuthorizationReport::from(&Authorization::Authorized(vec![address]));
        assert_eq!(report.status, "authorized");
        assert_eq!(report.accounts, vec![address]);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_declined_serializes() {
        let authorization = Authorization::Declined(Web3Error::from_rpc(4001, "User rejected"));
        let report = AuthorizationReport::from(&authorization);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "declined");
        assert_eq!(json["accounts"], serde_json::json!([]));
        assert_eq!(json["error"]["kind"], "userRejected");
        assert_eq!(json["error"]["rpcCode"], 4001);
    }

    #[test]
    fn test_report_timeout_has_no_rpc_code() {
        let authorization = Authorization::Declined(Web3Error::Timeout {
            operation: "eth_requestAccounts".into(),
            millis: 1000,
        });
        let json = serde_json::to_value(AuthorizationReport::from(&authorization)).unwrap();
        assert_eq!(json["error"]["kind"], "timeout");
        assert!(json["error"]["rpcCode"].is_null());
    }

    #[test]
    fn test_report_not_requested_and_unavailable() {
        assert_eq!(
            AuthorizationReport::from(&Authorization::NotRequested).status,
            "notRequested"
        );
        assert_eq!(
            AuthorizationReport::from(&Authorization::Unavailable).status,
            "unavailable"
        );
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }
}
