//! [`InjectedProvider`] over a JavaScript provider object.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web3_probe::{InjectedProvider, JsonRpcRequest, JsonRpcResponse};
use web3_probe_error::{Result, Web3Error};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Argument of EIP-1193 `request()`
#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

/// A provider object found on the page (`window.ethereum` or
/// `window.web3.currentProvider`).
#[derive(Debug, Clone)]
pub struct JsProvider {
    object: Object,
}

impl JsProvider {
    /// Wraps `value` if it is a non-null object
    pub fn from_value(value: JsValue) -> Option<Self> {
        if value.is_null() || value.is_undefined() || !value.is_object() {
            return None;
        }
        value.dyn_into::<Object>().ok().map(|object| Self { object })
    }

    /// The underlying JS object
    pub fn as_object(&self) -> &Object {
        &self.object
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.object, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    /// Pre-EIP-1193 transport: `sendAsync(payload, (err, response) => ...)`
    async fn send_async(&self, send_async: &Function, method: &str, params: Value) -> Result<Value> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let payload = to_js(&JsonRpcRequest::new(method, params, id))?;

        let promise = Promise::new(&mut |resolve: Function, reject: Function| {
            let on_reject = reject.clone();
            let callback = Closure::once_into_js(move |err: JsValue, response: JsValue| {
                let outcome = if err.is_null() || err.is_undefined() {
                    resolve.call1(&JsValue::UNDEFINED, &response)
                } else {
                    reject.call1(&JsValue::UNDEFINED, &err)
                };
                if outcome.is_err() {
                    tracing::warn!("sendAsync callback could not settle its promise");
                }
            });
            if let Err(err) = send_async.call2(&self.object, &payload, &callback) {
                let _ = on_reject.call1(&JsValue::UNDEFINED, &err);
            }
        });

        let response = JsFuture::from(promise).await.map_err(js_error)?;
        let envelope: JsonRpcResponse = from_js(response)?;
        envelope.into_result()
    }
}

#[async_trait(?Send)]
impl InjectedProvider for JsProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        if let Some(request) = self.method("request") {
            let args = to_js(&RequestArguments {
                method,
                params: &params,
            })?;
            let returned = request.call1(&self.object, &args).map_err(js_error)?;
            return from_js(settle(returned).await?);
        }

        if let Some(send_async) = self.method("sendAsync") {
            tracing::debug!(method, "Provider has no request(), using sendAsync");
            return self.send_async(&send_async, method, params).await;
        }

        Err(Web3Error::Transport(
            "provider exposes neither request() nor sendAsync()".to_string(),
        ))
    }

    async fn enable(&self) -> Result<Vec<String>> {
        let enable = self
            .method("enable")
            .ok_or_else(|| Web3Error::Transport("provider has no enable()".to_string()))?;
        let returned = enable.call0(&self.object).map_err(js_error)?;
        from_js(settle(returned).await?)
    }

    fn is_metamask(&self) -> bool {
        Reflect::get(&self.object, &JsValue::from_str("isMetaMask"))
            .ok()
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false)
    }
}

/// Awaits `value` if it is a promise
async fn settle(value: JsValue) -> Result<JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(js_error),
        Err(value) => Ok(value),
    }
}

/// Maps a thrown/rejected JS value onto [`Web3Error`].
///
/// Provider errors carry a numeric `code`; anything else is a transport
/// failure.
pub fn js_error(err: JsValue) -> Web3Error {
    let field = |name: &str| {
        if err.is_object() {
            Reflect::get(&err, &JsValue::from_str(name)).ok()
        } else {
            None
        }
    };

    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));

    match field("code").and_then(|c| c.as_f64()) {
        Some(code) => Web3Error::from_rpc(code as i64, message),
        None => Web3Error::Transport(message),
    }
}

/// Converts `err` into a JS `Error` carrying the provider code, if any
pub fn error_to_js(err: &Web3Error) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    if let Some(code) = err.rpc_code() {
        let _ = Reflect::set(&js, &JsValue::from_str("code"), &JsValue::from_f64(code as f64));
    }
    js.into()
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Web3Error::Json(e.to_string()))
}

pub(crate) fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| Web3Error::Json(e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde_json::json;
    use wasm_bindgen_test::*;

    fn provider(source: &str) -> JsProvider {
        let factory = Function::new_no_args(source);
        JsProvider::from_value(factory.call0(&JsValue::NULL).unwrap()).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_from_value_rejects_non_objects() {
        assert!(JsProvider::from_value(JsValue::UNDEFINED).is_none());
        assert!(JsProvider::from_value(JsValue::NULL).is_none());
        assert!(JsProvider::from_value(JsValue::from_str("ethereum")).is_none());
    }

    #[wasm_bindgen_test]
    async fn test_eip1193_request() {
        let provider = provider(
            "return { isMetaMask: true, request: (a) => Promise.resolve(a.method === 'eth_chainId' ? '0x1' : a.params) };",
        );
        assert!(provider.is_metamask());
        assert_eq!(provider.request("eth_chainId", json!([])).await.unwrap(), json!("0x1"));
        assert_eq!(
            provider.request("echo", json!(["a", 1])).await.unwrap(),
            json!(["a", 1])
        );
    }

    #[wasm_bindgen_test]
    async fn test_eip1193_rejection_maps_code() {
        let provider = provider(
            "return { request: () => Promise.reject({ code: 4001, message: 'User rejected the request.' }) };",
        );
        let err = provider.request("eth_requestAccounts", json!([])).await.unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[wasm_bindgen_test]
    async fn test_send_async_fallback() {
        let provider = provider(
            "return { sendAsync: (p, cb) => cb(null, { jsonrpc: '2.0', id: p.id, result: p.method }) };",
        );
        assert_eq!(
            provider.request("net_version", json!([])).await.unwrap(),
            json!("net_version")
        );
    }

    #[wasm_bindgen_test]
    async fn test_send_async_error() {
        let provider = provider(
            "return { sendAsync: (p, cb) => cb({ code: -32601, message: 'nope' }, null) };",
        );
        let err = provider.request("eth_requestAccounts", json!([])).await.unwrap_err();
        assert!(err.is_unsupported_method());
    }

    #[wasm_bindgen_test]
    async fn test_enable() {
        let provider = provider(
            "return { enable: () => Promise.resolve(['0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed']) };",
        );
        let accounts = provider.enable().await.unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[wasm_bindgen_test]
    async fn test_bare_object_is_transport_error() {
        let provider = provider("return {};");
        let err = provider.request("eth_chainId", json!([])).await.unwrap_err();
        assert_eq!(err.code(), web3_probe_error::ErrorCode::Transport);
        assert!(provider.enable().await.is_err());
    }

    #[wasm_bindgen_test]
    fn test_error_to_js_carries_code() {
        let js = error_to_js(&Web3Error::from_rpc(4001, "no"));
        let code = Reflect::get(&js, &JsValue::from_str("code")).unwrap();
        assert_eq!(code.as_f64(), Some(4001.0));
    }
}
