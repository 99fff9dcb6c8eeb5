//! [`Environment`] backed by the browser `window`.

use crate::provider::JsProvider;
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use std::time::Duration;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web3_probe::Environment;
use web3_probe_error::{Result, Web3Error};
use web_sys::Window;

/// The page's `window`, read for `ethereum` and `web3`.
#[derive(Debug, Clone)]
pub struct BrowserEnvironment {
    window: Window,
}

impl BrowserEnvironment {
    /// Binds to the global `window`; fails in workers and outside a browser
    pub fn new() -> Result<Self> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or_else(|| Web3Error::Transport("No global window object".to_string()))
    }

    fn global(&self, name: &str) -> Option<JsValue> {
        Reflect::get(&self.window, &JsValue::from_str(name)).ok()
    }
}

#[async_trait(?Send)]
impl Environment for BrowserEnvironment {
    type Provider = JsProvider;

    fn injected_provider(&self) -> Option<JsProvider> {
        JsProvider::from_value(self.global("ethereum")?)
    }

    fn legacy_provider(&self) -> Option<JsProvider> {
        let web3 = self.global("web3")?;
        if !web3.is_object() {
            return None;
        }
        let current = Reflect::get(&web3, &JsValue::from_str("currentProvider")).ok()?;
        JsProvider::from_value(current)
    }

    async fn delay(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
            if let Err(err) = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            {
                tracing::warn!(error = ?err, "setTimeout failed, resolving immediately");
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        // The promise never rejects.
        let _ = JsFuture::from(promise).await;
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn set_global(name: &str, source: &str) {
        let window = web_sys::window().unwrap();
        let value = Function::new_no_args(source).call0(&JsValue::NULL).unwrap();
        Reflect::set(&window, &JsValue::from_str(name), &value).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_detects_ethereum_and_legacy_web3() {
        let env = BrowserEnvironment::new().unwrap();

        set_global("ethereum", "return undefined;");
        set_global("web3", "return undefined;");
        assert!(env.injected_provider().is_none());
        assert!(env.legacy_provider().is_none());

        set_global("web3", "return { currentProvider: { sendAsync: () => {} } };");
        assert!(env.legacy_provider().is_some());

        set_global("web3", "return { currentProvider: null };");
        assert!(env.legacy_provider().is_none());

        set_global("ethereum", "return { request: () => Promise.resolve([]) };");
        assert!(env.injected_provider().is_some());
    }

    #[wasm_bindgen_test]
    async fn test_delay_resolves() {
        let env = BrowserEnvironment::new().unwrap();
        env.delay(Duration::from_millis(1)).await;
    }
}
