//! Injected wallet provider using web-sys.
//!
//! Provides MetaMask (EIP-1193) wallet connectivity through
//! direct JavaScript interop via Reflect API.

use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::core::error::{ProviderError, WalletError};
use crate::core::provider::{Eip1193, ProviderEvent, parse_accounts};
use crate::utils::dom;

/// The `window.ethereum` object injected by MetaMask or a compatible wallet.
#[derive(Clone, Debug)]
pub struct InjectedProvider {
    ethereum: Object,
}

impl InjectedProvider {
    /// Probe `window.ethereum` for a `request` function.
    pub fn detect() -> Result<Self, WalletError> {
        let window = dom::window().ok_or(WalletError::ProviderMissing)?;
        let ethereum = Reflect::get(&window, &"ethereum".into())
            .ok()
            .and_then(|v| v.dyn_into::<Object>().ok())
            .ok_or(WalletError::ProviderMissing)?;

        let has_request = Reflect::get(&ethereum, &"request".into())
            .map(|f| f.is_function())
            .unwrap_or(false);
        if !has_request {
            return Err(WalletError::ProviderMissing);
        }
        Ok(Self { ethereum })
    }

    /// Whether the provider identifies itself as MetaMask.
    pub fn is_metamask(&self) -> bool {
        Reflect::get(&self.ethereum, &"isMetaMask".into())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Forward `accountsChanged`, `chainChanged` and `disconnect` to `sink`.
    ///
    /// # Note
    /// The closures are intentionally leaked using `forget()` since this is a
    /// single-page application where the listeners should persist for the
    /// entire lifetime of the page.
    pub fn subscribe(&self, sink: impl Fn(ProviderEvent) + Clone + 'static) -> Result<(), WalletError> {
        let on_accounts = sink.clone();
        self.listen("accountsChanged", move |accounts: JsValue| {
            let accounts = serde_wasm_bindgen::from_value::<Value>(accounts)
                .map(|v| parse_accounts(&v))
                .unwrap_or_default();
            on_accounts(ProviderEvent::AccountsChanged(accounts));
        })?;

        let on_chain = sink.clone();
        self.listen("chainChanged", move |chain_id: JsValue| {
            on_chain(ProviderEvent::ChainChanged(
                chain_id.as_string().unwrap_or_default(),
            ));
        })?;

        self.listen("disconnect", move |_| sink(ProviderEvent::Disconnect))
    }

    fn listen(&self, event: &str, handler: impl Fn(JsValue) + 'static) -> Result<(), WalletError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(JsValue)>);

        let on_fn = Reflect::get(&self.ethereum, &"on".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or(WalletError::ProviderMissing)?;

        on_fn
            .call2(&self.ethereum, &event.into(), closure.as_ref())
            .map_err(|e| WalletError::NetworkOrContract(describe(&e)))?;

        closure.forget();
        Ok(())
    }
}

impl Eip1193 for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = Object::new();
        let js_params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::other(format!("failed to encode params: {e}")))?;
        Reflect::set(&args, &"method".into(), &method.into())
            .and_then(|_| Reflect::set(&args, &"params".into(), &js_params))
            .map_err(|_| ProviderError::other("failed to create wallet request"))?;

        let request = Reflect::get(&self.ethereum, &"request".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::other("wallet provider has no request function"))?;

        let promise: Promise = request.call1(&self.ethereum, &args).map_err(rpc_error)?.into();
        let result = JsFuture::from(promise).await.map_err(rpc_error)?;

        serde_wasm_bindgen::from_value(result)
            .map_err(|e| ProviderError::other(format!("failed to decode {method} result: {e}")))
    }
}

/// Convert a rejected `request` promise into a [`ProviderError`].
fn rpc_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    ProviderError::new(code, describe(&err))
}

fn describe(err: &JsValue) -> String {
    Reflect::get(err, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Convert chain ID to network name
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "Ethereum",
        11155111 => "Sepolia",
        17000 => "Holesky",
        31337 => "Localhost",
        42161 => "Arbitrum",
        10 => "Optimism",
        8453 => "Base",
        137 => "Polygon",
        _ => "Unknown",
    }
}
