//! Test doubles for the session seams.
//!
//! Every double shares its state through `Rc` so a test can keep a clone
//! for inspection after handing the original to a [`Session`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::{Future, ready};
use std::pin::Pin;
use std::rc::Rc;

use alloy_primitives::{Address, U256, hex};
use serde_json::Value;

use crate::config::SessionConfig;
use crate::core::error::{FetchError, ProviderError};
use crate::core::persist::SessionStore;
use crate::core::price::PriceApi;
use crate::core::provider::Eip1193;
use crate::core::runtime::Runtime;
use crate::core::session::Session;

pub const ACCOUNT_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const ACCOUNT_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const FEED: &str = "0x694aa1769357215de4fac081bf1f309adc325306";
pub const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

pub fn account(s: &str) -> Address {
    s.parse().expect("valid test address")
}

/// ABI-encode 32-byte words as a `0x` hex string.
pub fn abi_words(words: &[U256]) -> String {
    let bytes: Vec<u8> = words
        .iter()
        .flat_map(|w| w.to_be_bytes::<32>())
        .collect();
    hex::encode_prefixed(bytes)
}

/// ABI-encode an address return value.
pub fn abi_address(address: Address) -> String {
    abi_words(&[U256::from_be_slice(address.as_slice())])
}

// =============================================================================
// MockProvider
// =============================================================================

#[derive(Default)]
struct MockState {
    responses: HashMap<String, VecDeque<Result<Value, ProviderError>>>,
    calls: Vec<(String, Value)>,
}

/// Scripted EIP-1193 provider that records every request.
///
/// Responses for a method are consumed in order; the last one is repeated.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Rc<RefCell<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&self, method: &str, value: Value) {
        self.push(method, Ok(value));
    }

    pub fn fail(&self, method: &str, code: Option<i64>, message: &str) {
        self.push(method, Err(ProviderError::new(code, message)));
    }

    fn push(&self, method: &str, response: Result<Value, ProviderError>) {
        self.state
            .borrow_mut()
            .responses
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn methods(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

impl Eip1193 for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let mut state = self.state.borrow_mut();
        state.calls.push((method.to_string(), params));
        let queue = state.responses.get_mut(method);
        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(Value::Null)),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::other(format!("no response for {method}")))),
            None => Err(ProviderError::other(format!("unexpected call to {method}"))),
        }
    }
}

// =============================================================================
// MockPriceApi
// =============================================================================

/// Price API answering with a fixed result.
#[derive(Clone)]
pub struct MockPriceApi {
    result: Result<f64, FetchError>,
    calls: Rc<Cell<usize>>,
}

impl MockPriceApi {
    pub fn price(usd: f64) -> Self {
        Self {
            result: Ok(usd),
            calls: Rc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: Err(FetchError::NetworkError("offline".to_string())),
            calls: Rc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.get()
    }
}

impl PriceApi for MockPriceApi {
    async fn usd_price(&self) -> Result<f64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory [`SessionStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    account: Rc<RefCell<Option<Address>>>,
}

impl MemoryStore {
    pub fn with_account(account: Address) -> Self {
        let store = Self::default();
        store.save(&account);
        store
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.borrow()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, account: &Address) {
        *self.account.borrow_mut() = Some(*account);
    }

    fn clear(&self) {
        *self.account.borrow_mut() = None;
    }

    fn load(&self) -> Option<Address> {
        self.account()
    }
}

// =============================================================================
// ManualRuntime
// =============================================================================

type Task = Pin<Box<dyn Future<Output = ()>>>;

/// Runtime whose sleeps complete immediately and whose spawned tasks wait
/// for [`ManualRuntime::run_pending`].
#[derive(Clone, Default)]
pub struct ManualRuntime {
    slept: Rc<RefCell<Vec<u32>>>,
    tasks: Rc<RefCell<Vec<Task>>>,
    reloads: Rc<Cell<usize>>,
}

impl ManualRuntime {
    pub fn slept(&self) -> Vec<u32> {
        self.slept.borrow().clone()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }

    /// Drive every task spawned so far to completion.
    pub async fn run_pending(&self) {
        let tasks: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        for task in tasks {
            task.await;
        }
    }
}

impl Runtime for ManualRuntime {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()> + 'static {
        self.slept.borrow_mut().push(ms);
        ready(())
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        self.tasks.borrow_mut().push(Box::pin(task));
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

// =============================================================================
// Session builders
// =============================================================================

pub type TestSession = Session<MockProvider, MockPriceApi, MemoryStore, ManualRuntime>;

/// Session over `provider` with a reachable price API at 3000 USD.
pub fn session(provider: &MockProvider) -> TestSession {
    session_with(
        Some(provider.clone()),
        MockPriceApi::price(3000.0),
        MemoryStore::default(),
        ManualRuntime::default(),
    )
}

pub fn session_with(
    provider: Option<MockProvider>,
    price_api: MockPriceApi,
    store: MemoryStore,
    runtime: ManualRuntime,
) -> TestSession {
    Session::new(provider, price_api, store, runtime, SessionConfig::default())
}
