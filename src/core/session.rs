//! Wallet session state machine.
//!
//! [`Session`] owns the connection state, the active account and the cached
//! balance and price, and gates every balance, fund and withdraw call on a
//! connected account.
//!
//! | State | Trigger | Next state |
//! |-------|---------|------------|
//! | Disconnected | `connect` accepted | Connected |
//! | Disconnected | `connect` rejected | Disconnected |
//! | Connected | accounts list becomes empty | Disconnected |
//! | Connected | chain changed | reload |
//! | Connected | fund / withdraw confirmed | Connected |
//!
//! Operations return an [`Outcome`]; the work it asks for afterwards
//! ([`FollowUp`]) is best-effort and never changes the reported result.

use alloy_primitives::{Address, U256};

use crate::config::{SessionConfig, notice_ttl};
use crate::core::contract::FundMe;
use crate::core::error::WalletError;
use crate::core::persist::SessionStore;
use crate::core::price::{self, PriceApi, PriceQuote, PriceTier};
use crate::core::provider::{self, Eip1193, ProviderEvent};
use crate::core::runtime::Runtime;
use crate::core::units;
use crate::models::{Action, Notice, NoticeSlot, SessionSnapshot, WalletState};

/// Deferred work requested by an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-read the contract balance after `after_ms`.
    RefreshBalance { after_ms: u32 },
    /// Re-resolve the ETH/USD rate.
    RefreshPrice,
    /// Restart the application.
    Reload,
}

/// What an operation wants shown and scheduled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub notice: Option<Notice>,
    pub follow_ups: Vec<FollowUp>,
    /// Clear the amount input.
    pub reset_amount: bool,
}

impl Outcome {
    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    pub fn follow(follow_ups: Vec<FollowUp>) -> Self {
        Self {
            follow_ups,
            ..Self::default()
        }
    }
}

/// The single wallet session of the page.
pub struct Session<P, A, S, R> {
    provider: Option<P>,
    price_api: A,
    store: S,
    runtime: R,
    config: SessionConfig,
    wallet: WalletState,
    chain_generation: u64,
    balance: Option<U256>,
    usd_rate: f64,
    rate_tier: PriceTier,
    remembered: Option<Address>,
}

impl<P, A, S, R> Session<P, A, S, R>
where
    P: Eip1193,
    A: PriceApi,
    S: SessionStore,
    R: Runtime,
{
    /// Create a disconnected session. `provider` is `None` when no wallet
    /// extension was detected.
    pub fn new(provider: Option<P>, price_api: A, store: S, runtime: R, config: SessionConfig) -> Self {
        let remembered = store.load();
        let usd_rate = config.fallback_rate();
        Self {
            provider,
            price_api,
            store,
            runtime,
            config,
            wallet: WalletState::Disconnected,
            chain_generation: 0,
            balance: None,
            usd_rate,
            rate_tier: PriceTier::Fallback,
            remembered,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn wallet(&self) -> &WalletState {
        &self.wallet
    }

    pub fn active_account(&self) -> Option<Address> {
        self.wallet.address()
    }

    /// Contract balance in wei, valid for the connected account only.
    pub fn balance(&self) -> Option<U256> {
        self.balance
    }

    /// Cached ETH/USD rate, always strictly positive.
    pub fn usd_rate(&self) -> f64 {
        self.usd_rate
    }

    pub fn rate_tier(&self) -> PriceTier {
        self.rate_tier
    }

    /// Number of network switches seen by this session.
    pub fn chain_generation(&self) -> u64 {
        self.chain_generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            wallet: self.wallet.clone(),
            provider_available: self.provider.is_some(),
            remembered: self.remembered,
            balance: self.balance,
            usd_rate: self.usd_rate,
            rate_tier: self.rate_tier,
        }
    }

    fn provider(&self) -> Result<&P, WalletError> {
        self.provider.as_ref().ok_or(WalletError::ProviderMissing)
    }

    fn require_account(&self) -> Result<Address, WalletError> {
        self.wallet.address().ok_or(WalletError::NotConnected)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Adopt accounts the wallet already authorized, without a prompt.
    ///
    /// Always asks for a price refresh, connected or not.
    pub async fn start(&mut self) -> Outcome {
        let accounts = match self.provider.as_ref() {
            Some(provider) => provider::accounts(provider).await,
            None => {
                log::warn!("no injected wallet provider detected");
                Ok(Vec::new())
            }
        };

        let mut outcome = match accounts {
            Ok(accounts) if !accounts.is_empty() => {
                let outcome = self.on_accounts_changed(&accounts);
                self.record_chain_id().await;
                outcome
            }
            Ok(_) => {
                if self.remembered.take().is_some() {
                    log::info!("stored wallet session expired");
                    self.store.clear();
                }
                Outcome::default()
            }
            Err(e) => {
                log::warn!("failed to read authorized accounts: {e}");
                Outcome::default()
            }
        };

        if !outcome.follow_ups.contains(&FollowUp::RefreshPrice) {
            outcome.follow_ups.push(FollowUp::RefreshPrice);
        }
        outcome
    }

    /// Request account access through the wallet popup.
    ///
    /// Resolves to `Connected` on success; on any failure the state returns
    /// to what it was before (`Disconnected` when not yet connected).
    pub async fn connect(&mut self) -> Result<Outcome, WalletError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(WalletError::ProviderMissing);
        };
        let previous = std::mem::replace(&mut self.wallet, WalletState::Connecting);

        let accounts = match provider::request_accounts(provider).await {
            Ok(accounts) if !accounts.is_empty() => accounts,
            Ok(_) => {
                self.wallet = previous.settle();
                return Err(WalletError::NoAccount);
            }
            Err(e) => {
                self.wallet = previous.settle();
                if e.is_user_rejected() {
                    log::info!("connection rejected by user");
                } else {
                    log::warn!("connection failed: {e}");
                }
                return Err(e.into());
            }
        };

        let outcome = self.on_accounts_changed(&accounts);
        self.record_chain_id().await;
        Ok(outcome)
    }

    /// Best-effort `eth_chainId` for the network label of a connected wallet.
    async fn record_chain_id(&mut self) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        let chain_id = match provider::chain_id(provider).await {
            Ok(chain_id) => Some(chain_id),
            Err(e) => {
                log::debug!("failed to read chain id: {e}");
                None
            }
        };
        if let WalletState::Connected { chain_id: slot, .. } = &mut self.wallet {
            *slot = chain_id.or(*slot);
        }
    }

    /// Dispatch a provider push event.
    pub fn handle_event(&mut self, event: ProviderEvent) -> Outcome {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(&accounts),
            ProviderEvent::ChainChanged(chain_id) => self.on_chain_changed(&chain_id),
            ProviderEvent::Disconnect => self.on_disconnect(),
        }
    }

    /// Adopt the first account, or disconnect on an empty list.
    ///
    /// Each call supersedes the previous one.
    pub fn on_accounts_changed(&mut self, accounts: &[Address]) -> Outcome {
        let Some(&account) = accounts.first() else {
            return self.disconnect();
        };

        if self.wallet.address() != Some(account) {
            self.balance = None;
            log::info!("active account {account}");
        }
        let chain_id = self.wallet.chain_id();
        self.wallet = WalletState::Connected {
            address: account,
            chain_id,
        };
        self.remembered = Some(account);
        self.store.save(&account);

        Outcome::follow(vec![
            FollowUp::RefreshBalance { after_ms: 0 },
            FollowUp::RefreshPrice,
        ])
    }

    /// The network changed: drop everything chain-specific and reload.
    pub fn on_chain_changed(&mut self, chain_id: &str) -> Outcome {
        self.chain_generation = self.chain_generation.wrapping_add(1);
        log::info!("chain changed to {chain_id}; resetting session");

        self.wallet = WalletState::Disconnected;
        self.balance = None;
        self.usd_rate = self.config.fallback_rate();
        self.rate_tier = PriceTier::Fallback;

        Outcome::follow(vec![FollowUp::Reload])
    }

    pub fn on_disconnect(&mut self) -> Outcome {
        self.disconnect()
    }

    fn disconnect(&mut self) -> Outcome {
        if self.wallet.is_connected() {
            log::info!("wallet disconnected");
        }
        self.wallet = WalletState::Disconnected;
        self.balance = None;
        self.remembered = None;
        self.store.clear();
        Outcome::default()
    }

    // =========================================================================
    // Balance, fund, withdraw
    // =========================================================================

    /// Read the contract balance. On failure the previous value is kept.
    pub async fn refresh_balance(&mut self) -> Result<Outcome, WalletError> {
        self.require_account()?;
        let provider = self.provider()?;

        let wei = FundMe::new(provider, self.config.contract).balance().await?;
        self.balance = Some(wei);

        Ok(Outcome::notice(Notice::success(
            NoticeSlot::Action,
            "Balance updated",
            notice_ttl::BALANCE_SUCCESS_MS,
        )))
    }

    /// Send `amount` ETH to the contract's `fund()` and wait for confirmation.
    pub async fn fund(&self, amount: &str) -> Result<Outcome, WalletError> {
        let from = self.require_account()?;
        let value = units::parse_amount(amount)?;
        let provider = self.provider()?;

        let pending = FundMe::new(provider, self.config.contract).fund(from, value).await?;
        log::info!("fund transaction {} submitted", pending.hash());
        pending
            .wait(self.config.confirmations, self.config.receipt_poll_ms, &self.runtime)
            .await?;

        Ok(Outcome {
            notice: Some(Notice::success(
                NoticeSlot::Fund,
                "Transaction confirmed!",
                notice_ttl::SUCCESS_MS,
            )),
            follow_ups: vec![FollowUp::RefreshBalance {
                after_ms: self.config.balance_refresh_delay_ms,
            }],
            reset_amount: true,
        })
    }

    /// Call the contract's `withdraw()` and wait for confirmation.
    pub async fn withdraw(&self) -> Result<Outcome, WalletError> {
        let from = self.require_account()?;
        let provider = self.provider()?;

        let pending = FundMe::new(provider, self.config.contract).withdraw(from).await?;
        log::info!("withdraw transaction {} submitted", pending.hash());
        pending
            .wait(self.config.confirmations, self.config.receipt_poll_ms, &self.runtime)
            .await?;

        Ok(Outcome {
            notice: Some(Notice::success(
                NoticeSlot::Action,
                "Withdrawal confirmed!",
                notice_ttl::SUCCESS_MS,
            )),
            follow_ups: vec![FollowUp::RefreshBalance {
                after_ms: self.config.balance_refresh_delay_ms,
            }],
            reset_amount: false,
        })
    }

    /// Resolve and cache the ETH/USD rate. Independent of connection state.
    pub async fn refresh_price(&mut self) -> PriceQuote {
        let quote = price::fetch_usd_rate(
            &self.price_api,
            self.provider.as_ref(),
            self.config.contract,
            self.config.fallback_rate(),
        )
        .await;
        self.usd_rate = quote.rate;
        self.rate_tier = quote.tier;
        quote
    }

    /// USD value of the balance at the cached rate.
    pub fn usd_balance(&self) -> Option<f64> {
        self.balance.map(|wei| units::wei_to_eth(wei) * self.usd_rate)
    }

    // =========================================================================
    // Action boundary
    // =========================================================================

    /// Mark `action` as started; returns the notice to show meanwhile.
    pub fn begin(&mut self, action: &Action) -> Option<Notice> {
        let connected = self.wallet.is_connected();
        match action {
            Action::Connect => {
                if self.provider.is_some() && !connected {
                    self.wallet = WalletState::Connecting;
                }
                None
            }
            Action::Fund(_) if connected => Some(Notice::processing(NoticeSlot::Fund, "Processing...")),
            Action::Withdraw if connected => Some(Notice::processing(
                NoticeSlot::Action,
                "Processing withdrawal...",
            )),
            Action::RefreshBalance if connected => Some(Notice::processing(
                NoticeSlot::Action,
                "Refreshing balance...",
            )),
            _ => None,
        }
    }

    /// Run `action`, turning any error into a transient notice.
    pub async fn perform(&mut self, action: Action) -> Outcome {
        let result = match &action {
            Action::Connect => self.connect().await,
            Action::Fund(amount) => self.fund(amount).await,
            Action::Withdraw => self.withdraw().await,
            Action::RefreshBalance => self.refresh_balance().await,
        };

        result.unwrap_or_else(|err| {
            log::warn!("{action:?} failed: {err}");
            // A `Connecting` left behind by `begin` must not outlive the action.
            self.wallet = std::mem::take(&mut self.wallet).settle();
            Outcome::notice(failure_notice(&action, &err))
        })
    }

    /// Background balance refresh; failures are logged only.
    pub async fn refresh_balance_quietly(&mut self) {
        match self.refresh_balance().await {
            Ok(_) | Err(WalletError::NotConnected) => {}
            Err(e) => log::warn!("background balance refresh failed: {e}"),
        }
    }
}

/// User-facing message for a failed action.
pub fn failure_notice(action: &Action, err: &WalletError) -> Notice {
    use notice_ttl::{CONNECT_ERROR_MS, ERROR_MS};

    let slot = match action {
        Action::Connect => NoticeSlot::Connection,
        Action::Fund(_) => NoticeSlot::Fund,
        Action::Withdraw | Action::RefreshBalance => NoticeSlot::Action,
    };

    match (action, err) {
        (_, WalletError::ProviderMissing) => Notice::persistent_error(slot, "MetaMask not installed"),
        (_, WalletError::NotConnected) => Notice::error(slot, "Please connect your wallet first", ERROR_MS),
        (_, WalletError::Validation(_)) => Notice::error(slot, "Please enter a valid amount", ERROR_MS),
        (Action::Connect, WalletError::UserRejected) => {
            Notice::error(slot, "Connection rejected", CONNECT_ERROR_MS)
        }
        (Action::Connect, _) => Notice::error(slot, "Connection error", CONNECT_ERROR_MS),
        (Action::Fund(_), _) => Notice::error(slot, "Transaction failed", ERROR_MS),
        (Action::Withdraw, _) => Notice::error(slot, "Withdrawal failed", ERROR_MS),
        (Action::RefreshBalance, _) => Notice::error(slot, "Failed to get balance", ERROR_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AmountError;
    use crate::core::testing::{
        ACCOUNT_A, ACCOUNT_B, FEED, ManualRuntime, MemoryStore, MockPriceApi, MockProvider,
        TX_HASH, abi_address, abi_words, account, session, session_with,
    };
    use crate::models::NoticeKind;
    use serde_json::json;

    const TWO_ETH: &str = "0x1bc16d674ec80000";

    fn connected(provider: &MockProvider) -> crate::core::testing::TestSession {
        let mut session = session(provider);
        session.on_accounts_changed(&[account(ACCOUNT_A)]);
        session
    }

    #[tokio::test]
    async fn test_connect_accepted() {
        let provider = MockProvider::new();
        provider.ok("eth_requestAccounts", json!([ACCOUNT_A, ACCOUNT_B]));
        provider.ok("eth_chainId", json!("0xaa36a7"));
        let store = MemoryStore::default();
        let mut session = session_with(
            Some(provider.clone()),
            MockPriceApi::price(3000.0),
            store.clone(),
            ManualRuntime::default(),
        );

        let outcome = session.connect().await.unwrap();

        assert_eq!(
            session.wallet(),
            &WalletState::Connected {
                address: account(ACCOUNT_A),
                chain_id: Some(11155111),
            }
        );
        assert_eq!(store.account(), Some(account(ACCOUNT_A)));
        assert_eq!(
            outcome.follow_ups,
            vec![FollowUp::RefreshBalance { after_ms: 0 }, FollowUp::RefreshPrice]
        );
    }

    #[tokio::test]
    async fn test_connect_rejected_returns_to_disconnected() {
        let provider = MockProvider::new();
        provider.fail("eth_requestAccounts", Some(4001), "User rejected the request.");
        let mut session = session(&provider);

        let err = session.connect().await.unwrap_err();

        assert_eq!(err, WalletError::UserRejected);
        assert_eq!(session.wallet(), &WalletState::Disconnected);
        assert_eq!(session.active_account(), None);
    }

    #[tokio::test]
    async fn test_connect_never_stays_connecting() {
        let provider = MockProvider::new();
        provider.fail("eth_requestAccounts", Some(-32002), "Request already pending");
        let mut session = session(&provider);

        assert!(session.begin(&Action::Connect).is_none());
        assert_eq!(session.wallet(), &WalletState::Connecting);

        let outcome = session.perform(Action::Connect).await;

        assert_eq!(session.wallet(), &WalletState::Disconnected);
        let notice = outcome.notice.unwrap();
        assert_eq!(notice.text, "Connection error");
        assert_eq!(notice.slot, NoticeSlot::Connection);
    }

    #[tokio::test]
    async fn test_connect_rejection_notice_is_transient() {
        let provider = MockProvider::new();
        provider.fail("eth_requestAccounts", Some(4001), "User rejected the request.");
        let mut session = session(&provider);

        let notice = session.perform(Action::Connect).await.notice.unwrap();

        assert_eq!(notice.text, "Connection rejected");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.ttl_ms, Some(3000));
    }

    #[tokio::test]
    async fn test_connect_with_empty_account_list() {
        let provider = MockProvider::new();
        provider.ok("eth_requestAccounts", json!([]));
        let mut session = session(&provider);

        assert_eq!(session.connect().await.unwrap_err(), WalletError::NoAccount);
        assert_eq!(session.wallet(), &WalletState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let mut session = session_with(
            None,
            MockPriceApi::price(3000.0),
            MemoryStore::default(),
            ManualRuntime::default(),
        );

        assert_eq!(session.connect().await.unwrap_err(), WalletError::ProviderMissing);
        assert_eq!(session.wallet(), &WalletState::Disconnected);
        assert!(!session.snapshot().provider_available);

        let notice = session.perform(Action::Connect).await.notice.unwrap();
        assert_eq!(notice.ttl_ms, None);
    }

    #[test]
    fn test_active_account_tracks_latest_event() {
        let provider = MockProvider::new();
        let a = account(ACCOUNT_A);
        let b = account(ACCOUNT_B);
        let sequences: Vec<Vec<Vec<Address>>> = vec![
            vec![vec![a]],
            vec![vec![a], vec![]],
            vec![vec![a], vec![b, a], vec![a, b]],
            vec![vec![], vec![b]],
            vec![vec![b], vec![a], vec![], vec![]],
        ];

        for sequence in sequences {
            let mut session = session(&provider);
            for accounts in &sequence {
                session.on_accounts_changed(accounts);
            }
            let expected = sequence.last().and_then(|accounts| accounts.first().copied());
            assert_eq!(session.active_account(), expected, "{sequence:?}");
            assert_eq!(session.wallet().is_connected(), expected.is_some());
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_accounts_emptied_resets_session() {
        let provider = MockProvider::new();
        provider.ok("eth_getBalance", json!(TWO_ETH));
        let store = MemoryStore::default();
        let mut session = session_with(
            Some(provider.clone()),
            MockPriceApi::price(3000.0),
            store.clone(),
            ManualRuntime::default(),
        );

        session.handle_event(ProviderEvent::AccountsChanged(vec![account(ACCOUNT_A)]));
        assert_eq!(session.active_account(), Some(account(ACCOUNT_A)));
        session.refresh_balance().await.unwrap();
        assert_eq!(session.snapshot().balance_text(), "2.0000");

        session.handle_event(ProviderEvent::AccountsChanged(vec![]));

        assert_eq!(session.wallet(), &WalletState::Disconnected);
        assert_eq!(session.active_account(), None);
        assert_eq!(session.balance(), None);
        assert_eq!(session.snapshot().balance_text(), "0.00");
        assert_eq!(store.account(), None);
    }

    #[test]
    fn test_disconnect_event() {
        let provider = MockProvider::new();
        let mut session = connected(&provider);

        session.handle_event(ProviderEvent::Disconnect);

        assert_eq!(session.wallet(), &WalletState::Disconnected);
    }

    #[test]
    fn test_chain_change_resets_and_reloads() {
        let provider = MockProvider::new();
        let mut session = connected(&provider);

        let outcome = session.handle_event(ProviderEvent::ChainChanged("0x5".to_string()));

        assert_eq!(outcome.follow_ups, vec![FollowUp::Reload]);
        assert_eq!(session.chain_generation(), 1);
        assert_eq!(session.wallet(), &WalletState::Disconnected);
        assert_eq!(session.balance(), None);
        assert!(session.usd_rate() > 0.0);
    }

    #[tokio::test]
    async fn test_refresh_balance_requires_connection() {
        let provider = MockProvider::new();
        let mut session = session(&provider);

        assert_eq!(
            session.refresh_balance().await.unwrap_err(),
            WalletError::NotConnected
        );
        assert_eq!(provider.call_count(), 0);

        let notice = session.perform(Action::RefreshBalance).await.notice.unwrap();
        assert_eq!(notice.text, "Please connect your wallet first");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_balance_and_usd_value() {
        let provider = MockProvider::new();
        provider.ok("eth_getBalance", json!(TWO_ETH));
        let mut session = connected(&provider);
        session.refresh_price().await;

        let outcome = session.refresh_balance().await.unwrap();

        assert_eq!(session.balance(), Some(U256::from(2_000_000_000_000_000_000u128)));
        assert_eq!(session.usd_balance(), Some(6000.0));
        assert_eq!(outcome.notice.unwrap().ttl_ms, Some(2000));
    }

    #[tokio::test]
    async fn test_refresh_balance_failure_keeps_previous_value() {
        let provider = MockProvider::new();
        provider.ok("eth_getBalance", json!(TWO_ETH));
        provider.fail("eth_getBalance", None, "network down");
        let mut session = connected(&provider);

        session.refresh_balance().await.unwrap();
        let outcome = session.perform(Action::RefreshBalance).await;

        assert_eq!(session.balance(), Some(U256::from(2_000_000_000_000_000_000u128)));
        assert_eq!(outcome.notice.unwrap().text, "Failed to get balance");
        assert!(session.wallet().is_connected());
    }

    #[tokio::test]
    async fn test_fund_encodes_amount_and_waits() {
        let provider = MockProvider::new();
        provider.ok("eth_sendTransaction", json!(TX_HASH));
        provider.ok(
            "eth_getTransactionReceipt",
            json!({ "blockNumber": "0x10", "status": "0x1" }),
        );
        let session = connected(&provider);

        let outcome = session.fund("1.5").await.unwrap();

        let tx = &provider.calls_to("eth_sendTransaction")[0][0];
        assert_eq!(tx["value"], "0x14d1120d7b160000");
        assert_eq!(
            tx["from"].as_str().unwrap().parse::<Address>().unwrap(),
            account(ACCOUNT_A)
        );
        assert_eq!(provider.methods(), vec!["eth_sendTransaction", "eth_getTransactionReceipt"]);
        assert!(outcome.reset_amount);
        assert_eq!(
            outcome.follow_ups,
            vec![FollowUp::RefreshBalance { after_ms: 2000 }]
        );
        assert_eq!(outcome.notice.unwrap().ttl_ms, Some(5000));
    }

    #[tokio::test]
    async fn test_fund_rejects_invalid_amounts_without_calls() {
        let provider = MockProvider::new();
        let mut session = connected(&provider);

        assert_eq!(
            session.fund("-1").await.unwrap_err(),
            WalletError::Validation(AmountError::NotPositive)
        );
        assert_eq!(
            session.fund("abc").await.unwrap_err(),
            WalletError::Validation(AmountError::Malformed)
        );
        assert_eq!(
            session.fund("0").await.unwrap_err(),
            WalletError::Validation(AmountError::NotPositive)
        );
        let notice = session.perform(Action::Fund(String::new())).await.notice.unwrap();
        assert_eq!(notice.text, "Please enter a valid amount");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fund_requires_connection() {
        let provider = MockProvider::new();
        let session = session(&provider);

        assert_eq!(session.fund("1").await.unwrap_err(), WalletError::NotConnected);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fund_failure_leaves_state_unchanged() {
        let provider = MockProvider::new();
        provider.fail("eth_sendTransaction", Some(4001), "User denied transaction signature.");
        let mut session = connected(&provider);
        let before = session.snapshot();

        let outcome = session.perform(Action::Fund("0.1".to_string())).await;

        assert_eq!(session.snapshot(), before);
        assert!(!outcome.reset_amount);
        assert!(outcome.follow_ups.is_empty());
        assert_eq!(outcome.notice.unwrap().text, "Transaction failed");
        assert_eq!(provider.calls_to("eth_sendTransaction").len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw() {
        let provider = MockProvider::new();
        provider.ok("eth_sendTransaction", json!(TX_HASH));
        provider.ok(
            "eth_getTransactionReceipt",
            json!({ "blockNumber": "0x10", "status": "0x1" }),
        );
        let mut session = connected(&provider);

        let outcome = session.perform(Action::Withdraw).await;

        let tx = &provider.calls_to("eth_sendTransaction")[0][0];
        assert_eq!(tx["data"], "0x3ccfd60b");
        assert!(tx.get("value").is_none());
        assert_eq!(outcome.notice.unwrap().text, "Withdrawal confirmed!");
        assert_eq!(
            outcome.follow_ups,
            vec![FollowUp::RefreshBalance { after_ms: 2000 }]
        );
    }

    #[tokio::test]
    async fn test_withdraw_reverted() {
        let provider = MockProvider::new();
        provider.ok("eth_sendTransaction", json!(TX_HASH));
        provider.ok(
            "eth_getTransactionReceipt",
            json!({ "blockNumber": "0x10", "status": "0x0" }),
        );
        let mut session = connected(&provider);

        let outcome = session.perform(Action::Withdraw).await;

        assert_eq!(outcome.notice.unwrap().text, "Withdrawal failed");
        assert!(session.wallet().is_connected());
    }

    #[tokio::test]
    async fn test_price_falls_back_to_constant() {
        let provider = MockProvider::new();
        provider.fail("eth_call", None, "feed unreachable");
        let mut session = session_with(
            Some(provider.clone()),
            MockPriceApi::unreachable(),
            MemoryStore::default(),
            ManualRuntime::default(),
        );

        let quote = session.refresh_price().await;

        assert_eq!(quote.tier, PriceTier::Fallback);
        assert_eq!(session.usd_rate(), 4500.0);
    }

    #[tokio::test]
    async fn test_usd_value_is_independent_of_price_tier() {
        let feed_up = MockProvider::new();
        feed_up.ok("eth_call", json!(abi_address(account(FEED))));
        feed_up.ok(
            "eth_call",
            json!(abi_words(&[
                U256::from(1u8),
                U256::from(450_000_000_000u64),
                U256::ZERO,
                U256::ZERO,
                U256::from(1u8),
            ])),
        );
        let feed_down = MockProvider::new();
        feed_down.fail("eth_call", None, "feed unreachable");

        for (provider, api, expected_tier) in [
            (feed_down.clone(), MockPriceApi::price(4500.0), PriceTier::Api),
            (feed_up, MockPriceApi::unreachable(), PriceTier::OnChainFeed),
            (feed_down, MockPriceApi::unreachable(), PriceTier::Fallback),
        ] {
            provider.ok("eth_getBalance", json!(TWO_ETH));
            let mut session = session_with(
                Some(provider.clone()),
                api,
                MemoryStore::default(),
                ManualRuntime::default(),
            );
            session.on_accounts_changed(&[account(ACCOUNT_A)]);
            session.refresh_balance().await.unwrap();
            let quote = session.refresh_price().await;

            assert_eq!(quote.tier, expected_tier);
            assert_eq!(session.usd_balance(), Some(9000.0));
        }
    }

    #[tokio::test]
    async fn test_start_restores_authorized_account() {
        let provider = MockProvider::new();
        provider.ok("eth_accounts", json!([ACCOUNT_B]));
        provider.ok("eth_chainId", json!("0xaa36a7"));
        let mut session = session(&provider);

        let outcome = session.start().await;

        assert_eq!(session.active_account(), Some(account(ACCOUNT_B)));
        assert_eq!(session.wallet().chain_id(), Some(11155111));
        assert_eq!(
            outcome.follow_ups,
            vec![FollowUp::RefreshBalance { after_ms: 0 }, FollowUp::RefreshPrice]
        );
        assert_eq!(provider.methods(), vec!["eth_accounts", "eth_chainId"]);
    }

    #[tokio::test]
    async fn test_start_survives_chain_id_failure() {
        let provider = MockProvider::new();
        provider.ok("eth_accounts", json!([ACCOUNT_A]));
        provider.fail("eth_chainId", Some(-32603), "internal error");
        let mut session = session(&provider);

        session.start().await;

        assert_eq!(session.active_account(), Some(account(ACCOUNT_A)));
        assert_eq!(session.wallet().chain_id(), None);
    }

    #[tokio::test]
    async fn test_start_clears_expired_session() {
        let provider = MockProvider::new();
        provider.ok("eth_accounts", json!([]));
        let store = MemoryStore::with_account(account(ACCOUNT_A));
        let mut session = session_with(
            Some(provider.clone()),
            MockPriceApi::price(3000.0),
            store.clone(),
            ManualRuntime::default(),
        );
        assert_eq!(session.snapshot().remembered, Some(account(ACCOUNT_A)));

        let outcome = session.start().await;

        assert_eq!(session.wallet(), &WalletState::Disconnected);
        assert_eq!(session.snapshot().remembered, None);
        assert_eq!(store.account(), None);
        assert_eq!(outcome.follow_ups, vec![FollowUp::RefreshPrice]);
    }

    #[test]
    fn test_begin_notices() {
        let provider = MockProvider::new();
        let mut session = session(&provider);
        assert!(session.begin(&Action::Withdraw).is_none());

        session.on_accounts_changed(&[account(ACCOUNT_A)]);
        let notice = session.begin(&Action::Fund("1".to_string())).unwrap();
        assert_eq!(notice.kind, NoticeKind::Processing);
        assert_eq!(notice.text, "Processing...");
        assert!(session.begin(&Action::Connect).is_none());
        assert!(session.wallet().is_connected());
    }
}
