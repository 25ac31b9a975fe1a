//! Enable Wallet
//!
//! Connects one chain of one registered gateway and merges the retrieved
//! accounts into the aggregate state.
//!
//! ```text
//! resolve ─► available? ─► connected? ─► connect(chain) ─► get_accounts(chain)
//!    │           │             │               │                  │
//!    └───────────┴─────────────┴───── failure ─┴──────────────────┘
//!                                        │
//!                         ConnectionFailed { error }   (no events)
//!
//! success ─► WalletConnected { chain, accounts }
//!         ─► wallet/accountsRetrieved ─► wallet/walletConnected
//! ```
//!
//! Failures never escape: they are written to the store's last error and the
//! call returns normally. Each success only touches its own chain entry, so
//! attempts for different chains can run in any order or interleaved.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::events::{EventPublisher, WalletEvent};
use crate::gateway::WalletRegistry;
use crate::store::{WalletAction, WalletStore};
use crate::wallet::{Account, WalletError};

/// Connection orchestrator
pub struct EnableWallet {
    registry: Arc<WalletRegistry>,
    store: Arc<WalletStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl EnableWallet {
    pub fn new(
        registry: Arc<WalletRegistry>,
        store: Arc<WalletStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            store,
            publisher,
        }
    }

    /// Enable `chain_id` on the gateway registered as `gateway_id`.
    ///
    /// Inspect the store afterwards for the outcome.
    pub async fn enable_wallet(&self, gateway_id: &str, chain_id: &str) {
        match self.retrieve_accounts(gateway_id, chain_id).await {
            Ok(accounts) => {
                info!(
                    gateway = gateway_id,
                    chain_id,
                    accounts = accounts.len(),
                    "Wallet connected"
                );

                self.store
                    .dispatch(WalletAction::WalletConnected {
                        chain_id: chain_id.to_string(),
                        accounts: accounts.clone(),
                    })
                    .await;

                self.publisher
                    .publish(WalletEvent::AccountsRetrieved {
                        chain_id: chain_id.to_string(),
                        accounts,
                    })
                    .await;
                self.publisher
                    .publish(WalletEvent::WalletConnected {
                        gateway_id: gateway_id.to_string(),
                        chain_id: chain_id.to_string(),
                    })
                    .await;
            }
            Err(error) => {
                warn!(
                    gateway = gateway_id,
                    chain_id,
                    kind = error.kind(),
                    "Failed to enable wallet: {}",
                    error
                );
                self.store
                    .dispatch(WalletAction::ConnectionFailed { error })
                    .await;
            }
        }
    }

    async fn retrieve_accounts(
        &self,
        gateway_id: &str,
        chain_id: &str,
    ) -> Result<Vec<Account>, WalletError> {
        let gateway = self.registry.resolve(gateway_id)?;

        if !gateway.is_available() {
            debug!(gateway = gateway_id, "Wallet provider is not available");
            return Err(WalletError::Connection);
        }
        if !gateway.is_connected() {
            debug!(gateway = gateway_id, "Wallet provider is not connected");
            return Err(WalletError::Connection);
        }

        gateway.connect(chain_id).await?;
        gateway.get_accounts(chain_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventFilter, InMemoryEventBus, ACCOUNTS_RETRIEVED, WALLET_CONNECTED};
    use crate::gateway::{InMemoryWalletGateway, WalletGateway};
    use crate::store::WalletState;
    use crate::wallet::{AccountsByChainId, ConnectionStatus, ConnectionStatuses};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tokio_test::{assert_pending, assert_ready, task};

    const CHAIN_ID_1: &str = "chainId#1";
    const CHAIN_ID_2: &str = "chainId#2";

    struct Fixture {
        registry: Arc<WalletRegistry>,
        gateway: Arc<InMemoryWalletGateway>,
        store: Arc<WalletStore>,
        bus: Arc<InMemoryEventBus>,
        use_case: EnableWallet,
    }

    fn init() -> Fixture {
        let registry = Arc::new(WalletRegistry::new());
        let gateway = Arc::new(InMemoryWalletGateway::new("gateway#1"));
        let store = Arc::new(WalletStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        registry.register(gateway.clone());

        let use_case = EnableWallet::new(registry.clone(), store.clone(), bus.clone());
        Fixture {
            registry,
            gateway,
            store,
            bus,
            use_case,
        }
    }

    fn account(n: u8) -> Account {
        Account::builder()
            .with_address(&format!("address#{}", n))
            .with_public_key(&[n])
            .build()
            .unwrap()
    }

    fn statuses(chains: &[&str]) -> ConnectionStatuses {
        chains
            .iter()
            .map(|c| (c.to_string(), ConnectionStatus::Connected))
            .collect()
    }

    fn accounts_by_chain(entries: Vec<(&str, Vec<Account>)>) -> AccountsByChainId {
        entries
            .into_iter()
            .map(|(c, accounts)| (c.to_string(), accounts))
            .collect()
    }

    fn expected(
        connection_statuses: ConnectionStatuses,
        accounts: AccountsByChainId,
        error: Option<WalletError>,
    ) -> WalletState {
        WalletState {
            connection_statuses,
            accounts,
            error,
        }
    }

    #[tokio::test]
    async fn test_gateway_error_when_not_registered() {
        let f = init();
        f.registry.clear();

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                ConnectionStatuses::new(),
                AccountsByChainId::new(),
                Some(WalletError::Gateway("gateway#1".to_string()))
            )
        );
        let error = f.store.snapshot().await.error.unwrap();
        assert_eq!(
            error.to_string(),
            "No gateway was found with this wallet id: gateway#1"
        );
    }

    #[tokio::test]
    async fn test_connection_error_when_not_available() {
        let f = init();
        f.gateway.set_available(false);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                ConnectionStatuses::new(),
                AccountsByChainId::new(),
                Some(WalletError::Connection)
            )
        );
    }

    #[tokio::test]
    async fn test_connection_error_when_not_connected() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(false);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                ConnectionStatuses::new(),
                AccountsByChainId::new(),
                Some(WalletError::Connection)
            )
        );
        assert!(!f.gateway.is_chain_enabled(CHAIN_ID_1));
    }

    #[tokio::test]
    async fn test_no_events_when_connection_fails() {
        let f = init();
        let mut connected = f.bus.subscribe(EventFilter::topic(WALLET_CONNECTED));
        let mut retrieved = f.bus.subscribe(EventFilter::topic(ACCOUNTS_RETRIEVED));
        f.gateway.set_available(true);
        f.gateway.set_connected(false);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;
        f.registry.clear();
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert!(connected.drain().is_empty());
        assert!(retrieved.drain().is_empty());
        assert_eq!(f.bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_single_chain_single_account() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1]),
                accounts_by_chain(vec![(CHAIN_ID_1, vec![account(1)])]),
                None
            )
        );
    }

    #[tokio::test]
    async fn test_single_chain_multiple_accounts() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1), account(2)]);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1]),
                accounts_by_chain(vec![(CHAIN_ID_1, vec![account(1), account(2)])]),
                None
            )
        );
    }

    #[tokio::test]
    async fn test_multiple_chains_sequential() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1), account(2)]);
        f.gateway.set_accounts(CHAIN_ID_2, vec![account(3)]);

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_2).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1, CHAIN_ID_2]),
                accounts_by_chain(vec![
                    (CHAIN_ID_1, vec![account(1), account(2)]),
                    (CHAIN_ID_2, vec![account(3)]),
                ]),
                None
            )
        );
    }

    #[tokio::test]
    async fn test_multiple_chains_interleaved() {
        let f = init();
        let gateway = Arc::new(YieldingGateway::new());
        gateway.set_accounts(CHAIN_ID_1, vec![account(1), account(2)]);
        gateway.set_accounts(CHAIN_ID_2, vec![account(3)]);
        f.registry.register(gateway.clone());

        futures_util::future::join(
            f.use_case.enable_wallet("yielding", CHAIN_ID_1),
            f.use_case.enable_wallet("yielding", CHAIN_ID_2),
        )
        .await;

        assert_eq!(
            gateway.calls(),
            vec![
                "connect chainId#1",
                "connect chainId#2",
                "accounts chainId#1",
                "accounts chainId#2",
            ]
        );
        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1, CHAIN_ID_2]),
                accounts_by_chain(vec![
                    (CHAIN_ID_1, vec![account(1), account(2)]),
                    (CHAIN_ID_2, vec![account(3)]),
                ]),
                None
            )
        );
    }

    #[tokio::test]
    async fn test_interleaved_failure_keeps_other_chain() {
        let f = init();
        let gateway = Arc::new(YieldingGateway::new());
        gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);
        gateway.set_accounts(CHAIN_ID_2, vec![account(3)]);
        f.registry.register(gateway.clone());
        f.use_case.enable_wallet("yielding", CHAIN_ID_1).await;

        gateway.set_accounts(CHAIN_ID_1, vec![account(2)]);
        gateway.reject(CHAIN_ID_1);
        let mut retrieved = f.bus.subscribe(EventFilter::topic(ACCOUNTS_RETRIEVED));

        futures_util::future::join(
            f.use_case.enable_wallet("yielding", CHAIN_ID_1),
            f.use_case.enable_wallet("yielding", CHAIN_ID_2),
        )
        .await;

        let state = f.store.snapshot().await;
        assert_eq!(state.connection_statuses, statuses(&[CHAIN_ID_1, CHAIN_ID_2]));
        assert_eq!(state.accounts[CHAIN_ID_1], vec![account(1)]);
        assert_eq!(state.accounts[CHAIN_ID_2], vec![account(3)]);

        let events: Vec<WalletEvent> = retrieved.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![WalletEvent::AccountsRetrieved {
                chain_id: CHAIN_ID_2.to_string(),
                accounts: vec![account(3)],
            }]
        );
    }

    #[tokio::test]
    async fn test_accounts_retrieved_event() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);
        let mut retrieved = f.bus.subscribe(EventFilter::topic(ACCOUNTS_RETRIEVED));

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        let events: Vec<WalletEvent> = retrieved.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![WalletEvent::AccountsRetrieved {
                chain_id: CHAIN_ID_1.to_string(),
                accounts: vec![account(1)],
            }]
        );
    }

    #[tokio::test]
    async fn test_events_published_in_order() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        let mut all = f.bus.subscribe(EventFilter::all());

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        let topics: Vec<&str> = all.drain().iter().map(|e| e.topic()).collect();
        assert_eq!(topics, vec![ACCOUNTS_RETRIEVED, WALLET_CONNECTED]);
        assert_eq!(
            f.store.snapshot().await.accounts[CHAIN_ID_1],
            Vec::<Account>::new()
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_other_chains() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        f.gateway.set_connected(false);
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_2).await;
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1]),
                accounts_by_chain(vec![(CHAIN_ID_1, vec![account(1)])]),
                Some(WalletError::Connection)
            )
        );
    }

    #[tokio::test]
    async fn test_reregistered_gateway_is_authoritative() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);

        let replacement = Arc::new(
            InMemoryWalletGateway::new("gateway#1")
                .with_available(true)
                .with_connected(true)
                .with_accounts(CHAIN_ID_1, vec![account(1)]),
        );
        f.registry.register(replacement.clone());

        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                statuses(&[CHAIN_ID_1]),
                accounts_by_chain(vec![(CHAIN_ID_1, vec![account(1)])]),
                None
            )
        );
        assert!(replacement.is_chain_enabled(CHAIN_ID_1));
        assert!(!f.gateway.is_chain_enabled(CHAIN_ID_1));
    }

    #[tokio::test]
    async fn test_unregister_is_seen_by_next_call() {
        let f = init();
        f.gateway.set_available(true);
        f.gateway.set_connected(true);
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_1).await;

        f.registry.unregister("gateway#1");
        f.use_case.enable_wallet("gateway#1", CHAIN_ID_2).await;

        let state = f.store.snapshot().await;
        assert_eq!(state.connection_statuses, statuses(&[CHAIN_ID_1]));
        assert_eq!(
            state.error,
            Some(WalletError::gateway_not_found("gateway#1"))
        );
    }

    struct FailingGateway;

    #[async_trait]
    impl WalletGateway for FailingGateway {
        fn id(&self) -> &str {
            "failing"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn connect(&self, _chain_id: &str) -> Result<(), WalletError> {
            Ok(())
        }

        async fn get_accounts(&self, chain_id: &str) -> Result<Vec<Account>, WalletError> {
            Err(WalletError::Provider(format!("chain {} rejected", chain_id)))
        }
    }

    /// Suspends inside `connect` and `get_accounts`, recording each call
    struct YieldingGateway {
        accounts: Mutex<HashMap<String, Vec<Account>>>,
        rejected: Mutex<HashSet<String>>,
        calls: Mutex<Vec<String>>,
    }

    impl YieldingGateway {
        fn new() -> Self {
            Self {
                accounts: Mutex::new(HashMap::new()),
                rejected: Mutex::new(HashSet::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn set_accounts(&self, chain_id: &str, accounts: Vec<Account>) {
            self.accounts
                .lock()
                .unwrap()
                .insert(chain_id.to_string(), accounts);
        }

        fn reject(&self, chain_id: &str) {
            self.rejected.lock().unwrap().insert(chain_id.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl WalletGateway for YieldingGateway {
        fn id(&self) -> &str {
            "yielding"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn connect(&self, chain_id: &str) -> Result<(), WalletError> {
            self.record(format!("connect {}", chain_id));
            tokio::task::yield_now().await;

            if self.rejected.lock().unwrap().contains(chain_id) {
                return Err(WalletError::Provider(format!("chain {} refused", chain_id)));
            }
            Ok(())
        }

        async fn get_accounts(&self, chain_id: &str) -> Result<Vec<Account>, WalletError> {
            self.record(format!("accounts {}", chain_id));
            tokio::task::yield_now().await;

            let accounts = self.accounts.lock().unwrap().get(chain_id).cloned();
            Ok(accounts.unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_captured() {
        let f = init();
        f.registry.register(Arc::new(FailingGateway));
        let mut all = f.bus.subscribe(EventFilter::all());

        f.use_case.enable_wallet("failing", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                ConnectionStatuses::new(),
                AccountsByChainId::new(),
                Some(WalletError::Provider("chain chainId#1 rejected".to_string()))
            )
        );
        assert!(all.drain().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_is_captured() {
        let f = init();
        let gateway = Arc::new(YieldingGateway::new());
        gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);
        gateway.reject(CHAIN_ID_1);
        f.registry.register(gateway.clone());
        let mut all = f.bus.subscribe(EventFilter::all());

        f.use_case.enable_wallet("yielding", CHAIN_ID_1).await;

        assert_eq!(
            f.store.snapshot().await,
            expected(
                ConnectionStatuses::new(),
                AccountsByChainId::new(),
                Some(WalletError::Provider("chain chainId#1 refused".to_string()))
            )
        );
        assert_eq!(gateway.calls(), vec!["connect chainId#1"]);
        assert!(all.drain().is_empty());
    }

    #[test]
    fn test_state_untouched_while_attempt_suspended() {
        let f = init();
        let gateway = Arc::new(YieldingGateway::new());
        gateway.set_accounts(CHAIN_ID_1, vec![account(1)]);
        f.registry.register(gateway.clone());

        let mut attempt = task::spawn(f.use_case.enable_wallet("yielding", CHAIN_ID_1));

        assert_pending!(attempt.poll());
        assert_eq!(gateway.calls(), vec!["connect chainId#1"]);
        assert_eq!(
            tokio_test::block_on(f.store.snapshot()),
            WalletState::default()
        );

        assert_pending!(attempt.poll());
        assert_eq!(
            gateway.calls(),
            vec!["connect chainId#1", "accounts chainId#1"]
        );
        assert_eq!(
            tokio_test::block_on(f.store.snapshot()),
            WalletState::default()
        );

        assert_ready!(attempt.poll());
        assert_eq!(
            tokio_test::block_on(f.store.snapshot()),
            expected(
                statuses(&[CHAIN_ID_1]),
                accounts_by_chain(vec![(CHAIN_ID_1, vec![account(1)])]),
                None
            )
        );
    }
}
