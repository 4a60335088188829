//! [`DexClient`] — the surface UI collaborators talk to.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::watch;

use crate::contract::{ContractReader, ContractWriter};
use crate::coordinator::{Coordinator, OperationOutcome, OperationRequest};
use crate::directory::TokenDirectory;
use crate::error::{Error, Result};
use crate::snapshot::{RegistrySnapshot, SnapshotCache};
use crate::wallet::WalletProvider;

/// Client for one DEX Platform deployment.
///
/// Wires the token directory, the snapshot cache, and the operation
/// coordinator over a pair of contract capabilities. All pool discovery
/// goes through [`DexClient::snapshot`]; all mutations go through the
/// operation methods, which validate first and trigger exactly one registry
/// refresh after a confirmed transaction.
///
/// ```rust,no_run
/// # use dexplatform_sdk::{DexClient, SimChain, StaticWallet};
/// # use alloy_primitives::Address;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let account = Address::from([0x11; 20]);
/// let chain = SimChain::new(account);
/// let mut client = DexClient::new(chain.clone(), chain);
/// client.connect(&StaticWallet::new(account)).await?;
///
/// let tokens = client.directory().tokens().to_vec();
/// let (weth, dai) = (tokens[0].address, tokens[1].address);
/// client.create_pool(weth, dai).await?;
/// client.add_liquidity(weth, "10", dai, "25000").await?;
/// println!("pools: {}", client.snapshot().pools().len());
/// # Ok(())
/// # }
/// ```
pub struct DexClient<R, W> {
    reader: R,
    coordinator: Coordinator<W>,
    directory: TokenDirectory,
    cache: Arc<SnapshotCache>,
    account: Option<Address>,
}

impl<R, W> DexClient<R, W>
where
    R: ContractReader,
    W: ContractWriter,
{
    /// Client with the built-in token directory and no connected account.
    pub fn new(reader: R, writer: W) -> Self {
        DexClient {
            reader,
            coordinator: Coordinator::new(writer),
            directory: TokenDirectory::builtin(),
            cache: Arc::new(SnapshotCache::new()),
            account: None,
        }
    }

    /// Replace the token directory (custom deployments, tests).
    pub fn with_directory(mut self, directory: TokenDirectory) -> Self {
        self.directory = directory;
        self
    }

    // ── Session ──────────────────────────────────────────────────────────────

    /// Connect through a wallet provider and load the first snapshot for the
    /// account.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionFailed`] when no provider is available or the
    /// user rejects the request.
    pub async fn connect<P: WalletProvider>(&mut self, wallet: &P) -> Result<Address> {
        if !wallet.is_available() {
            return Err(Error::TransactionFailed("no wallet provider found".into()));
        }
        let account = wallet.request_account().await?;
        self.account = Some(account);
        log::info!("wallet connected: {account}");
        if let Err(e) = self.refresh().await {
            log::warn!("initial snapshot fetch after connect failed: {e}");
        }
        Ok(account)
    }

    /// Drop the session. Positions disappear from the next snapshot.
    pub fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            log::info!("wallet disconnected: {account}");
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn directory(&self) -> &TokenDirectory {
        &self.directory
    }

    // ── Registry reads ───────────────────────────────────────────────────────

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.cache.current()
    }

    /// Re-fetch pools (and positions, when connected) from the contract.
    pub async fn refresh(&self) -> Result<Arc<RegistrySnapshot>> {
        self.cache.refresh(&self.reader, self.account).await
    }

    /// Generation counter bumped on every published snapshot — subscribe to
    /// re-render after confirmed mutations.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Create a pool for a token pair that does not exist yet.
    pub async fn create_pool(&self, token_a: Address, token_b: Address) -> Result<OperationOutcome> {
        self.validate_and_submit(OperationRequest::CreatePool { token_a, token_b })
            .await
    }

    /// Deposit both tokens into an existing pool. Amounts are decimal
    /// strings; each stays with its token if the pair is reordered.
    pub async fn add_liquidity(
        &self,
        token_a: Address,
        amount_a: &str,
        token_b: Address,
        amount_b: &str,
    ) -> Result<OperationOutcome> {
        self.validate_and_submit(OperationRequest::AddLiquidity {
            token_a,
            token_b,
            amount_a: amount_a.into(),
            amount_b: amount_b.into(),
        })
        .await
    }

    /// Burn liquidity shares and withdraw the proportional reserves.
    pub async fn remove_liquidity(
        &self,
        token0: Address,
        token1: Address,
        shares: &str,
    ) -> Result<OperationOutcome> {
        self.validate_and_submit(OperationRequest::RemoveLiquidity {
            token0,
            token1,
            shares: shares.into(),
        })
        .await
    }

    /// Swap `amount_in` of `token_in` for `token_out`.
    pub async fn swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &str,
    ) -> Result<OperationOutcome> {
        self.validate_and_submit(OperationRequest::Swap {
            token_in,
            token_out,
            amount_in: amount_in.into(),
        })
        .await
    }

    /// Run any operation through the coordinator, then trigger the one-shot
    /// post-confirmation refresh.
    ///
    /// A refresh failure does not fail the operation — the mutation is
    /// already confirmed on-chain; the stale snapshot stays authoritative
    /// until the next refresh succeeds.
    pub async fn validate_and_submit(
        &self,
        request: OperationRequest,
    ) -> Result<OperationOutcome> {
        let snapshot = self.cache.current();
        let outcome = self.coordinator.validate_and_submit(&snapshot, request).await?;
        if let Err(e) = self.refresh().await {
            log::warn!("post-{} refresh failed: {e}", outcome.kind);
        }
        Ok(outcome)
    }
}
