//! The narrow contract capabilities the client consumes.
//!
//! The AMM's curve math, storage, and settlement live on-chain; the SDK only
//! ever reads state through [`ContractReader`] and submits mutations through
//! [`ContractWriter`]. Production backends wrap a node connection; tests and
//! the CLI use the in-memory [`crate::sim::SimChain`].

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::codec::FixedPoint;
use crate::error::Result;

/// Transaction identifier, as reported by the submitting backend.
pub type TxHash = B256;

/// Read-only view of the on-chain pool registry.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Every registered pool, as the contract stores it — pair order and
    /// address casing are the contract's choice, not canonicalized.
    async fn all_pool_pairs(&self) -> Result<Vec<(Address, Address)>>;

    /// `(reserve0, reserve1, total_shares)` for the pool registered under
    /// `(token0, token1)`, in the order given.
    async fn pool_info(
        &self,
        token0: Address,
        token1: Address,
    ) -> Result<(FixedPoint, FixedPoint, FixedPoint)>;

    /// `account`'s liquidity shares in the `(token0, token1)` pool.
    async fn user_share(
        &self,
        account: Address,
        token0: Address,
        token1: Address,
    ) -> Result<FixedPoint>;
}

/// A submitted, not-yet-final transaction.
///
/// [`PendingTransaction::wait`] resolves when the ledger reports finality.
/// There is no built-in timeout; wrap the future in `tokio::time::timeout`
/// if the caller needs one.
#[async_trait]
pub trait PendingTransaction: Send {
    fn hash(&self) -> TxHash;

    /// Block until the transaction is confirmed.
    ///
    /// # Errors
    ///
    /// [`crate::Error::TransactionFailed`] on revert or rejection, carrying
    /// the backend's reason verbatim.
    async fn wait(self: Box<Self>) -> Result<()>;
}

/// The four mutating calls, one per operation kind.
///
/// Addresses arrive already validated and — for `create_pool`,
/// `add_liquidity`, and `remove_liquidity` — in canonical (sorted) order;
/// `swap` is direction-sensitive and keeps the caller's order.
#[async_trait]
pub trait ContractWriter: Send + Sync {
    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
    ) -> Result<Box<dyn PendingTransaction>>;

    async fn add_liquidity(
        &self,
        token0: Address,
        token1: Address,
        amount0: FixedPoint,
        amount1: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>>;

    async fn remove_liquidity(
        &self,
        token0: Address,
        token1: Address,
        shares: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>>;

    async fn swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>>;
}
