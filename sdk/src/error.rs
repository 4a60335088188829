//! SDK error type.

use alloy_primitives::Address;

use crate::pair::PairKey;

/// All errors returned by the DEX Platform SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Input validation ─────────────────────────────────────────────────────
    /// A decimal amount string could not be converted to the contract's
    /// 18-decimal fixed-point scale, or was non-positive where the operation
    /// requires a positive value.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The two sides of a token pair resolve to the same address.
    #[error("Invalid pair: {0}")]
    InvalidPair(String),

    // ── Registry preconditions ───────────────────────────────────────────────
    /// CreatePool was asked for a pair that is already in the registry.
    #[error("Pool already exists for pair {0}")]
    PoolAlreadyExists(PairKey),

    /// AddLiquidity / Swap was asked for a pair with no registered pool.
    #[error("Pool not found for tokens {0} / {1}")]
    PoolNotFound(Address, Address),

    // ── Transaction lifecycle ────────────────────────────────────────────────
    /// The mutating call was rejected by the wallet, reverted by the
    /// contract, or failed to confirm. The reason is reported verbatim.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    // ── Snapshot refresh ─────────────────────────────────────────────────────
    /// A registry refresh failed partway; the previously cached snapshot is
    /// retained unchanged.
    #[error("Snapshot fetch failed: {0}")]
    SnapshotFetchFailed(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
