//! In-memory stand-in for the on-chain contract.
//!
//! [`SimChain`] implements the reader/writer/wallet capabilities over a
//! local pool registry so the whole client can be driven without a network —
//! the test suite and the CLI both run on it. It plays the *contract's*
//! role: settlement bookkeeping (share minting, constant-product swaps)
//! happens here, behind the capability seam, never in the client.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::codec::FixedPoint;
use crate::contract::{ContractReader, ContractWriter, PendingTransaction, TxHash};
use crate::error::{Error, Result};
use crate::wallet::WalletProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimPool {
    token0: Address,
    token1: Address,
    reserve0: FixedPoint,
    reserve1: FixedPoint,
    total_shares: FixedPoint,
    shares: HashMap<Address, FixedPoint>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChainState {
    nonce: u64,
    pools: Vec<SimPool>,
}

impl ChainState {
    /// Index of the pool holding this pair, in either order.
    fn find(&self, a: Address, b: Address) -> Option<usize> {
        self.pools.iter().position(|p| {
            (p.token0 == a && p.token1 == b) || (p.token0 == b && p.token1 == a)
        })
    }
}

/// Simulated chain with a single signing account.
///
/// Clones share the same underlying state, so one `SimChain` value can serve
/// as both the reader and the writer of a client.
#[derive(Clone)]
pub struct SimChain {
    state: Arc<Mutex<ChainState>>,
    state_file: Option<PathBuf>,
    signer: Address,
}

impl SimChain {
    pub fn new(signer: Address) -> Self {
        SimChain {
            state: Arc::new(Mutex::new(ChainState::default())),
            state_file: None,
            signer,
        }
    }

    /// Chain persisted to a JSON state file; starts empty if the file does
    /// not exist yet.
    pub fn with_state_file(path: impl AsRef<Path>, signer: Address) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => ChainState::default(),
            Err(e) => return Err(e),
        };
        Ok(SimChain {
            state: Arc::new(Mutex::new(state)),
            state_file: Some(path),
            signer,
        })
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    fn persist(&self, state: &ChainState) {
        let Some(path) = &self.state_file else { return };
        let write = || -> io::Result<()> {
            let raw = serde_json::to_string_pretty(state)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            std::fs::write(path, raw)
        };
        if let Err(e) = write() {
            log::warn!("could not persist sim chain state to {}: {e}", path.display());
        }
    }

    /// Run one mutation: bump the nonce, apply `mutate`, persist, and wrap
    /// the outcome in a pending handle. Reverts surface when the handle is
    /// awaited, like a mined-then-reverted transaction.
    fn transact<F>(&self, op: &str, mutate: F) -> Box<dyn PendingTransaction>
    where
        F: FnOnce(&mut ChainState) -> std::result::Result<(), String>,
    {
        let mut state = self.state.lock();
        state.nonce += 1;
        let mut seed = Vec::with_capacity(8 + 20 + op.len());
        seed.extend_from_slice(&state.nonce.to_be_bytes());
        seed.extend_from_slice(self.signer.as_slice());
        seed.extend_from_slice(op.as_bytes());
        let hash = keccak256(&seed);
        let result = mutate(&mut state).map_err(Error::TransactionFailed);
        if result.is_ok() {
            self.persist(&state);
        }
        Box::new(SimPendingTx { hash, result })
    }
}

struct SimPendingTx {
    hash: TxHash,
    result: Result<()>,
}

#[async_trait]
impl PendingTransaction for SimPendingTx {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self: Box<Self>) -> Result<()> {
        self.result
    }
}

// ─── Settlement math ──────────────────────────────────────────────────────────

/// Integer square root (Babylonian method).
fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::ZERO;
    }
    let mut x = n;
    let mut y = (x + U256::from(1)) >> 1;
    while y < x {
        x = y;
        y = (y + n / y) >> 1;
    }
    x
}

fn mul_div(a: U256, b: U256, denom: U256) -> std::result::Result<U256, String> {
    if denom.is_zero() {
        return Err("division by zero in pool math".into());
    }
    a.checked_mul(b)
        .map(|product| product / denom)
        .ok_or_else(|| "math overflow".into())
}

// ─── Capability implementations ───────────────────────────────────────────────

#[async_trait]
impl ContractReader for SimChain {
    async fn all_pool_pairs(&self) -> Result<Vec<(Address, Address)>> {
        let state = self.state.lock();
        Ok(state.pools.iter().map(|p| (p.token0, p.token1)).collect())
    }

    async fn pool_info(
        &self,
        token0: Address,
        token1: Address,
    ) -> Result<(FixedPoint, FixedPoint, FixedPoint)> {
        let state = self.state.lock();
        let idx = state
            .find(token0, token1)
            .ok_or(Error::PoolNotFound(token0, token1))?;
        let pool = &state.pools[idx];
        // Reserves are returned aligned with the caller's argument order.
        if pool.token0 == token0 {
            Ok((pool.reserve0, pool.reserve1, pool.total_shares))
        } else {
            Ok((pool.reserve1, pool.reserve0, pool.total_shares))
        }
    }

    async fn user_share(
        &self,
        account: Address,
        token0: Address,
        token1: Address,
    ) -> Result<FixedPoint> {
        let state = self.state.lock();
        let idx = state
            .find(token0, token1)
            .ok_or(Error::PoolNotFound(token0, token1))?;
        Ok(state.pools[idx]
            .shares
            .get(&account)
            .copied()
            .unwrap_or(FixedPoint::ZERO))
    }
}

#[async_trait]
impl ContractWriter for SimChain {
    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
    ) -> Result<Box<dyn PendingTransaction>> {
        Ok(self.transact("create_pool", |state| {
            if token0 == token1 {
                return Err("identical tokens".into());
            }
            // The contract is authoritative on duplicates, in either order.
            if state.find(token0, token1).is_some() {
                return Err("pool already exists".into());
            }
            state.pools.push(SimPool {
                token0,
                token1,
                reserve0: FixedPoint::ZERO,
                reserve1: FixedPoint::ZERO,
                total_shares: FixedPoint::ZERO,
                shares: HashMap::new(),
            });
            Ok(())
        }))
    }

    async fn add_liquidity(
        &self,
        token0: Address,
        token1: Address,
        amount0: FixedPoint,
        amount1: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>> {
        let signer = self.signer;
        Ok(self.transact("add_liquidity", move |state| {
            let idx = state.find(token0, token1).ok_or("unknown pool")?;
            let pool = &mut state.pools[idx];
            if amount0.is_zero() || amount1.is_zero() {
                return Err("zero amount".into());
            }
            // Map the caller's amounts onto the stored orientation.
            let (amt0, amt1) = if pool.token0 == token0 {
                (amount0.raw(), amount1.raw())
            } else {
                (amount1.raw(), amount0.raw())
            };

            // First deposit sets the price: shares = sqrt(a * b).
            // Later deposits mint proportionally to the smaller ratio.
            let minted = if pool.total_shares.is_zero() {
                isqrt(amt0.checked_mul(amt1).ok_or("math overflow")?)
            } else {
                let by0 = mul_div(amt0, pool.total_shares.raw(), pool.reserve0.raw())?;
                let by1 = mul_div(amt1, pool.total_shares.raw(), pool.reserve1.raw())?;
                by0.min(by1)
            };
            if minted.is_zero() {
                return Err("deposit too small".into());
            }

            pool.reserve0 = FixedPoint::from_raw(pool.reserve0.raw() + amt0);
            pool.reserve1 = FixedPoint::from_raw(pool.reserve1.raw() + amt1);
            pool.total_shares = FixedPoint::from_raw(pool.total_shares.raw() + minted);
            let entry = pool.shares.entry(signer).or_insert(FixedPoint::ZERO);
            *entry = FixedPoint::from_raw(entry.raw() + minted);
            Ok(())
        }))
    }

    async fn remove_liquidity(
        &self,
        token0: Address,
        token1: Address,
        shares: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>> {
        let signer = self.signer;
        Ok(self.transact("remove_liquidity", move |state| {
            let idx = state.find(token0, token1).ok_or("unknown pool")?;
            let pool = &mut state.pools[idx];
            let held = pool.shares.get(&signer).copied().unwrap_or(FixedPoint::ZERO);
            if shares.is_zero() || shares > held {
                return Err(format!(
                    "insufficient shares: burning {shares}, holding {held}"
                ));
            }

            let out0 = mul_div(shares.raw(), pool.reserve0.raw(), pool.total_shares.raw())?;
            let out1 = mul_div(shares.raw(), pool.reserve1.raw(), pool.total_shares.raw())?;

            pool.reserve0 = FixedPoint::from_raw(pool.reserve0.raw() - out0);
            pool.reserve1 = FixedPoint::from_raw(pool.reserve1.raw() - out1);
            pool.total_shares = FixedPoint::from_raw(pool.total_shares.raw() - shares.raw());
            let remaining = FixedPoint::from_raw(held.raw() - shares.raw());
            if remaining.is_zero() {
                pool.shares.remove(&signer);
            } else {
                pool.shares.insert(signer, remaining);
            }
            Ok(())
        }))
    }

    async fn swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: FixedPoint,
    ) -> Result<Box<dyn PendingTransaction>> {
        Ok(self.transact("swap", move |state| {
            let idx = state.find(token_in, token_out).ok_or("unknown pool")?;
            let pool = &mut state.pools[idx];
            if pool.reserve0.is_zero() || pool.reserve1.is_zero() {
                return Err("no liquidity".into());
            }
            if amount_in.is_zero() {
                return Err("zero amount".into());
            }

            let in_is_token0 = pool.token0 == token_in;
            let (r_in, r_out) = if in_is_token0 {
                (pool.reserve0.raw(), pool.reserve1.raw())
            } else {
                (pool.reserve1.raw(), pool.reserve0.raw())
            };

            // x·y = k: out = r_out · in / (r_in + in)
            let amt = amount_in.raw();
            let denom = r_in.checked_add(amt).ok_or("math overflow")?;
            let out = mul_div(r_out, amt, denom)?;
            if out.is_zero() {
                return Err("swap amount too small".into());
            }

            let (new_in, new_out) = (r_in + amt, r_out - out);
            if in_is_token0 {
                pool.reserve0 = FixedPoint::from_raw(new_in);
                pool.reserve1 = FixedPoint::from_raw(new_out);
            } else {
                pool.reserve0 = FixedPoint::from_raw(new_out);
                pool.reserve1 = FixedPoint::from_raw(new_in);
            }
            Ok(())
        }))
    }
}

#[async_trait]
impl WalletProvider for SimChain {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_account(&self) -> Result<Address> {
        Ok(self.signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    #[tokio::test]
    async fn lifecycle_create_add_swap_remove() {
        let chain = SimChain::new(addr(0xAA));
        let (t0, t1) = (addr(1), addr(2));

        chain.create_pool(t0, t1).await.unwrap().wait().await.unwrap();
        chain
            .add_liquidity(t0, t1, fp("100"), fp("400"))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let (r0, r1, total) = chain.pool_info(t0, t1).await.unwrap();
        assert_eq!(r0, fp("100"));
        assert_eq!(r1, fp("400"));
        assert_eq!(total, fp("200")); // sqrt(100 · 400)

        chain.swap(t0, t1, fp("100")).await.unwrap().wait().await.unwrap();
        let (r0, r1, _) = chain.pool_info(t0, t1).await.unwrap();
        assert_eq!(r0, fp("200"));
        assert_eq!(r1, fp("200")); // 400 · 100 / (100 + 100)

        let held = chain.user_share(addr(0xAA), t0, t1).await.unwrap();
        chain
            .remove_liquidity(t0, t1, held)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        let (r0, r1, total) = chain.pool_info(t0, t1).await.unwrap();
        assert!(r0.is_zero() && r1.is_zero() && total.is_zero());
    }

    #[tokio::test]
    async fn duplicate_create_reverts_in_either_order() {
        let chain = SimChain::new(addr(0xAA));
        let (t0, t1) = (addr(1), addr(2));
        chain.create_pool(t0, t1).await.unwrap().wait().await.unwrap();

        let err = chain.create_pool(t1, t0).await.unwrap().wait().await.unwrap_err();
        assert!(matches!(err, Error::TransactionFailed(_)));
    }

    #[tokio::test]
    async fn removing_more_than_held_reverts() {
        let chain = SimChain::new(addr(0xAA));
        let (t0, t1) = (addr(1), addr(2));
        chain.create_pool(t0, t1).await.unwrap().wait().await.unwrap();
        chain
            .add_liquidity(t0, t1, fp("4"), fp("9"))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let err = chain
            .remove_liquidity(t0, t1, fp("1000"))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransactionFailed(_)));
    }

    #[test]
    fn isqrt_matches_perfect_squares() {
        assert_eq!(isqrt(U256::ZERO), U256::ZERO);
        assert_eq!(isqrt(U256::from(1)), U256::from(1));
        assert_eq!(isqrt(U256::from(144)), U256::from(12));
        assert_eq!(isqrt(U256::from(145)), U256::from(12));
    }
}
