//! Registry snapshot cache: the client's one piece of shared mutable state.
//!
//! A snapshot is a consistent read of every pool (and, with a connected
//! account, every non-zero position) at one point in time. It is replaced
//! wholesale on refresh and never patched, so readers can never observe a
//! half-updated registry.

use std::sync::Arc;

use alloy_primitives::Address;
use futures::future::try_join_all;
use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};

use crate::codec::FixedPoint;
use crate::contract::ContractReader;
use crate::error::{Error, Result};
use crate::pair::PairKey;

/// One pool as last observed. Reserves are aligned to the canonical pair
/// order: `reserve0` always belongs to `pair.token0()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRecord {
    pub pair: PairKey,
    pub reserve0: FixedPoint,
    pub reserve1: FixedPoint,
    pub total_shares: FixedPoint,
}

/// The connected account's stake in one pool. Zero-share entries are
/// filtered out before a snapshot is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPosition {
    pub pair: PairKey,
    pub shares: FixedPoint,
}

/// Immutable, atomically replaced view of the registry.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    pools: Vec<PoolRecord>,
    positions: Vec<UserPosition>,
    account: Option<Address>,
}

impl RegistrySnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pools(&self) -> &[PoolRecord] {
        &self.pools
    }

    /// Non-zero positions of [`RegistrySnapshot::account`].
    pub fn positions(&self) -> &[UserPosition] {
        &self.positions
    }

    /// The account the positions belong to, if one was connected at fetch
    /// time.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Whether a pool exists for `key`. The only existence check in the
    /// client — all comparison goes through canonical [`PairKey`] equality.
    pub fn contains(&self, key: &PairKey) -> bool {
        self.find(key).is_some()
    }

    pub fn find(&self, key: &PairKey) -> Option<&PoolRecord> {
        self.pools.iter().find(|p| p.pair == *key)
    }

    pub fn position(&self, key: &PairKey) -> Option<&UserPosition> {
        self.positions.iter().find(|p| p.pair == *key)
    }
}

/// Holder of the current [`RegistrySnapshot`].
///
/// Single writer ([`SnapshotCache::refresh`]), many readers
/// ([`SnapshotCache::current`]). Each successful refresh bumps a generation
/// counter observable through [`SnapshotCache::subscribe`] — the explicit
/// "refresh needed" signal UI collaborators re-render on.
pub struct SnapshotCache {
    current: RwLock<Arc<RegistrySnapshot>>,
    generation: watch::Sender<u64>,
    refresh_serial: Mutex<()>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        SnapshotCache {
            current: RwLock::new(Arc::new(RegistrySnapshot::empty())),
            generation,
            refresh_serial: Mutex::new(()),
        }
    }

    /// The latest published snapshot. Cheap; never blocks on a refresh.
    pub fn current(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Watch the publish generation. The receiver's value changes once per
    /// successful refresh, never on a failed one.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Re-fetch the whole registry and replace the cached snapshot.
    ///
    /// Fetches the pair list, then fans out one detail future per pair
    /// (reserves/shares plus, when `account` is present, that account's
    /// stake). The new snapshot is published only after every fetch
    /// succeeded; on any failure the previous snapshot is retained and
    /// [`Error::SnapshotFetchFailed`] is returned.
    pub async fn refresh<R>(
        &self,
        reader: &R,
        account: Option<Address>,
    ) -> Result<Arc<RegistrySnapshot>>
    where
        R: ContractReader + ?Sized,
    {
        // One refresh at a time; readers are unaffected.
        let _serial = self.refresh_serial.lock().await;

        let fetch = |e: Error| match e {
            Error::SnapshotFetchFailed(reason) => Error::SnapshotFetchFailed(reason),
            other => Error::SnapshotFetchFailed(other.to_string()),
        };

        let pairs = reader.all_pool_pairs().await.map_err(fetch)?;
        let details = try_join_all(pairs.into_iter().map(|(a, b)| async move {
            let key = PairKey::new(a, b)?;
            let (r0, r1, total_shares) = reader.pool_info(a, b).await?;
            // The contract reported (a, b); align reserves with the
            // canonical order before storing.
            let (reserve0, reserve1) = if key.token0() == a { (r0, r1) } else { (r1, r0) };
            let stake = match account {
                Some(acct) => {
                    Some(reader.user_share(acct, key.token0(), key.token1()).await?)
                }
                None => None,
            };
            Ok::<_, Error>((
                PoolRecord { pair: key, reserve0, reserve1, total_shares },
                stake,
            ))
        }))
        .await
        .map_err(fetch)?;

        let mut pools = Vec::with_capacity(details.len());
        let mut positions = Vec::new();
        for (record, stake) in details {
            if let Some(shares) = stake {
                if !shares.is_zero() {
                    positions.push(UserPosition { pair: record.pair, shares });
                }
            }
            pools.push(record);
        }

        let snapshot = Arc::new(RegistrySnapshot { pools, positions, account });
        *self.current.write() = Arc::clone(&snapshot);
        self.generation.send_modify(|g| *g += 1);
        log::debug!(
            "registry snapshot refreshed: {} pools, {} positions",
            snapshot.pools.len(),
            snapshot.positions.len()
        );
        Ok(snapshot)
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    /// Reader over a fixed pool set; optionally fails the second
    /// `pool_info` call to exercise partial-fetch failure.
    struct FixtureReader {
        pairs: Vec<(Address, Address)>,
        shares_for_account: FixedPoint,
        fail_detail: AtomicBool,
    }

    impl FixtureReader {
        fn new(pairs: Vec<(Address, Address)>) -> Self {
            FixtureReader {
                pairs,
                shares_for_account: FixedPoint::ZERO,
                fail_detail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ContractReader for FixtureReader {
        async fn all_pool_pairs(&self) -> Result<Vec<(Address, Address)>> {
            Ok(self.pairs.clone())
        }

        async fn pool_info(
            &self,
            token0: Address,
            _token1: Address,
        ) -> Result<(FixedPoint, FixedPoint, FixedPoint)> {
            if self.fail_detail.load(Ordering::SeqCst) && token0 == self.pairs[1].0 {
                return Err(Error::SnapshotFetchFailed("detail fetch timed out".into()));
            }
            Ok((fp("100"), fp("200"), fp("50")))
        }

        async fn user_share(
            &self,
            _account: Address,
            _token0: Address,
            _token1: Address,
        ) -> Result<FixedPoint> {
            Ok(self.shares_for_account)
        }
    }

    #[tokio::test]
    async fn existence_is_order_independent() {
        let cache = SnapshotCache::new();
        let reader = FixtureReader::new(vec![(addr(2), addr(1))]);
        cache.refresh(&reader, None).await.unwrap();

        let snap = cache.current();
        assert!(snap.contains(&PairKey::new(addr(1), addr(2)).unwrap()));
        assert!(snap.contains(&PairKey::new(addr(2), addr(1)).unwrap()));
        assert!(!snap.contains(&PairKey::new(addr(1), addr(3)).unwrap()));
    }

    #[tokio::test]
    async fn reserves_align_with_canonical_order() {
        let cache = SnapshotCache::new();
        // Registry stores the pair reversed: (high, low).
        let reader = FixtureReader::new(vec![(addr(2), addr(1))]);
        cache.refresh(&reader, None).await.unwrap();

        let snap = cache.current();
        let record = snap.find(&PairKey::new(addr(1), addr(2)).unwrap()).unwrap();
        // pool_info returned (100, 200) for (addr2, addr1), so canonical
        // token0 = addr1 owns the 200 side.
        assert_eq!(record.reserve0, fp("200"));
        assert_eq!(record.reserve1, fp("100"));
    }

    #[tokio::test]
    async fn failed_detail_fetch_keeps_previous_snapshot() {
        let cache = SnapshotCache::new();
        let reader = FixtureReader::new(vec![(addr(1), addr(2)), (addr(3), addr(4))]);
        let first = cache.refresh(&reader, None).await.unwrap();
        let mut generations = cache.subscribe();
        generations.mark_unchanged();

        reader.fail_detail.store(true, Ordering::SeqCst);
        let err = cache.refresh(&reader, None).await.unwrap_err();
        assert!(matches!(err, Error::SnapshotFetchFailed(_)));

        // Previous snapshot retained, no publish signalled.
        assert!(Arc::ptr_eq(&cache.current(), &first));
        assert!(!generations.has_changed().unwrap());
    }

    #[tokio::test]
    async fn zero_share_positions_are_filtered() {
        let cache = SnapshotCache::new();
        let mut reader = FixtureReader::new(vec![(addr(1), addr(2))]);
        reader.shares_for_account = FixedPoint::ZERO;
        cache.refresh(&reader, Some(addr(9))).await.unwrap();
        assert!(cache.current().positions().is_empty());

        reader.shares_for_account = fp("5");
        cache.refresh(&reader, Some(addr(9))).await.unwrap();
        let snap = cache.current();
        assert_eq!(snap.positions().len(), 1);
        assert_eq!(snap.positions()[0].shares, fp("5"));
        assert_eq!(snap.account(), Some(addr(9)));
    }

    #[tokio::test]
    async fn each_successful_refresh_bumps_generation_once() {
        let cache = SnapshotCache::new();
        let reader = FixtureReader::new(vec![(addr(1), addr(2))]);
        let generations = cache.subscribe();
        assert_eq!(*generations.borrow(), 0);

        cache.refresh(&reader, None).await.unwrap();
        assert_eq!(*generations.borrow(), 1);
        cache.refresh(&reader, None).await.unwrap();
        assert_eq!(*generations.borrow(), 2);
    }
}
