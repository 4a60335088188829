//! DEX Platform Rust SDK
//!
//! Pool registry and transaction coordination client for an on-chain AMM.
//! The contract owns the bonding curve, the reserves, and settlement; this
//! SDK canonicalizes token pairs, validates operations against the current
//! registry snapshot, submits the matching contract call, and refreshes the
//! snapshot once the transaction confirms.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use alloy_primitives::Address;
//! use dexplatform_sdk::{DexClient, SimChain, StaticWallet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The simulated backend stands in for the on-chain contract.
//!     let account = Address::from([0x11; 20]);
//!     let chain = SimChain::new(account);
//!     let mut client = DexClient::new(chain.clone(), chain);
//!     client.connect(&StaticWallet::new(account)).await?;
//!
//!     let tokens = client.directory().tokens().to_vec();
//!     let (weth, dai) = (tokens[0].address, tokens[1].address);
//!
//!     // 1. Create the pool, then seed it.
//!     client.create_pool(weth, dai).await?;
//!     client.add_liquidity(weth, "10", dai, "25000").await?;
//!
//!     // 2. Swap against it. Pair order never matters for discovery.
//!     let outcome = client.swap(dai, weth, "250").await?;
//!     println!("swapped in tx {}", outcome.tx_hash);
//!
//!     // 3. The snapshot was refreshed after each confirmed operation.
//!     for pool in client.snapshot().pools() {
//!         println!("{}: {} / {}", pool.pair, pool.reserve0, pool.reserve1);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`DexClient::create_pool`] | Create a pool for a not-yet-registered pair |
//! | [`DexClient::add_liquidity`] | Deposit both tokens of an existing pool |
//! | [`DexClient::remove_liquidity`] | Burn shares, withdraw reserves |
//! | [`DexClient::swap`] | Swap an input amount through an existing pool |
//! | [`DexClient::snapshot`] | Current pools + connected account's positions |
//! | [`DexClient::refresh`] | Re-fetch the registry atomically |
//! | [`DexClient::subscribe`] | Change signal for UI re-rendering |

pub mod client;
pub mod codec;
pub mod contract;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod pair;
pub mod sim;
pub mod snapshot;
pub mod wallet;

pub use client::DexClient;
pub use codec::FixedPoint;
pub use contract::{ContractReader, ContractWriter, PendingTransaction, TxHash};
pub use coordinator::{OperationKind, OperationOutcome, OperationPhase, OperationRequest};
pub use directory::{TokenDirectory, TokenRef};
pub use error::{Error, Result};
pub use pair::PairKey;
pub use sim::SimChain;
pub use snapshot::{PoolRecord, RegistrySnapshot, SnapshotCache, UserPosition};
pub use wallet::{NoWallet, StaticWallet, WalletProvider};
