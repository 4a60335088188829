//! Operation coordinator: validation, submission, and confirmation for the
//! four state-changing operations.
//!
//! Each user-initiated operation walks one lifecycle:
//! `Idle → Validating → Submitting → Awaiting → Completed | Failed`.
//! Failures at any step return control to `Idle` with the error reported;
//! nothing is retried automatically. Validation runs against whatever
//! snapshot is current when the operation starts — the snapshot may be
//! stale, and the contract remains the final arbiter (a race that slips
//! past the client check surfaces as [`Error::TransactionFailed`]).

use std::fmt;

use alloy_primitives::Address;

use crate::codec::FixedPoint;
use crate::contract::{ContractWriter, TxHash};
use crate::error::{Error, Result};
use crate::pair::PairKey;
use crate::snapshot::RegistrySnapshot;

/// The four state-changing operations and their raw inputs.
///
/// Amounts arrive as the decimal strings the user typed; they only become
/// [`FixedPoint`] inside validation, so a malformed amount can never reach
/// the network.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    CreatePool {
        token_a: Address,
        token_b: Address,
    },
    AddLiquidity {
        token_a: Address,
        token_b: Address,
        amount_a: String,
        amount_b: String,
    },
    RemoveLiquidity {
        token0: Address,
        token1: Address,
        shares: String,
    },
    Swap {
        token_in: Address,
        token_out: Address,
        amount_in: String,
    },
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::CreatePool { .. } => OperationKind::CreatePool,
            OperationRequest::AddLiquidity { .. } => OperationKind::AddLiquidity,
            OperationRequest::RemoveLiquidity { .. } => OperationKind::RemoveLiquidity,
            OperationRequest::Swap { .. } => OperationKind::Swap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CreatePool,
    AddLiquidity,
    RemoveLiquidity,
    Swap,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::CreatePool => "create-pool",
            OperationKind::AddLiquidity => "add-liquidity",
            OperationKind::RemoveLiquidity => "remove-liquidity",
            OperationKind::Swap => "swap",
        };
        f.write_str(name)
    }
}

/// Lifecycle states of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    Validating,
    Submitting,
    Awaiting,
    Completed,
    Failed,
}

/// A successfully completed operation.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    pub pair: PairKey,
    pub tx_hash: TxHash,
}

/// Validated, canonicalized form of a request — everything `Submitting`
/// needs, with no strings left.
enum Plan {
    CreatePool {
        key: PairKey,
    },
    AddLiquidity {
        key: PairKey,
        amount0: FixedPoint,
        amount1: FixedPoint,
    },
    RemoveLiquidity {
        key: PairKey,
        shares: FixedPoint,
    },
    Swap {
        key: PairKey,
        token_in: Address,
        token_out: Address,
        amount_in: FixedPoint,
    },
}

impl Plan {
    fn key(&self) -> PairKey {
        match self {
            Plan::CreatePool { key }
            | Plan::AddLiquidity { key, .. }
            | Plan::RemoveLiquidity { key, .. }
            | Plan::Swap { key, .. } => *key,
        }
    }
}

/// Phase tracker for one in-flight operation.
struct Lifecycle {
    kind: OperationKind,
    phase: OperationPhase,
}

impl Lifecycle {
    fn start(kind: OperationKind) -> Self {
        Lifecycle { kind, phase: OperationPhase::Idle }
    }

    fn advance(&mut self, next: OperationPhase) {
        log::debug!("{}: {:?} -> {next:?}", self.kind, self.phase);
        self.phase = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        self.phase = OperationPhase::Failed;
        log::warn!("{} failed: {err}", self.kind);
        err
    }
}

/// Runs operations against a [`ContractWriter`].
///
/// Holds no state between operations; concurrent operations each get their
/// own lifecycle and validate against the snapshot handed to them.
pub struct Coordinator<W> {
    writer: W,
}

impl<W: ContractWriter> Coordinator<W> {
    pub fn new(writer: W) -> Self {
        Coordinator { writer }
    }

    /// Validate `request` against `snapshot`, submit the corresponding
    /// contract call, and await finality.
    ///
    /// # Errors
    ///
    /// The full taxonomy: [`Error::InvalidAmount`] / [`Error::InvalidPair`]
    /// from input validation, [`Error::PoolAlreadyExists`] /
    /// [`Error::PoolNotFound`] from the registry preconditions (checked
    /// before anything touches the network), and
    /// [`Error::TransactionFailed`] from submission or confirmation.
    pub async fn validate_and_submit(
        &self,
        snapshot: &RegistrySnapshot,
        request: OperationRequest,
    ) -> Result<OperationOutcome> {
        let mut op = Lifecycle::start(request.kind());

        op.advance(OperationPhase::Validating);
        let plan = match validate(snapshot, request) {
            Ok(plan) => plan,
            Err(e) => return Err(op.fail(e)),
        };

        op.advance(OperationPhase::Submitting);
        let pending = match self.submit(&plan).await {
            Ok(pending) => pending,
            Err(e) => return Err(op.fail(e)),
        };
        let tx_hash = pending.hash();

        op.advance(OperationPhase::Awaiting);
        if let Err(e) = pending.wait().await {
            return Err(op.fail(e));
        }

        op.advance(OperationPhase::Completed);
        log::info!("{} confirmed: tx {tx_hash}", op.kind);
        Ok(OperationOutcome { kind: op.kind, pair: plan.key(), tx_hash })
    }

    /// Exactly one mutating call per operation kind.
    async fn submit(&self, plan: &Plan) -> Result<Box<dyn crate::contract::PendingTransaction>> {
        match plan {
            Plan::CreatePool { key } => {
                self.writer.create_pool(key.token0(), key.token1()).await
            }
            Plan::AddLiquidity { key, amount0, amount1 } => {
                self.writer
                    .add_liquidity(key.token0(), key.token1(), *amount0, *amount1)
                    .await
            }
            Plan::RemoveLiquidity { key, shares } => {
                self.writer
                    .remove_liquidity(key.token0(), key.token1(), *shares)
                    .await
            }
            Plan::Swap { token_in, token_out, amount_in, .. } => {
                self.writer.swap(*token_in, *token_out, *amount_in).await
            }
        }
    }
}

/// Precondition table, per operation kind:
///
/// | Kind            | Inputs                    | Registry precondition |
/// |-----------------|---------------------------|-----------------------|
/// | CreatePool      | distinct pair             | must NOT exist        |
/// | AddLiquidity    | distinct pair, amounts > 0| must exist            |
/// | RemoveLiquidity | distinct pair, shares > 0 | none                  |
/// | Swap            | distinct pair, amount > 0 | must exist            |
fn validate(snapshot: &RegistrySnapshot, request: OperationRequest) -> Result<Plan> {
    match request {
        OperationRequest::CreatePool { token_a, token_b } => {
            let key = PairKey::new(token_a, token_b)?;
            if snapshot.contains(&key) {
                return Err(Error::PoolAlreadyExists(key));
            }
            Ok(Plan::CreatePool { key })
        }
        OperationRequest::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
            let amount_a = FixedPoint::parse_positive(&amount_a)?;
            let amount_b = FixedPoint::parse_positive(&amount_b)?;
            let (key, amount0, amount1) =
                PairKey::new_with_amounts(token_a, amount_a, token_b, amount_b)?;
            if !snapshot.contains(&key) {
                return Err(Error::PoolNotFound(token_a, token_b));
            }
            Ok(Plan::AddLiquidity { key, amount0, amount1 })
        }
        OperationRequest::RemoveLiquidity { token0, token1, shares } => {
            let shares = FixedPoint::parse_positive(&shares)?;
            let key = PairKey::new(token0, token1)?;
            Ok(Plan::RemoveLiquidity { key, shares })
        }
        OperationRequest::Swap { token_in, token_out, amount_in } => {
            let amount_in = FixedPoint::parse_positive(&amount_in)?;
            let key = PairKey::new(token_in, token_out)?;
            if !snapshot.contains(&key) {
                return Err(Error::PoolNotFound(token_in, token_out));
            }
            Ok(Plan::Swap { key, token_in, token_out, amount_in })
        }
    }
}
