//! Liquidity ledger errors

use crate::ports::PortError;
use amm::MathError;
use thiserror::Error;
use types::{Amount, Asset, Chain, PoolStatus, ValidationError};

/// Coarse classification callers use to decide between rejecting the
/// inbound transaction and refunding it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    PoolState,
    InsufficientLiquidity,
    Lockup,
    Invariant,
    ExternalTransfer,
    Internal,
}

#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("intent failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("address does not match the liquidity provider record")]
    AddressMismatch,

    #[error("total liquidity RUNE {total} is more than the limit {limit}")]
    RuneOverLimit { total: Amount, limit: Amount },

    #[error("pool {0} doesn't exist")]
    PoolNotFound(Asset),

    #[error("pool {asset} is {status}")]
    PoolStatusInvalid { asset: Asset, status: PoolStatus },

    #[error("cannot add single sided liquidity while a pool is staged")]
    AsymmetricAddToStagedPool,

    #[error("pool cannot have zero rune or asset balance")]
    ZeroBalanceAfterAdd,

    #[error("you cannot withdraw: no liquidity units left")]
    NoLiquidityUnitsLeft,

    #[error("you cannot withdraw before block {unlock_height}")]
    WithinLockupPeriod { unlock_height: u64 },

    #[error("cannot withdraw 100% of only one side of the pool")]
    Invalid100PercentSingleSidedWithdraw,

    #[error("LP units cannot increase during a withdrawal: {before} --> {after}")]
    UnitsIncreased { before: Amount, after: Amount },

    #[error(transparent)]
    Math(#[from] MathError),

    #[error("fail to move imp loss protection rune from the reserve")]
    ExternalTransfer {
        #[source]
        source: PortError,
    },

    #[error("fail to get gas for chain {chain}")]
    GasUnavailable {
        chain: Chain,
        #[source]
        source: PortError,
    },

    #[error("store failure")]
    Store(#[from] PortError),
}

impl LiquidityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::AddressMismatch | Self::RuneOverLimit { .. } => {
                ErrorKind::Validation
            }
            Self::PoolNotFound(_)
            | Self::PoolStatusInvalid { .. }
            | Self::AsymmetricAddToStagedPool
            | Self::ZeroBalanceAfterAdd => ErrorKind::PoolState,
            Self::NoLiquidityUnitsLeft => ErrorKind::InsufficientLiquidity,
            Self::WithinLockupPeriod { .. } => ErrorKind::Lockup,
            Self::Invalid100PercentSingleSidedWithdraw | Self::UnitsIncreased { .. } => {
                ErrorKind::Invariant
            }
            Self::Math(err) => match err {
                MathError::EmptyPool { .. }
                | MathError::ZeroPoolUnits
                | MathError::ZeroPoolRune
                | MathError::ZeroPoolAsset => ErrorKind::PoolState,
                MathError::ZeroMemberUnits => ErrorKind::InsufficientLiquidity,
                MathError::InvalidBasisPoints(_) => ErrorKind::Validation,
                MathError::Overflow(_) | MathError::DivisionByZero(_) => ErrorKind::Internal,
            },
            Self::ExternalTransfer { .. } => ErrorKind::ExternalTransfer,
            Self::GasUnavailable { .. } | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LiquidityError::from(ValidationError::ZeroAmounts).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LiquidityError::WithinLockupPeriod { unlock_height: 5 }.kind(),
            ErrorKind::Lockup
        );
        assert_eq!(
            LiquidityError::from(MathError::EmptyPool { side: "RUNE" }).kind(),
            ErrorKind::PoolState
        );
        assert_eq!(
            LiquidityError::Invalid100PercentSingleSidedWithdraw.kind(),
            ErrorKind::Invariant
        );
        assert_eq!(
            LiquidityError::ExternalTransfer {
                source: PortError::Unavailable("reserve".into())
            }
            .kind(),
            ErrorKind::ExternalTransfer
        );
    }

    #[test]
    fn test_error_messages() {
        let err = LiquidityError::UnitsIncreased {
            before: 10,
            after: 12,
        };
        assert_eq!(
            err.to_string(),
            "LP units cannot increase during a withdrawal: 10 --> 12"
        );
    }
}
