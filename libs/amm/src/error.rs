//! Math errors

use thiserror::Error;

pub type MathResult<T> = Result<T, MathError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Pool would have zero depth on one side after the deposit
    #[error("total {side} in the pool is zero")]
    EmptyPool { side: &'static str },

    #[error("pool units can't be zero")]
    ZeroPoolUnits,

    #[error("pool rune balance can't be zero")]
    ZeroPoolRune,

    #[error("pool asset balance can't be zero")]
    ZeroPoolAsset,

    #[error("liquidity provider units can't be zero")]
    ZeroMemberUnits,

    #[error("withdraw basis points {0} is not valid")]
    InvalidBasisPoints(u64),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
}
