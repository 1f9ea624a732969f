//! Unsigned fixed-point primitives
//!
//! All amounts are non-negative integers with 8 implied decimals. Products
//! are formed in 512 bits so that no intermediate can wrap; a result that
//! does not fit back into an [`Amount`] is an error.

use crate::error::{MathError, MathResult};
use types::{Amount, NATIVE_DECIMALS};
use uint::construct_uint;

construct_uint! {
    /// 512-bit unsigned integer for intermediate products
    pub struct U512(8);
}

#[inline]
pub fn wide(x: Amount) -> U512 {
    U512::from(x)
}

/// Narrow a 512-bit result back to an amount
pub fn narrow(x: U512, context: &'static str) -> MathResult<Amount> {
    if x > U512::from(Amount::MAX) {
        return Err(MathError::Overflow(context));
    }
    Ok(x.low_u128())
}

pub fn add(a: Amount, b: Amount) -> MathResult<Amount> {
    a.checked_add(b).ok_or(MathError::Overflow("add"))
}

/// Subtraction that floors at zero
#[inline]
pub fn safe_sub(a: Amount, b: Amount) -> Amount {
    a.saturating_sub(b)
}

pub fn mul(a: Amount, b: Amount) -> MathResult<Amount> {
    a.checked_mul(b).ok_or(MathError::Overflow("mul"))
}

/// Integer division truncating toward zero
pub fn quo(a: Amount, b: Amount) -> MathResult<Amount> {
    if b == 0 {
        return Err(MathError::DivisionByZero("quo"));
    }
    Ok(a / b)
}

/// `floor(amount * part / total)`, zero when part or total is zero
///
/// `part` is not clamped, so the result may exceed `amount`.
pub fn get_share(part: Amount, total: Amount, amount: Amount) -> MathResult<Amount> {
    if part == 0 || total == 0 {
        return Ok(0);
    }
    narrow(wide(amount) * wide(part) / wide(total), "get_share")
}

/// As [`get_share`], with `part` clamped to `total`
pub fn get_safe_share(part: Amount, total: Amount, amount: Amount) -> MathResult<Amount> {
    get_share(part.min(total), total, amount)
}

/// Which share form a protocol version uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    Uncapped,
    Capped,
}

impl ShareMode {
    pub fn share(self, part: Amount, total: Amount, amount: Amount) -> MathResult<Amount> {
        match self {
            Self::Uncapped => get_share(part, total, amount),
            Self::Capped => get_safe_share(part, total, amount),
        }
    }
}

/// Truncate an 8-decimal amount to the precision of an external chain
pub fn round_to_decimals(amount: Amount, decimals: u8) -> Amount {
    if decimals == 0 || decimals >= NATIVE_DECIMALS {
        return amount;
    }
    let precision = 10u128.pow(u32::from(NATIVE_DECIMALS - decimals));
    amount / precision * precision
}
