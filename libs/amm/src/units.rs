//! Pool unit minting and withdrawal share math
//!
//! Two unit-minting formulas coexist so that historical blocks replay
//! bit-for-bit:
//!
//! - [`UnitFormula::SlipAdjusted`]: with `P` existing units, `R`/`A` depths
//!   before the add and `r`/`a` the deposit,
//!   `units = P(aR + Ar) / 2AR * (1 - |Ra - rA| / ((r + R)(a + A)))`.
//!   An empty side seeds the pool with `r` units.
//! - [`UnitFormula::DepthWeighted`]: with `R`/`A` the depths after the add,
//!   `units = (R + A)(rA + Ra) / 4RA`.
//!
//! Both are evaluated exactly and truncated once at the end.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{narrow, safe_sub, wide, ShareMode, U512};
use tracing::trace;
use types::{Amount, MAX_WITHDRAW_BASIS_POINTS};

/// Unit-minting formula variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFormula {
    SlipAdjusted,
    DepthWeighted,
}

/// Withdrawal share variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawFormula {
    /// Uncapped shares; protection units join the provider's position and
    /// are redeemed pro rata with it
    V1,
    /// Capped shares; protection units are claimed in full on top of the
    /// provider's redeemed units
    V84,
}

impl WithdrawFormula {
    pub fn share_mode(self) -> ShareMode {
        match self {
            Self::V1 => ShareMode::Uncapped,
            Self::V84 => ShareMode::Capped,
        }
    }
}

/// Which side(s) of the pool a withdrawal pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawSide {
    Both,
    Rune,
    Asset,
}

/// Result of minting units for a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUnits {
    pub pool_units: Amount,
    pub liquidity_units: Amount,
}

/// Result of a withdrawal share calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawShares {
    pub rune: Amount,
    pub asset: Amount,
    /// Units burned from the provider's own position
    pub units_claimed: Amount,
    pub units_remaining: Amount,
}

/// Pool unit calculator
pub struct PoolUnitCalculator;

impl PoolUnitCalculator {
    /// Mint units for a deposit of `add_rune` and `add_asset`
    ///
    /// # Arguments
    /// * `old_pool_units` - Total pool units before the deposit
    /// * `pool_rune` / `pool_asset` - Depths before the deposit
    /// * `add_rune` / `add_asset` - Committed deposit amounts
    pub fn calculate_pool_units(
        formula: UnitFormula,
        old_pool_units: Amount,
        pool_rune: Amount,
        pool_asset: Amount,
        add_rune: Amount,
        add_asset: Amount,
    ) -> MathResult<PoolUnits> {
        let total_rune = pool_rune
            .checked_add(add_rune)
            .ok_or(MathError::Overflow("pool rune"))?;
        let total_asset = pool_asset
            .checked_add(add_asset)
            .ok_or(MathError::Overflow("pool asset"))?;
        if total_rune == 0 {
            return Err(MathError::EmptyPool { side: "RUNE" });
        }
        if total_asset == 0 {
            return Err(MathError::EmptyPool { side: "asset" });
        }

        let liquidity_units = match formula {
            UnitFormula::SlipAdjusted => {
                if pool_rune == 0 || pool_asset == 0 {
                    // seeding an empty side resets the pool to the rune added
                    return Ok(PoolUnits {
                        pool_units: add_rune,
                        liquidity_units: add_rune,
                    });
                }
                Self::slip_adjusted_units(old_pool_units, pool_rune, pool_asset, add_rune, add_asset)?
            }
            UnitFormula::DepthWeighted => {
                Self::depth_weighted_units(total_rune, total_asset, add_rune, add_asset)?
            }
        };

        let pool_units = old_pool_units
            .checked_add(liquidity_units)
            .ok_or(MathError::Overflow("pool units"))?;
        trace!(?formula, pool_units, liquidity_units, "pool units calculated");
        Ok(PoolUnits {
            pool_units,
            liquidity_units,
        })
    }

    fn slip_adjusted_units(
        p: Amount,
        pool_rune: Amount,
        pool_asset: Amount,
        r: Amount,
        a: Amount,
    ) -> MathResult<Amount> {
        let overflow = || MathError::Overflow("slip adjusted units");
        let (p, big_r, big_a, r, a) = (wide(p), wide(pool_rune), wide(pool_asset), wide(r), wide(a));

        let ra = big_r * a;
        let ar = r * big_a;
        let skew = if ra > ar { ra - ar } else { ar - ra };
        // (r + R)(a + A)
        let slip_den = (r + big_r) * (a + big_a);
        let numerator = p
            .checked_mul(ra + ar)
            .and_then(|n| n.checked_mul(slip_den - skew))
            .ok_or_else(overflow)?;
        let denominator = (U512::from(2u8) * big_a * big_r)
            .checked_mul(slip_den)
            .ok_or_else(overflow)?;
        narrow(numerator / denominator, "slip adjusted units")
    }

    fn depth_weighted_units(
        total_rune: Amount,
        total_asset: Amount,
        r: Amount,
        a: Amount,
    ) -> MathResult<Amount> {
        let (big_r, big_a) = (wide(total_rune), wide(total_asset));
        let numerator = (big_r + big_a) * (wide(r) * big_a + big_r * wide(a));
        let denominator = U512::from(4u8) * big_r * big_a;
        narrow(numerator / denominator, "depth weighted units")
    }

    /// Shares paid out for redeeming `basis_points` of `member_units`
    ///
    /// `extra_units` are protection units minted for this withdrawal. Under
    /// V84 they are claimed on top of the provider's own units and never
    /// remain with the provider; under V1 they are folded into the position
    /// before the basis points are applied.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_withdraw(
        formula: WithdrawFormula,
        pool_units: Amount,
        pool_rune: Amount,
        pool_asset: Amount,
        member_units: Amount,
        extra_units: Amount,
        basis_points: u64,
        side: WithdrawSide,
    ) -> MathResult<WithdrawShares> {
        if pool_units == 0 {
            return Err(MathError::ZeroPoolUnits);
        }
        if pool_rune == 0 {
            return Err(MathError::ZeroPoolRune);
        }
        if pool_asset == 0 {
            return Err(MathError::ZeroPoolAsset);
        }
        if member_units == 0 {
            return Err(MathError::ZeroMemberUnits);
        }
        if basis_points > MAX_WITHDRAW_BASIS_POINTS {
            return Err(MathError::InvalidBasisPoints(basis_points));
        }

        let overflow = || MathError::Overflow("units to claim");
        let share = formula.share_mode();
        let position = match formula {
            WithdrawFormula::V1 => member_units.checked_add(extra_units).ok_or_else(overflow)?,
            WithdrawFormula::V84 => member_units,
        };
        let units_claimed = share.share(
            Amount::from(basis_points),
            Amount::from(MAX_WITHDRAW_BASIS_POINTS),
            position,
        )?;
        let units_remaining = safe_sub(position, units_claimed);
        let to_claim = match formula {
            WithdrawFormula::V1 => units_claimed,
            WithdrawFormula::V84 => units_claimed.checked_add(extra_units).ok_or_else(overflow)?,
        };

        let (rune, asset) = match side {
            WithdrawSide::Both => (
                share.share(to_claim, pool_units, pool_rune)?,
                share.share(to_claim, pool_units, pool_asset)?,
            ),
            WithdrawSide::Rune => (Self::calc_asym_withdrawal(to_claim, pool_units, pool_rune)?, 0),
            WithdrawSide::Asset => (0, Self::calc_asym_withdrawal(to_claim, pool_units, pool_asset)?),
        };

        Ok(WithdrawShares {
            rune,
            asset,
            units_claimed,
            units_remaining,
        })
    }

    /// Single-sided redemption: `s * D * (2T² - 2Ts + s²) / T³`
    pub fn calc_asym_withdrawal(s: Amount, t: Amount, depth: Amount) -> MathResult<Amount> {
        if t == 0 {
            return Err(MathError::DivisionByZero("asym withdrawal"));
        }
        let overflow = || MathError::Overflow("asym withdrawal");
        let (s, t, depth) = (wide(s), wide(t), wide(depth));
        let two = U512::from(2u8);
        let two_t_squared = two * t * t;
        let two_t_s = two * t * s;
        let tail = if two_t_squared > two_t_s {
            two_t_squared - two_t_s
        } else {
            U512::zero()
        };
        let numerator = (s * depth)
            .checked_mul(tail + s * s)
            .ok_or_else(overflow)?;
        let denominator = t.checked_mul(t * t).ok_or_else(overflow)?;
        narrow(numerator / denominator, "asym withdrawal")
    }

    /// A payout that empties exactly one side of the pool
    pub fn drains_one_side(
        withdraw_rune: Amount,
        withdraw_asset: Amount,
        pool_rune: Amount,
        pool_asset: Amount,
    ) -> bool {
        (withdraw_rune == pool_rune) != (withdraw_asset == pool_asset)
    }
}
