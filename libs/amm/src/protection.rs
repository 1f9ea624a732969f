//! Impermanent-loss protection math
//!
//! Coverage ramps linearly with position age, from nothing before the
//! minimum age to full coverage at the full-protection block count.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{narrow, safe_sub, wide, ShareMode};
use types::{Amount, LiquidityProvider, Pool, MAX_WITHDRAW_BASIS_POINTS};

/// One day of blocks; no protection before this age
pub const MIN_PROTECTION_AGE: i64 = 17_280;

/// Protection granted on a withdrawal, in RUNE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImpLoss {
    pub protection_rune: Amount,
    pub deposit_value: Amount,
    pub redeem_value: Amount,
}

pub struct ImpermanentLossProtector;

impl ImpermanentLossProtector {
    /// Fraction of the loss covered at `age` blocks, in basis points
    pub fn protection_basis_points(age: i64, min_age: i64, full_protection_blocks: i64) -> u64 {
        if full_protection_blocks <= 0 || age < min_age {
            return 0;
        }
        if age >= full_protection_blocks {
            return MAX_WITHDRAW_BASIS_POINTS;
        }
        // 0 <= age < full here, so the quotient is below 10000
        (age * MAX_WITHDRAW_BASIS_POINTS as i64 / full_protection_blocks) as u64
    }

    /// Age of a position for protection purposes
    ///
    /// A pool status change restarts the clock.
    pub fn position_age(height: u64, last_add_height: u64, status_since: u64) -> i64 {
        let since = last_add_height.max(status_since);
        height as i64 - since as i64
    }

    /// Loss on the provider's whole position, scaled by the withdrawn
    /// fraction and then by the protection fraction
    ///
    /// With `A0`/`R0` the cost basis and `A1`/`R1` the current share:
    /// `deposit = A0 * R1 / A1 + R0`, `redeem = 2 * R1`.
    pub fn calc_imp_loss(
        share: ShareMode,
        provider: &LiquidityProvider,
        pool: &Pool,
        withdraw_basis_points: u64,
        protection_basis_points: u64,
    ) -> MathResult<ImpLoss> {
        let pool_units = pool.pool_units();
        let a1 = share.share(provider.units, pool_units, pool.balance_asset)?;
        let r1 = share.share(provider.units, pool_units, pool.balance_rune)?;
        if a1 == 0 {
            return Ok(ImpLoss::default());
        }

        let deposit_value = narrow(
            wide(provider.asset_deposit_value) * wide(r1) / wide(a1),
            "deposit value",
        )?
        .checked_add(provider.rune_deposit_value)
        .ok_or(MathError::Overflow("deposit value"))?;
        let redeem_value = r1
            .checked_add(r1)
            .ok_or(MathError::Overflow("redeem value"))?;

        let max_bps = Amount::from(MAX_WITHDRAW_BASIS_POINTS);
        let coverage = safe_sub(deposit_value, redeem_value);
        let coverage = share.share(Amount::from(withdraw_basis_points), max_bps, coverage)?;
        let protection_rune = narrow(
            wide(coverage) * wide(Amount::from(protection_basis_points)) / wide(max_bps),
            "protection",
        )?;

        Ok(ImpLoss {
            protection_rune,
            deposit_value,
            redeem_value,
        })
    }

    /// Loss measured on the claimed units alone, against the whole cost
    /// basis, at the whole-number RUNE per asset price of the claim
    ///
    /// `coverage = (A0 - A1) * (R1 / A1) + (R0 - R1)` with each difference
    /// floored at zero, then scaled by the protection fraction.
    pub fn calc_claimed_imp_loss(
        share: ShareMode,
        provider: &LiquidityProvider,
        pool: &Pool,
        withdraw_basis_points: u64,
        protection_basis_points: u64,
    ) -> MathResult<ImpLoss> {
        let max_bps = Amount::from(MAX_WITHDRAW_BASIS_POINTS);
        let claimed = share.share(Amount::from(withdraw_basis_points), max_bps, provider.units)?;
        let a1 = share.share(claimed, pool.lp_units, pool.balance_asset)?;
        let r1 = share.share(claimed, pool.lp_units, pool.balance_rune)?;
        if a1 == 0 {
            return Ok(ImpLoss::default());
        }
        let price = r1 / a1;

        let overflow = || MathError::Overflow("claimed imp loss");
        let coverage = safe_sub(provider.asset_deposit_value, a1)
            .checked_mul(price)
            .and_then(|value| value.checked_add(safe_sub(provider.rune_deposit_value, r1)))
            .ok_or_else(overflow)?;
        let protection_rune = narrow(
            wide(coverage) * wide(Amount::from(protection_basis_points)) / wide(max_bps),
            "protection",
        )?;

        let deposit_value = provider
            .asset_deposit_value
            .checked_mul(price)
            .and_then(|value| value.checked_add(provider.rune_deposit_value))
            .ok_or_else(overflow)?;
        let redeem_value = a1
            .checked_mul(price)
            .and_then(|value| value.checked_add(r1))
            .ok_or_else(overflow)?;
        Ok(ImpLoss {
            protection_rune,
            deposit_value,
            redeem_value,
        })
    }
}
