//! Synthetic-asset unit co-accounting
//!
//! Synthetic holders share the pool's asset depth with liquidity providers.
//! Their claim is expressed as units so that one denominator serves both:
//! `synth_units = L * S / (2A - S)` for `L` LP units, `S` synth supply and
//! `A` asset depth.

use crate::error::MathResult;
use crate::fixed_point::{narrow, safe_sub, wide};
use types::{Amount, Pool};

pub struct SynthUnitTracker;

impl SynthUnitTracker {
    pub fn calc_synth_units(
        lp_units: Amount,
        balance_asset: Amount,
        synth_supply: Amount,
    ) -> MathResult<Amount> {
        if balance_asset == 0 {
            return Ok(0);
        }
        let mut denominator = safe_sub(balance_asset.saturating_mul(2), synth_supply);
        if denominator == 0 {
            denominator = 1;
        }
        narrow(
            wide(lp_units) * wide(synth_supply) / wide(denominator),
            "synth units",
        )
    }

    /// Pool with `synth_units` recomputed for the live synthetic supply
    pub fn calc_units(pool: &Pool, synth_supply: Amount) -> MathResult<Pool> {
        let mut updated = pool.clone();
        updated.synth_units =
            Self::calc_synth_units(pool.lp_units, pool.balance_asset, synth_supply)?;
        Ok(updated)
    }
}
