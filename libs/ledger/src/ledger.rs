//! Liquidity ledger entry points
//!
//! `LiquidityLedger` resolves every version-dependent choice once, at
//! construction. Each operation plans its writes against a read-only view of
//! the store (see `add` and `withdraw`), then commits the resulting
//! `WriteSet` in one step.

use crate::add::AddOutcome;
use crate::error::LiquidityError;
use crate::ports::{EventManager, GasManager, Keeper};
use crate::withdraw::WithdrawOutcome;
use amm::{get_safe_share, FormulaSet};
use config::{ConstantName, ConstantValues, LedgerConfig, ProtocolVersion};
use tracing::{info, instrument, warn};
use types::{
    AddLiquidityIntent, Address, Amount, Asset, Pool, PoolStatus, ValidationError,
    WithdrawIntent, MAX_WITHDRAW_BASIS_POINTS,
};

/// Height of the block being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    pub height: u64,
}

impl BlockContext {
    pub fn new(height: u64) -> Self {
        Self { height }
    }
}

/// Host collaborators, borrowed for the duration of one operation
pub struct Ports<'a, K, E, G> {
    pub keeper: &'a mut K,
    pub events: &'a mut E,
    pub gas: &'a G,
}

impl<'a, K: Keeper, E: EventManager, G: GasManager> Ports<'a, K, E, G> {
    pub fn new(keeper: &'a mut K, events: &'a mut E, gas: &'a G) -> Self {
        Self {
            keeper,
            events,
            gas,
        }
    }
}

/// Result of an add: the principal deposit and, when requested, the
/// affiliate's share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReceipt {
    pub principal: AddOutcome,
    /// `None` when no affiliate was named or the affiliate leg failed
    pub affiliate: Option<AddOutcome>,
}

#[derive(Debug, Clone)]
pub struct LiquidityLedger {
    version: ProtocolVersion,
    formulas: FormulaSet,
    constants: ConstantValues,
    rune_asset: Asset,
}

impl LiquidityLedger {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            formulas: FormulaSet::for_version(version),
            constants: ConstantValues::for_version(version),
            rune_asset: Asset::rune(),
        }
    }

    /// Ledger for a loaded configuration, constant overrides applied
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LiquidityError> {
        let rune_asset = Asset::new(&config.rune_asset)?;
        if !rune_asset.is_rune() {
            return Err(ValidationError::InvalidAsset {
                input: config.rune_asset.clone(),
            }
            .into());
        }
        Ok(Self::new(config.protocol_version)
            .with_constants(config.constants())
            .with_rune_asset(rune_asset))
    }

    pub fn with_constants(mut self, constants: ConstantValues) -> Self {
        self.constants = constants;
        self
    }

    /// Native RUNE of the network; decides the BNB gas rule on withdraw
    pub fn with_rune_asset(mut self, rune_asset: Asset) -> Self {
        self.rune_asset = rune_asset;
        self
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn formulas(&self) -> &FormulaSet {
        &self.formulas
    }

    pub fn constants(&self) -> &ConstantValues {
        &self.constants
    }

    pub fn rune_asset(&self) -> &Asset {
        &self.rune_asset
    }

    /// Add liquidity, staging a lone leg or committing a full deposit
    #[instrument(skip_all, fields(asset = %intent.asset, tx = %intent.tx_id))]
    pub fn add_liquidity<K: Keeper, E: EventManager, G: GasManager>(
        &self,
        ports: &mut Ports<'_, K, E, G>,
        block: BlockContext,
        intent: &AddLiquidityIntent,
    ) -> Result<AddReceipt, LiquidityError> {
        intent.validate()?;
        info!(
            rune = intent.rune_amount,
            asset = intent.asset_amount,
            stage = intent.stage,
            "liquidity provision"
        );
        self.ensure_under_liquidity_cap(&*ports.keeper, intent.rune_amount)?;

        let (principal, affiliate) = self.split_affiliate(intent)?;
        let (writes, outcome) = self.plan_add(&*ports.keeper, block, &principal)?;
        writes.commit(&mut *ports.keeper, &mut *ports.events)?;

        let affiliate = match affiliate {
            Some(leg) => {
                let result = self
                    .plan_add(&*ports.keeper, block, &leg)
                    .and_then(|(writes, outcome)| {
                        writes.commit(&mut *ports.keeper, &mut *ports.events)?;
                        Ok(outcome)
                    });
                match result {
                    Ok(outcome) => Some(outcome),
                    Err(err) => {
                        // the principal is already committed and stays
                        warn!(
                            error = %err,
                            affiliate = %leg.rune_address,
                            "fail to add affiliate liquidity"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        Ok(AddReceipt {
            principal: outcome,
            affiliate,
        })
    }

    /// Redeem a fraction of a position, or cancel a stuck pending deposit
    #[instrument(skip_all, fields(asset = %intent.asset, tx = %intent.tx_id))]
    pub fn withdraw_liquidity<K: Keeper, E: EventManager, G: GasManager>(
        &self,
        ports: &mut Ports<'_, K, E, G>,
        block: BlockContext,
        intent: &WithdrawIntent,
    ) -> Result<WithdrawOutcome, LiquidityError> {
        intent.validate()?;
        let (writes, outcome) = self.plan_withdraw(&*ports.keeper, ports.gas, block, intent)?;
        writes.commit(&mut *ports.keeper, &mut *ports.events)?;
        info!(
            rune = outcome.rune,
            asset = outcome.asset,
            protection = outcome.protection_rune,
            units = outcome.units_burned,
            gas = outcome.gas_asset,
            "client withdraw"
        );
        Ok(outcome)
    }

    /// Mimir override of an integer constant; missing, negative or
    /// unreadable values fall back to the version's constant
    pub(crate) fn mimir_or<K: Keeper>(&self, keeper: &K, name: ConstantName) -> i64 {
        let constant = self.constants.get_int(name).unwrap_or_default();
        let key = name.as_str();
        match keeper.get_mimir(key) {
            Ok(Some(value)) if value >= 0 => value,
            Ok(_) => constant,
            Err(err) => {
                warn!(error = %err, key, "fail to get mimir value");
                constant
            }
        }
    }

    fn ensure_under_liquidity_cap<K: Keeper>(
        &self,
        keeper: &K,
        add_rune: Amount,
    ) -> Result<(), LiquidityError> {
        let limit = self.mimir_or(keeper, ConstantName::MaximumLiquidityRune);
        if limit <= 0 {
            return Ok(());
        }
        let total = keeper
            .pools()?
            .iter()
            .filter(|pool| !pool.is_suspended())
            .fold(add_rune, |total, pool| total.saturating_add(pool.balance_rune));
        let limit = limit as Amount;
        if total > limit {
            return Err(LiquidityError::RuneOverLimit { total, limit });
        }
        Ok(())
    }

    /// Carve the affiliate's share out of the intent
    fn split_affiliate(
        &self,
        intent: &AddLiquidityIntent,
    ) -> Result<(AddLiquidityIntent, Option<AddLiquidityIntent>), LiquidityError> {
        let Some(affiliate) = intent.affiliate.as_ref().filter(|a| a.basis_points > 0) else {
            return Ok((intent.clone(), None));
        };
        let bps = Amount::from(affiliate.basis_points);
        let max = Amount::from(MAX_WITHDRAW_BASIS_POINTS);
        let rune = get_safe_share(bps, max, intent.rune_amount)?;
        let asset = get_safe_share(bps, max, intent.asset_amount)?;
        if rune == 0 && asset == 0 {
            return Ok((intent.clone(), None));
        }

        let mut principal = intent.clone();
        principal.rune_amount -= rune;
        principal.asset_amount -= asset;
        principal.affiliate = None;
        // a full-share affiliate leaves nothing to deposit
        principal.validate()?;

        let mut leg = AddLiquidityIntent::new(
            intent.asset.clone(),
            rune,
            asset,
            affiliate.address.clone(),
            Address::empty(),
            intent.tx_id.clone(),
        );
        leg.asset_decimals = intent.asset_decimals;
        leg.stage = false;
        Ok((principal, Some(leg)))
    }
}

impl Default for LiquidityLedger {
    fn default() -> Self {
        Self::new(ProtocolVersion::CURRENT)
    }
}

/// Reject mutation of a suspended pool
pub fn ensure_mutable(pool: &Pool) -> Result<(), LiquidityError> {
    if pool.status == PoolStatus::Suspended {
        return Err(LiquidityError::PoolStatusInvalid {
            asset: pool.asset.clone(),
            status: pool.status,
        });
    }
    Ok(())
}
