//! Deferred writes of a single liquidity operation
//!
//! Pipelines compute on owned snapshots and describe their effects here.
//! Nothing touches the store until `commit`.

use crate::error::LiquidityError;
use crate::ports::{EventManager, Keeper, ModuleName};
use tracing::error;
use types::{Coin, LedgerEvent, LiquidityProvider, Pool};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderWrite {
    Set(LiquidityProvider),
    Remove(LiquidityProvider),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSet {
    pub pool: Pool,
    pub provider: Option<ProviderWrite>,
    /// RUNE to move from the reserve into pool custody
    pub reserve_transfer: Option<Coin>,
    pub events: Vec<LedgerEvent>,
}

impl WriteSet {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            provider: None,
            reserve_transfer: None,
            events: Vec::new(),
        }
    }

    pub fn set_provider(&mut self, provider: LiquidityProvider) {
        self.provider = Some(ProviderWrite::Set(provider));
    }

    pub fn remove_provider(&mut self, provider: LiquidityProvider) {
        self.provider = Some(ProviderWrite::Remove(provider));
    }

    pub fn emit(&mut self, event: impl Into<LedgerEvent>) {
        self.events.push(event.into());
    }

    /// Apply every write, all or nothing
    ///
    /// The reserve transfer goes first: if it fails nothing else is written.
    /// A failed pool or provider write undoes whatever was already applied,
    /// restoring the prior pool record and returning the transferred RUNE to
    /// the reserve. Event failures are logged and never fail the operation.
    pub fn commit<K: Keeper, E: EventManager>(
        self,
        keeper: &mut K,
        events: &mut E,
    ) -> Result<(), LiquidityError> {
        let prior_pool = keeper.get_pool(&self.pool.asset)?;
        if let Some(coin) = &self.reserve_transfer {
            keeper
                .send_from_module_to_module(ModuleName::Reserve, ModuleName::Asgard, coin)
                .map_err(|source| LiquidityError::ExternalTransfer { source })?;
        }

        if let Err(err) = keeper.set_pool(&self.pool) {
            self.undo_transfer(keeper);
            return Err(err.into());
        }
        let written = match &self.provider {
            Some(ProviderWrite::Set(provider)) => keeper.set_liquidity_provider(provider),
            Some(ProviderWrite::Remove(provider)) => keeper.remove_liquidity_provider(provider),
            None => Ok(()),
        };
        if let Err(err) = written {
            let restored = match &prior_pool {
                Some(pool) => keeper.set_pool(pool),
                None => keeper.remove_pool(&self.pool.asset),
            };
            if let Err(undo) = restored {
                error!(error = %undo, pool = %self.pool.asset, "fail to restore pool");
            }
            self.undo_transfer(keeper);
            return Err(err.into());
        }

        for event in self.events {
            let event_type = event.event_type();
            if let Err(err) = events.emit_event(event) {
                error!(error = %err, event_type, "fail to emit event");
            }
        }
        Ok(())
    }

    fn undo_transfer<K: Keeper>(&self, keeper: &mut K) {
        let Some(coin) = &self.reserve_transfer else {
            return;
        };
        if let Err(err) =
            keeper.send_from_module_to_module(ModuleName::Asgard, ModuleName::Reserve, coin)
        {
            error!(error = %err, %coin, "fail to return rune to the reserve");
        }
    }
}
