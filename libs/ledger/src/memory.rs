//! In-memory port implementations
//!
//! Backed by ordered maps so iteration is deterministic. Used by tests and
//! by hosts that replay blocks outside a full node.

use crate::ports::{EventManager, GasManager, Keeper, ModuleName, PortError};
use std::collections::BTreeMap;
use tracing::debug;
use types::{Address, Amount, Asset, Chain, Coin, LedgerEvent, LiquidityProvider, Pool};

#[derive(Debug, Clone, Default)]
pub struct MemoryKeeper {
    pools: BTreeMap<Asset, Pool>,
    providers: BTreeMap<String, LiquidityProvider>,
    /// Keys are stored lower-cased; mimir lookups ignore case
    mimir: BTreeMap<String, i64>,
    supplies: BTreeMap<Asset, Amount>,
    modules: BTreeMap<ModuleName, Amount>,
    ragnarok: bool,
    fail_transfers: bool,
    fail_pool_writes: bool,
    fail_provider_writes: bool,
}

fn provider_key(asset: &Asset, address: &Address) -> String {
    format!("{asset}/{address}")
}

impl MemoryKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed mimir values, e.g. from `LedgerConfig::mimir`
    pub fn with_mimir<'a>(mut self, values: impl IntoIterator<Item = (&'a String, &'a i64)>) -> Self {
        for (key, value) in values {
            self.set_mimir(key, *value);
        }
        self
    }

    pub fn set_mimir(&mut self, key: &str, value: i64) {
        self.mimir.insert(key.to_ascii_lowercase(), value);
    }

    pub fn set_total_supply(&mut self, asset: Asset, amount: Amount) {
        self.supplies.insert(asset, amount);
    }

    pub fn fund_module(&mut self, module: ModuleName, amount: Amount) {
        *self.modules.entry(module).or_default() += amount;
    }

    pub fn module_balance(&self, module: ModuleName) -> Amount {
        self.modules.get(&module).copied().unwrap_or_default()
    }

    pub fn set_ragnarok(&mut self, in_progress: bool) {
        self.ragnarok = in_progress;
    }

    /// Make every module transfer fail, regardless of balances
    pub fn fail_transfers(&mut self, fail: bool) {
        self.fail_transfers = fail;
    }

    /// Make every pool write fail
    pub fn fail_pool_writes(&mut self, fail: bool) {
        self.fail_pool_writes = fail;
    }

    /// Make every provider set or remove fail
    pub fn fail_provider_writes(&mut self, fail: bool) {
        self.fail_provider_writes = fail;
    }

    pub fn providers(&self, asset: &Asset) -> Vec<&LiquidityProvider> {
        self.providers
            .values()
            .filter(|lp| &lp.asset == asset)
            .collect()
    }
}

impl Keeper for MemoryKeeper {
    fn get_pool(&self, asset: &Asset) -> Result<Option<Pool>, PortError> {
        Ok(self.pools.get(asset).cloned())
    }

    fn set_pool(&mut self, pool: &Pool) -> Result<(), PortError> {
        if self.fail_pool_writes {
            return Err(PortError::Unavailable(format!("pool {}", pool.asset)));
        }
        self.pools.insert(pool.asset.clone(), pool.clone());
        Ok(())
    }

    fn remove_pool(&mut self, asset: &Asset) -> Result<(), PortError> {
        self.pools.remove(asset);
        Ok(())
    }

    fn pools(&self) -> Result<Vec<Pool>, PortError> {
        Ok(self.pools.values().cloned().collect())
    }

    fn get_liquidity_provider(
        &self,
        asset: &Asset,
        address: &Address,
    ) -> Result<Option<LiquidityProvider>, PortError> {
        Ok(self.providers.get(&provider_key(asset, address)).cloned())
    }

    fn set_liquidity_provider(&mut self, provider: &LiquidityProvider) -> Result<(), PortError> {
        if self.fail_provider_writes {
            return Err(PortError::Unavailable(format!("provider {}", provider.key())));
        }
        self.providers.insert(provider.key(), provider.clone());
        Ok(())
    }

    fn remove_liquidity_provider(&mut self, provider: &LiquidityProvider) -> Result<(), PortError> {
        if self.fail_provider_writes {
            return Err(PortError::Unavailable(format!("provider {}", provider.key())));
        }
        self.providers.remove(&provider.key());
        Ok(())
    }

    fn get_mimir(&self, key: &str) -> Result<Option<i64>, PortError> {
        Ok(self.mimir.get(&key.to_ascii_lowercase()).copied())
    }

    fn total_supply(&self, asset: &Asset) -> Result<Amount, PortError> {
        Ok(self.supplies.get(asset).copied().unwrap_or_default())
    }

    fn ragnarok_in_progress(&self) -> bool {
        self.ragnarok
    }

    fn send_from_module_to_module(
        &mut self,
        from: ModuleName,
        to: ModuleName,
        coin: &Coin,
    ) -> Result<(), PortError> {
        if self.fail_transfers {
            return Err(PortError::Unavailable(format!("module {from}")));
        }
        let available = self.module_balance(from);
        if available < coin.amount {
            return Err(PortError::InsufficientFunds {
                module: from,
                needed: coin.amount,
                available,
            });
        }
        self.modules.insert(from, available - coin.amount);
        self.fund_module(to, coin.amount);
        debug!(%from, %to, %coin, "module transfer");
        Ok(())
    }
}

/// Event sink that keeps every event in emission order
#[derive(Debug, Clone, Default)]
pub struct RecordingEvents {
    pub events: Vec<LedgerEvent>,
    fail: bool,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every emit fails
    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
        }
    }

    pub fn of_type(&self, event_type: &str) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|event| event.event_type() == event_type)
            .collect()
    }
}

impl EventManager for RecordingEvents {
    fn emit_event(&mut self, event: LedgerEvent) -> Result<(), PortError> {
        if self.fail {
            return Err(PortError::Unavailable("event sink".to_string()));
        }
        self.events.push(event);
        Ok(())
    }
}

/// Gas manager with a fixed max gas per chain
#[derive(Debug, Clone, Default)]
pub struct FixedGasManager {
    max_gas: BTreeMap<Chain, Amount>,
}

impl FixedGasManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_gas(mut self, chain: Chain, amount: Amount) -> Self {
        self.max_gas.insert(chain, amount);
        self
    }
}

impl GasManager for FixedGasManager {
    fn get_max_gas(&self, chain: &Chain) -> Result<Coin, PortError> {
        let asset = chain
            .gas_asset()
            .ok_or_else(|| PortError::NotFound(format!("gas asset for {chain}")))?;
        let amount = self
            .max_gas
            .get(chain)
            .copied()
            .ok_or_else(|| PortError::NotFound(format!("max gas for {chain}")))?;
        Ok(Coin::new(asset, amount))
    }
}
