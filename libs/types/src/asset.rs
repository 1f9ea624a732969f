//! Chain, asset, address and transaction identifiers
//!
//! Assets are written `CHAIN.SYMBOL` (`BTC.BTC`, `BNB.BUSD-BD1`). An asset
//! without a chain prefix lives on THORChain. Synthetic assets are THORChain
//! assets whose symbol is `<chain>/<symbol>` in lower case.

use crate::errors::ValidationError;
use crate::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Block chain identifier, upper-case letters only
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chain(String);

impl Chain {
    pub const THOR: &'static str = "THOR";
    pub const BNB: &'static str = "BNB";

    /// Parse and validate a chain id (3 to 10 letters, case-insensitive)
    pub fn new(id: &str) -> Result<Self, ValidationError> {
        let id = id.trim().to_uppercase();
        if id.len() < 3 {
            return Err(ValidationError::InvalidChain {
                input: id,
                reason: "chain id len is less than 3",
            });
        }
        if id.len() > 10 {
            return Err(ValidationError::InvalidChain {
                input: id,
                reason: "chain id len is more than 10",
            });
        }
        if !id.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidChain {
                input: id,
                reason: "chain id can consist only of letters",
            });
        }
        Ok(Self(id))
    }

    pub fn thorchain() -> Self {
        Self(Self::THOR.to_string())
    }

    pub fn is_thorchain(&self) -> bool {
        self.0 == Self::THOR
    }

    pub fn is_bnb(&self) -> bool {
        self.0 == Self::BNB
    }

    /// The asset this chain charges gas in, if the chain is known
    pub fn gas_asset(&self) -> Option<Asset> {
        let (chain, symbol) = match self.0.as_str() {
            "THOR" => ("THOR", "RUNE"),
            "BNB" => ("BNB", "BNB"),
            "BTC" => ("BTC", "BTC"),
            "LTC" => ("LTC", "LTC"),
            "BCH" => ("BCH", "BCH"),
            "DOGE" => ("DOGE", "DOGE"),
            "ETH" => ("ETH", "ETH"),
            "TERRA" => ("TERRA", "LUNA"),
            "GAIA" => ("GAIA", "ATOM"),
            "AVAX" => ("AVAX", "AVAX"),
            _ => return None,
        };
        Some(Asset {
            chain: Chain(chain.to_string()),
            symbol: symbol.to_string(),
            ticker: symbol.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Chain {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.0
    }
}

/// A pool-able asset, RUNE, or a synthetic claim on a pool
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    pub chain: Chain,
    pub symbol: String,
    pub ticker: String,
}

const SYNTHETIC_SEPARATOR: char = '/';

impl Asset {
    /// Parse `CHAIN.SYMBOL`; a bare symbol is taken to be on THORChain
    pub fn new(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAsset {
            input: input.to_string(),
        };
        let (chain, symbol) = match input.split_once('.') {
            Some((chain, symbol)) => (Chain::new(chain).map_err(|_| invalid())?, symbol),
            None => (Chain::thorchain(), input),
        };
        let symbol = symbol.trim();
        if symbol.is_empty()
            || !symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == SYNTHETIC_SEPARATOR)
        {
            return Err(invalid());
        }

        if symbol.contains(SYNTHETIC_SEPARATOR) {
            // synthetic symbols are normalised to lower case
            let symbol = symbol.to_lowercase();
            let ticker = symbol
                .rsplit(SYNTHETIC_SEPARATOR)
                .next()
                .and_then(|s| s.split('-').next())
                .unwrap_or_default()
                .to_uppercase();
            if ticker.is_empty() || !chain.is_thorchain() {
                return Err(invalid());
            }
            return Ok(Self {
                chain,
                symbol,
                ticker,
            });
        }

        let symbol = symbol.to_uppercase();
        let ticker = symbol.split('-').next().unwrap_or_default().to_string();
        if ticker.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            chain,
            symbol,
            ticker,
        })
    }

    /// Native RUNE on THORChain
    pub fn rune() -> Self {
        Self {
            chain: Chain::thorchain(),
            symbol: "RUNE".to_string(),
            ticker: "RUNE".to_string(),
        }
    }

    pub fn is_rune(&self) -> bool {
        match self.chain.as_str() {
            Chain::THOR => self.symbol == "RUNE",
            Chain::BNB => self.symbol == "RUNE-B1A" || self.symbol == "RUNE-67C",
            _ => false,
        }
    }

    pub fn is_gas_asset(&self) -> bool {
        self.chain.gas_asset().as_ref() == Some(self)
    }

    pub fn is_synthetic(&self) -> bool {
        self.chain.is_thorchain() && self.symbol.contains(SYNTHETIC_SEPARATOR)
    }

    /// The synthetic asset backed by this asset's pool
    pub fn synthetic_asset(&self) -> Self {
        if self.is_synthetic() {
            return self.clone();
        }
        Self {
            chain: Chain::thorchain(),
            symbol: format!("{}{}{}", self.chain, SYNTHETIC_SEPARATOR, self.symbol).to_lowercase(),
            ticker: self.ticker.clone(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chain, self.symbol)
    }
}

impl FromStr for Asset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Asset {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

/// Address on any chain; empty means "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_string())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound transaction hash
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().trim().to_uppercase())
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount of a specific asset
///
/// `decimals` is the precision of the asset on its own chain; zero means
/// unknown and is treated as the native 8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub asset: Asset,
    pub amount: Amount,
    #[serde(default)]
    pub decimals: u8,
}

impl Coin {
    pub fn new(asset: Asset, amount: Amount) -> Self {
        Self {
            asset,
            amount,
            decimals: 0,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}
