//! Formula variants selected by protocol version

use crate::fixed_point::ShareMode;
use crate::units::{UnitFormula, WithdrawFormula};
use config::ProtocolVersion;

/// How a deposit's addresses are reconciled with a provider record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressBinding {
    /// Empty addresses are adopted; a known asset address must match
    Adopt,
    /// A provider without units must match both addresses exactly
    Strict,
}

/// Every version-dependent choice the ledger makes, resolved once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaSet {
    pub units: UnitFormula,
    pub withdraw: WithdrawFormula,
    pub share: ShareMode,
    pub address_binding: AddressBinding,
    /// Fold synthetic supply into pool units
    pub synth_units: bool,
}

impl FormulaSet {
    pub fn for_version(version: ProtocolVersion) -> Self {
        let address_binding = if version.at_least(ProtocolVersion::V79) {
            AddressBinding::Strict
        } else {
            AddressBinding::Adopt
        };

        if version.at_least(ProtocolVersion::V88) {
            Self {
                units: UnitFormula::DepthWeighted,
                withdraw: WithdrawFormula::V84,
                share: ShareMode::Capped,
                address_binding,
                synth_units: true,
            }
        } else if version.at_least(ProtocolVersion::V84) {
            Self {
                units: UnitFormula::SlipAdjusted,
                withdraw: WithdrawFormula::V84,
                share: ShareMode::Capped,
                address_binding,
                synth_units: true,
            }
        } else {
            Self {
                units: UnitFormula::SlipAdjusted,
                withdraw: WithdrawFormula::V1,
                share: ShareMode::Uncapped,
                address_binding,
                synth_units: false,
            }
        }
    }
}

impl Default for FormulaSet {
    fn default() -> Self {
        Self::for_version(ProtocolVersion::CURRENT)
    }
}
