//! # Confluence Liquidity Ledger
//!
//! State transitions for adding and withdrawing pool liquidity.
//!
//! ## Architecture
//!
//! ```text
//! intent ──► LiquidityLedger ──► plan (pure, on owned snapshots) ──► WriteSet::commit
//!                 │                    │
//!                 │                    ├─ PendingDepositStager
//!                 │                    ├─ amm::PoolUnitCalculator
//!                 │                    ├─ amm::ImpermanentLossProtector
//!                 │                    └─ amm::SynthUnitTracker
//!                 └─ Ports { Keeper, EventManager, GasManager }
//! ```
//!
//! The ledger holds no state between calls. A failed operation leaves the
//! store exactly as it found it; the only exception is the affiliate leg of
//! an add, which runs after the principal has been committed.
//!
//! ## Usage
//!
//! ```rust
//! use ledger::{BlockContext, FixedGasManager, LiquidityLedger, MemoryKeeper, Ports, RecordingEvents};
//! use types::{AddLiquidityIntent, Address, TxId, ONE};
//!
//! let ledger = LiquidityLedger::default();
//! let mut keeper = MemoryKeeper::new();
//! let mut events = RecordingEvents::new();
//! let gas = FixedGasManager::new();
//! let mut ports = Ports::new(&mut keeper, &mut events, &gas);
//!
//! let intent = AddLiquidityIntent::new(
//!     "BTC.BTC".parse().unwrap(),
//!     100 * ONE,
//!     100 * ONE,
//!     Address::new("thor1provider"),
//!     Address::new("bc1provider"),
//!     TxId::new("A1B2"),
//! );
//! let receipt = ledger
//!     .add_liquidity(&mut ports, BlockContext::new(1), &intent)
//!     .unwrap();
//! assert_eq!(receipt.principal.liquidity_units(), 100 * ONE);
//! ```

pub mod add;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod pending;
pub mod ports;
pub mod withdraw;
pub mod write_set;

pub use add::AddOutcome;
pub use error::{ErrorKind, LiquidityError};
pub use ledger::{ensure_mutable, AddReceipt, BlockContext, LiquidityLedger, Ports};
pub use memory::{FixedGasManager, MemoryKeeper, RecordingEvents};
pub use pending::{PendingDepositStager, PendingState, StageDecision};
pub use ports::{EventManager, GasManager, Keeper, ModuleName, PortError};
pub use withdraw::WithdrawOutcome;
pub use write_set::{ProviderWrite, WriteSet};
