//! # Confluence Configuration
//!
//! Protocol constants and runtime configuration for the liquidity ledger.
//!
//! ## Features
//!
//! - **Protocol Versions**: ordered versions that select formula variants
//! - **Versioned Constants**: lockup, protection and cap values per version
//! - **Ledger Configuration**: TOML file with `CONFLUENCE_` env overrides
//! - **Logging**: `tracing-subscriber` setup shared by binaries and tests
//!
//! ## Usage
//!
//! ```rust
//! use config::{ConstantValues, ProtocolVersion};
//!
//! let constants = ConstantValues::for_version(ProtocolVersion::CURRENT);
//! assert_eq!(constants.full_imp_loss_protection_blocks, 1_440_000);
//! ```

pub mod ledger_config;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use ledger_config::{load_config, ConstantOverrides, LedgerConfig};
pub use logging::{init_tracing, LoggingConfig};
pub use protocol::{ilp_disabled_key, ConstantName, ConstantValues, ProtocolVersion};
