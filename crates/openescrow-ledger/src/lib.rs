//! # openescrow-ledger
//!
//! In-memory implementations of the services the marketplace engine talks
//! to. Tests and simulations plug these in; a deployment injects adapters
//! for its real asset registry, payment rail, and admin layer instead.
//!
//! - [`InMemoryAssetRegistry`]: token ownership, single-operator approval, transfers
//! - [`CurrencyLedger`]: per-account balances plus the engine's escrow pool
//! - [`SupplyConservation`]: proves the ledger never mints or burns currency
//! - [`SingleAdministrator`]: one privileged account
//!
//! The registry and the ledger journal their changes while a transaction is
//! open, so the engine can roll both back when an operation fails halfway.

pub mod admin;
pub mod currency;
pub mod registry;
pub mod supply;

pub use admin::SingleAdministrator;
pub use currency::CurrencyLedger;
pub use registry::InMemoryAssetRegistry;
pub use supply::SupplyConservation;
