//! # openescrow-types
//!
//! Shared types, errors, and collaborator contracts for the **OpenEscrow**
//! marketplace engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`CollectionId`], [`TokenId`], [`OfferId`], [`BookKind`]
//! - **Offer model**: [`Offer`]
//! - **Notifications**: [`MarketEvent`]
//! - **Collaborators**: [`AssetRegistry`], [`PaymentRail`], [`AdminPolicy`], [`Transactional`]
//! - **Time**: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`EscrowError`] with `MK_ERR_` prefix codes, plus [`RegistryError`] and [`RailError`]
//! - **Constants**: system-wide defaults

pub mod clock;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod offer;

// Re-export all primary types at crate root for ergonomic imports:
//   use openescrow_types::{Offer, OfferId, MarketEvent, ...};

pub use clock::*;
pub use collaborator::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use offer::*;

// Constants are accessed via `openescrow_types::constants::FOO`
// (not re-exported to avoid name collisions).
