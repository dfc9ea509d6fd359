//! # openescrow-engine
//!
//! **Escrow marketplace** for unique assets: time-limited sell and buy
//! offers, settled through an asset registry and a payment rail.
//!
//! ## Architecture
//!
//! [`MarketplaceEngine`] owns two append-only [`OfferBook`]s and an
//! [`EventLog`]. Every operation:
//! 1. Checks its preconditions, reporting the first that fails
//! 2. Ends the offer (`is_ended = true`) before anything leaves escrow
//! 3. Moves the asset and the currency through its collaborators
//! 4. Appends one hash-chained event
//!
//! If any step fails the whole operation is undone: the engine unwinds its
//! own journal and rolls back both collaborators.
//!
//! ## Offer lifecycle
//!
//! - **Sell**: asset into escrow on creation; buyer pays the exact price to
//!   accept; after the deadline the seller may cancel, which leaves the
//!   asset in escrow for the administrator to recover
//! - **Buy**: price into escrow on creation; owner delivers the asset to
//!   accept; after the deadline the buyer may cancel for a refund
//! - **Recovery**: the administrator pulls assets not under an open sell
//!   offer, and sweeps escrowed currency

pub mod book;
pub mod buy;
pub mod engine;
pub mod events;
pub(crate) mod journal;
pub mod recovery;
pub mod sell;

#[cfg(test)]
pub(crate) mod testing;

pub use book::OfferBook;
pub use engine::MarketplaceEngine;
pub use events::{EventLog, EventRecord};
pub use recovery::EscrowReport;
