//! # Offer: the single record shape shared by both books
//!
//! A sell offer holds a unique asset in escrow until someone pays `price`.
//! A buy offer holds `price` in escrow until someone hands over the asset.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  accept / cancel  ┌───────┐
//!   │ LIVE ├──────────────────▶│ ENDED │
//!   └──────┘                   └───────┘
//! ```
//!
//! `is_ended` flips exactly once and never back. Whether the offer may be
//! accepted or cancelled depends only on the clock relative to `deadline`,
//! which is fixed at creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, BookKind, CollectionId, EscrowError, OfferId, TokenId};

/// One offer record. Records are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Collection the asset belongs to.
    pub collection: CollectionId,
    /// Asset id within the collection.
    pub token_id: TokenId,
    /// Account that created the offer.
    pub offerer: AccountId,
    /// Currency that changes hands on acceptance. Never zero.
    pub price: Decimal,
    /// Acceptance is possible strictly before this instant.
    pub deadline: DateTime<Utc>,
    /// Terminal flag.
    pub is_ended: bool,
    /// When the offer was recorded.
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// A fresh, live offer.
    #[must_use]
    pub fn new(
        collection: CollectionId,
        token_id: TokenId,
        offerer: AccountId,
        price: Decimal,
        deadline: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collection,
            token_id,
            offerer,
            price,
            deadline,
            is_ended: false,
            created_at,
        }
    }

    /// An offer is expired from its deadline onwards.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Live and not yet expired: the only state in which it can be accepted.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.is_ended && !self.is_expired(now)
    }

    /// Whether this offer refers to exactly this asset.
    #[must_use]
    pub fn references(&self, collection: &CollectionId, token_id: TokenId) -> bool {
        self.token_id == token_id && &self.collection == collection
    }

    /// Flip `is_ended` to true.
    ///
    /// # Errors
    /// Returns [`EscrowError::OfferAlreadyEnded`] if the offer already ended.
    pub fn mark_ended(&mut self, book: BookKind, id: OfferId) -> crate::Result<()> {
        if self.is_ended {
            return Err(EscrowError::OfferAlreadyEnded { book, id });
        }
        self.is_ended = true;
        Ok(())
    }
}

/// Dummy offer for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    /// A live offer on `dummy #1` priced at one unit, expiring in a day.
    pub fn dummy(offerer: AccountId) -> Self {
        let now = Utc::now();
        Self::new(
            CollectionId::new("dummy"),
            TokenId(1),
            offerer,
            Decimal::ONE,
            now + chrono::Duration::days(1),
            now,
        )
    }
}
