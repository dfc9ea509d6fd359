//! Marketplace notifications.
//!
//! Every committed state transition produces exactly one [`MarketEvent`].
//! Events carry enough data for an external indexer to rebuild marketplace
//! history without re-reading engine state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, BookKind, CollectionId, OfferId, TokenId};

/// A committed marketplace transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    SellOfferCreated {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
        price: Decimal,
        deadline: DateTime<Utc>,
    },
    SellOfferAccepted {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
        buyer: AccountId,
        price: Decimal,
    },
    SellOfferCancelled {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
    },
    BuyOfferCreated {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
        price: Decimal,
        deadline: DateTime<Utc>,
    },
    BuyOfferAccepted {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
        seller: AccountId,
        price: Decimal,
    },
    /// `price` is the amount refunded to the offerer.
    BuyOfferCancelled {
        offer_id: OfferId,
        collection: CollectionId,
        token_id: TokenId,
        price: Decimal,
    },
    NftRecovered {
        collection: CollectionId,
        token_id: TokenId,
        destination: AccountId,
    },
    FundsRecovered {
        recipient: AccountId,
        amount: Decimal,
    },
}

impl MarketEvent {
    /// The offer this event concerns, if any.
    #[must_use]
    pub fn offer(&self) -> Option<(BookKind, OfferId)> {
        match self {
            Self::SellOfferCreated { offer_id, .. }
            | Self::SellOfferAccepted { offer_id, .. }
            | Self::SellOfferCancelled { offer_id, .. } => Some((BookKind::Sell, *offer_id)),
            Self::BuyOfferCreated { offer_id, .. }
            | Self::BuyOfferAccepted { offer_id, .. }
            | Self::BuyOfferCancelled { offer_id, .. } => Some((BookKind::Buy, *offer_id)),
            Self::NftRecovered { .. } | Self::FundsRecovered { .. } => None,
        }
    }

    /// Stable upper-case name, as used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SellOfferCreated { .. } => "SELL_OFFER_CREATED",
            Self::SellOfferAccepted { .. } => "SELL_OFFER_ACCEPTED",
            Self::SellOfferCancelled { .. } => "SELL_OFFER_CANCELLED",
            Self::BuyOfferCreated { .. } => "BUY_OFFER_CREATED",
            Self::BuyOfferAccepted { .. } => "BUY_OFFER_ACCEPTED",
            Self::BuyOfferCancelled { .. } => "BUY_OFFER_CANCELLED",
            Self::NftRecovered { .. } => "NFT_RECOVERED",
            Self::FundsRecovered { .. } => "FUNDS_RECOVERED",
        }
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_reference_by_book() {
        let created = MarketEvent::BuyOfferCreated {
            offer_id: OfferId(2),
            collection: CollectionId::new("c"),
            token_id: TokenId(9),
            price: Decimal::TWO,
            deadline: Utc::now(),
        };
        assert_eq!(created.offer(), Some((BookKind::Buy, OfferId(2))));

        let swept = MarketEvent::FundsRecovered {
            recipient: AccountId::new(),
            amount: Decimal::ONE,
        };
        assert_eq!(swept.offer(), None);
    }

    #[test]
    fn serde_tagged_by_name() {
        let event = MarketEvent::SellOfferCancelled {
            offer_id: OfferId(1),
            collection: CollectionId::new("c"),
            token_id: TokenId(4),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SELL_OFFER_CANCELLED\""), "{json}");
        let back: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
        assert_eq!(event.to_string(), "SELL_OFFER_CANCELLED");
    }
}
