//! Append-only offer book.
//!
//! Offer ids are positions in the backing vector, so the next id is always
//! the current length: ids are dense, strictly increasing, and never reused.
//! Records are never removed except when the transaction that created them
//! is rolled back, which only ever affects the newest record.

use openescrow_types::{BookKind, Offer, OfferId};
use serde::{Deserialize, Serialize};

/// One of the two independent offer registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferBook {
    /// Which book this is; used in error reports.
    kind: BookKind,
    /// Offers indexed by id.
    offers: Vec<Offer>,
}

impl OfferBook {
    /// Create an empty book.
    #[must_use]
    pub fn new(kind: BookKind) -> Self {
        Self {
            kind,
            offers: Vec::new(),
        }
    }

    /// Which book this is.
    #[must_use]
    pub fn kind(&self) -> BookKind {
        self.kind
    }

    /// The id the next inserted offer will get (the counter).
    #[must_use]
    pub fn next_id(&self) -> OfferId {
        OfferId(self.offers.len() as u64)
    }

    /// Append an offer and return its id.
    pub fn insert(&mut self, offer: Offer) -> OfferId {
        let id = self.next_id();
        self.offers.push(offer);
        id
    }

    /// Look up an offer. `None` means the id was never allocated.
    #[must_use]
    pub fn get(&self, id: OfferId) -> Option<&Offer> {
        self.offers.get(id.index()?)
    }

    pub(crate) fn get_mut(&mut self, id: OfferId) -> Option<&mut Offer> {
        self.offers.get_mut(id.index()?)
    }

    /// Drop the newest record. Only used to undo a failed creation.
    pub(crate) fn pop_last(&mut self) -> Option<Offer> {
        self.offers.pop()
    }

    /// Number of offers ever created.
    #[must_use]
    pub fn count(&self) -> usize {
        self.offers.len()
    }

    /// Whether no offer was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// All offers with their ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (OfferId, &Offer)> {
        self.offers
            .iter()
            .enumerate()
            .map(|(i, offer)| (OfferId(i as u64), offer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openescrow_types::AccountId;

    #[test]
    fn ids_start_at_zero_and_increase() {
        let mut book = OfferBook::new(BookKind::Sell);
        assert_eq!(book.next_id(), OfferId(0));
        let a = book.insert(Offer::dummy(AccountId::new()));
        let b = book.insert(Offer::dummy(AccountId::new()));
        assert_eq!(a, OfferId(0));
        assert_eq!(b, OfferId(1));
        assert_eq!(book.next_id(), OfferId(2));
        assert_eq!(book.count(), 2);
    }

    #[test]
    fn unknown_id_is_none() {
        let mut book = OfferBook::new(BookKind::Buy);
        assert!(book.get(OfferId(0)).is_none());
        book.insert(Offer::dummy(AccountId::new()));
        assert!(book.get(OfferId(0)).is_some());
        assert!(book.get(OfferId(1)).is_none());
        assert!(book.get(OfferId(u64::MAX)).is_none());
    }

    #[test]
    fn pop_last_frees_the_newest_id() {
        let mut book = OfferBook::new(BookKind::Sell);
        book.insert(Offer::dummy(AccountId::new()));
        book.insert(Offer::dummy(AccountId::new()));
        book.pop_last();
        assert_eq!(book.next_id(), OfferId(1));
    }

    #[test]
    fn iter_pairs_ids_with_offers() {
        let mut book = OfferBook::new(BookKind::Sell);
        let alice = AccountId::new();
        let bob = AccountId::new();
        book.insert(Offer::dummy(alice));
        book.insert(Offer::dummy(bob));
        let ids: Vec<_> = book.iter().map(|(id, o)| (id, o.offerer)).collect();
        assert_eq!(ids, vec![(OfferId(0), alice), (OfferId(1), bob)]);
    }

    #[test]
    fn book_survives_serde() {
        let mut book = OfferBook::new(BookKind::Buy);
        book.insert(Offer::dummy(AccountId::new()));
        let json = serde_json::to_string(&book).unwrap();
        let back: OfferBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), BookKind::Buy);
        assert_eq!(back.get(OfferId(0)), book.get(OfferId(0)));
    }
}
