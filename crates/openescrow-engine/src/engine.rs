//! The marketplace engine: state, accessors, and the transaction wrapper.
//!
//! Public operations live in [`sell`](crate::sell), [`buy`](crate::buy) and
//! [`recovery`](crate::recovery). Each one runs inside
//! [`MarketplaceEngine::atomically`]:
//!
//! ```text
//! begin(assets, payments)
//!   validate           ── first failed check is the reported error
//!   mutate locally     ── is_ended set before any external call
//!   call collaborators ── asset moves, payments
//!   emit event
//! commit  | on any error: unwind journal, rollback(assets, payments)
//! ```
//!
//! Collaborators are owned by the engine and borrowed mutably for the
//! duration of a call, so no collaborator can re-enter the engine. The
//! ordering above is kept regardless: a record is always ended before any
//! asset or currency leaves escrow on its behalf.

use chrono::{DateTime, Utc};
use openescrow_types::{
    AccountId, AdminPolicy, AssetRegistry, BookKind, Clock, CollectionId, EngineConfig,
    EscrowError, MarketEvent, Offer, OfferId, PaymentRail, RailError, RegistryError, Result,
    TokenId, constants,
};
use rust_decimal::Decimal;

use crate::book::OfferBook;
use crate::events::{EventLog, EventRecord};
use crate::journal::{Journal, Undo};

/// Escrow marketplace for unique assets.
///
/// Generic over its four collaborators so hosts can inject their own asset
/// registry, payment rail, admin policy, and clock.
pub struct MarketplaceEngine<A, P, G, C> {
    pub(crate) config: EngineConfig,
    pub(crate) sell_book: OfferBook,
    pub(crate) buy_book: OfferBook,
    pub(crate) events: EventLog,
    pub(crate) assets: A,
    pub(crate) payments: P,
    pub(crate) admin: G,
    pub(crate) clock: C,
}

impl<A, P, G, C> MarketplaceEngine<A, P, G, C>
where
    A: AssetRegistry,
    P: PaymentRail,
    G: AdminPolicy,
    C: Clock,
{
    /// Create an engine with empty books.
    pub fn new(config: EngineConfig, assets: A, payments: P, admin: G, clock: C) -> Self {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            escrow = %config.escrow_account,
            currency = %config.currency,
            "Marketplace engine started"
        );
        Self {
            config,
            sell_book: OfferBook::new(BookKind::Sell),
            buy_book: OfferBook::new(BookKind::Buy),
            events: EventLog::new(),
            assets,
            payments,
            admin,
            clock,
        }
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// A sell offer by id.
    #[must_use]
    pub fn sell_offer(&self, id: OfferId) -> Option<&Offer> {
        self.sell_book.get(id)
    }

    /// A buy offer by id.
    #[must_use]
    pub fn buy_offer(&self, id: OfferId) -> Option<&Offer> {
        self.buy_book.get(id)
    }

    /// Sell-offer counter: the id the next sell offer will receive.
    #[must_use]
    pub fn sell_offer_count(&self) -> u64 {
        self.sell_book.next_id().0
    }

    /// Buy-offer counter: the id the next buy offer will receive.
    #[must_use]
    pub fn buy_offer_count(&self) -> u64 {
        self.buy_book.next_id().0
    }

    /// Sell offers that can still be accepted right now.
    pub fn active_sell_offers(&self) -> impl Iterator<Item = (OfferId, &Offer)> {
        let now = self.clock.now();
        self.sell_book.iter().filter(move |(_, o)| o.is_open(now))
    }

    /// Buy offers that can still be accepted right now.
    pub fn active_buy_offers(&self) -> impl Iterator<Item = (OfferId, &Offer)> {
        let now = self.clock.now();
        self.buy_book.iter().filter(move |(_, o)| o.is_open(now))
    }

    /// The whole sell book.
    #[must_use]
    pub fn sell_book(&self) -> &OfferBook {
        &self.sell_book
    }

    /// The whole buy book.
    #[must_use]
    pub fn buy_book(&self) -> &OfferBook {
        &self.buy_book
    }

    /// Every notification emitted so far.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The account holding escrowed assets and currency.
    #[must_use]
    pub fn escrow_account(&self) -> AccountId {
        self.config.escrow_account
    }

    #[must_use]
    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Direct access to the registry, for the asset owner's own actions
    /// (minting, approving the escrow account).
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    #[must_use]
    pub fn payments(&self) -> &P {
        &self.payments
    }

    /// Direct access to the rail, for deposits outside any offer.
    pub fn payments_mut(&mut self) -> &mut P {
        &mut self.payments
    }

    #[must_use]
    pub fn admin(&self) -> &G {
        &self.admin
    }

    /// Direct access to the admin policy, for handing the role over.
    pub fn admin_mut(&mut self) -> &mut G {
        &mut self.admin
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ------------------------------------------------------------------
    // Transaction wrapper
    // ------------------------------------------------------------------

    /// Run `body` as one all-or-nothing operation.
    pub(crate) fn atomically<T>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&mut Self, &mut Journal) -> Result<T>,
    ) -> Result<T> {
        let mut journal = Journal::new();
        self.assets.begin();
        self.payments.begin();

        match body(self, &mut journal) {
            Ok(value) => {
                self.assets.commit();
                self.payments.commit();
                Ok(value)
            }
            Err(err) => {
                if journal.is_empty() {
                    tracing::debug!(operation, error = %err, "Operation rejected");
                } else {
                    tracing::warn!(operation, error = %err, "Operation reverted");
                }
                self.unwind(journal);
                self.assets.rollback();
                self.payments.rollback();
                Err(err)
            }
        }
    }

    fn unwind(&mut self, journal: Journal) {
        for undo in journal.unwind() {
            match undo {
                Undo::Inserted(kind) => {
                    self.book_mut(kind).pop_last();
                }
                Undo::Ended(kind, id) => {
                    if let Some(offer) = self.book_mut(kind).get_mut(id) {
                        offer.is_ended = false;
                    }
                }
                Undo::Emitted => {
                    self.events.pop_last();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Journaled local mutations
    // ------------------------------------------------------------------

    pub(crate) fn book(&self, kind: BookKind) -> &OfferBook {
        match kind {
            BookKind::Sell => &self.sell_book,
            BookKind::Buy => &self.buy_book,
        }
    }

    fn book_mut(&mut self, kind: BookKind) -> &mut OfferBook {
        match kind {
            BookKind::Sell => &mut self.sell_book,
            BookKind::Buy => &mut self.buy_book,
        }
    }

    pub(crate) fn record_offer(&mut self, journal: &mut Journal, kind: BookKind, offer: Offer) -> OfferId {
        let id = self.book_mut(kind).insert(offer);
        journal.push(Undo::Inserted(kind));
        id
    }

    /// Flip `is_ended`. This is the guard against a second payout: it
    /// happens before any collaborator is called for this offer.
    pub(crate) fn end_offer(&mut self, journal: &mut Journal, kind: BookKind, id: OfferId) -> Result<()> {
        let offer = self
            .book_mut(kind)
            .get_mut(id)
            .ok_or(EscrowError::InvalidOffer { book: kind, id })?;
        offer.mark_ended(kind, id)?;
        journal.push(Undo::Ended(kind, id));
        Ok(())
    }

    pub(crate) fn emit(&mut self, journal: &mut Journal, event: MarketEvent) -> Result<()> {
        let record: &EventRecord = self.events.append(event)?;
        tracing::debug!(sequence = record.sequence, event = %record.event, "Event emitted");
        journal.push(Undo::Emitted);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Precondition checks
    // ------------------------------------------------------------------

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Exists, not ended, not expired: the state required to accept.
    pub(crate) fn acceptable_offer(&self, kind: BookKind, id: OfferId, now: DateTime<Utc>) -> Result<Offer> {
        let offer = self.existing_live_offer(kind, id)?;
        if offer.is_expired(now) {
            return Err(EscrowError::OfferExpired {
                book: kind,
                id,
                deadline: offer.deadline,
            });
        }
        Ok(offer)
    }

    /// Exists, not ended, expired: the state required to cancel.
    pub(crate) fn cancellable_offer(&self, kind: BookKind, id: OfferId, now: DateTime<Utc>) -> Result<Offer> {
        let offer = self.existing_live_offer(kind, id)?;
        if !offer.is_expired(now) {
            return Err(EscrowError::OfferNotEnded {
                book: kind,
                id,
                deadline: offer.deadline,
            });
        }
        Ok(offer)
    }

    fn existing_live_offer(&self, kind: BookKind, id: OfferId) -> Result<Offer> {
        let offer = self
            .book(kind)
            .get(id)
            .ok_or(EscrowError::InvalidOffer { book: kind, id })?;
        if offer.is_ended {
            return Err(EscrowError::OfferAlreadyEnded { book: kind, id });
        }
        Ok(offer.clone())
    }

    pub(crate) fn ensure_administrator(&self, caller: AccountId) -> Result<()> {
        if self.admin.is_administrator(&caller) {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized(caller))
        }
    }

    pub(crate) fn ensure_escrow_approved(&self, collection: &CollectionId, token_id: TokenId) -> Result<()> {
        if self.assets.approved_operator(collection, token_id) == Some(self.config.escrow_account) {
            Ok(())
        } else {
            Err(EscrowError::NotApproved {
                collection: collection.clone(),
                token_id,
            })
        }
    }

    pub(crate) fn owner_of(&self, collection: &CollectionId, token_id: TokenId) -> Result<AccountId> {
        self.assets
            .owner_of(collection, token_id)
            .map_err(|_| EscrowError::AssetNotFound {
                collection: collection.clone(),
                token_id,
            })
    }

    // ------------------------------------------------------------------
    // Collaborator calls
    // ------------------------------------------------------------------

    /// Move an asset with the escrow account as operator.
    pub(crate) fn move_asset(
        &mut self,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
    ) -> Result<()> {
        let operator = self.config.escrow_account;
        self.assets
            .transfer(operator, collection, token_id, from, to)
            .map_err(|e: RegistryError| EscrowError::AssetTransferFailed {
                reason: e.to_string(),
            })
    }

    /// Take the payment attached to a call into escrow.
    pub(crate) fn collect_payment(&mut self, from: AccountId, amount: Decimal) -> Result<()> {
        self.payments.receive(from, amount).map_err(|e| match &e {
            RailError::InsufficientFunds { needed, available } => EscrowError::InsufficientFunds {
                needed: *needed,
                available: *available,
            },
            RailError::Rejected { .. } => EscrowError::CurrencyTransferFailed {
                reason: e.to_string(),
            },
        })
    }

    /// Pay out of escrow. Any rail failure is a currency-transfer failure.
    pub(crate) fn pay_out(&mut self, to: AccountId, amount: Decimal) -> Result<()> {
        self.payments
            .transfer(to, amount)
            .map_err(|e| EscrowError::CurrencyTransferFailed {
                reason: e.to_string(),
            })
    }
}

/// Creation-time checks shared by both books.
pub(crate) fn ensure_future_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if deadline > now {
        Ok(())
    } else {
        Err(EscrowError::InvalidDeadline { deadline, now })
    }
}

pub(crate) fn ensure_positive_price(price: Decimal) -> Result<()> {
    if price > Decimal::ZERO {
        Ok(())
    } else {
        Err(EscrowError::InvalidPrice(price))
    }
}
