//! Sell offers: the asset sits in escrow until someone pays the price.
//!
//! Cancelling a sell offer ends it but leaves the asset in escrow. Getting
//! it back out is an administrator action (see [`recovery`](crate::recovery)),
//! unlike buy offers whose cancellation refunds immediately.

use chrono::{DateTime, Utc};
use openescrow_types::{
    AccountId, AdminPolicy, AssetRegistry, BookKind, Clock, CollectionId, EscrowError,
    MarketEvent, Offer, OfferId, PaymentRail, Result, TokenId,
};
use rust_decimal::Decimal;

use crate::engine::{MarketplaceEngine, ensure_future_deadline, ensure_positive_price};

impl<A, P, G, C> MarketplaceEngine<A, P, G, C>
where
    A: AssetRegistry,
    P: PaymentRail,
    G: AdminPolicy,
    C: Clock,
{
    /// List an asset for sale, moving it into escrow.
    ///
    /// The caller must own the asset and have approved the escrow account
    /// as its operator.
    ///
    /// # Errors
    /// In check order: `InvalidDeadline`, `InvalidPrice`, `AssetNotFound`,
    /// `InvalidSeller`, `NotApproved`; then `AssetTransferFailed` if the
    /// registry refuses the move.
    pub fn create_sell_offer(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
        token_id: TokenId,
        price: Decimal,
        deadline: DateTime<Utc>,
    ) -> Result<OfferId> {
        self.atomically("create_sell_offer", |engine, journal| {
            let now = engine.now();
            ensure_future_deadline(deadline, now)?;
            ensure_positive_price(price)?;
            if engine.owner_of(&collection, token_id)? != caller {
                return Err(EscrowError::InvalidSeller(caller));
            }
            engine.ensure_escrow_approved(&collection, token_id)?;

            let offer = Offer::new(collection.clone(), token_id, caller, price, deadline, now);
            let id = engine.record_offer(journal, BookKind::Sell, offer);

            let escrow = engine.escrow_account();
            engine.move_asset(&collection, token_id, caller, escrow)?;

            tracing::info!(
                offer = %id,
                seller = %caller,
                collection = %collection,
                token = %token_id,
                price = %price,
                deadline = %deadline,
                "Sell offer created"
            );
            engine.emit(
                journal,
                MarketEvent::SellOfferCreated {
                    offer_id: id,
                    collection,
                    token_id,
                    price,
                    deadline,
                },
            )?;
            Ok(id)
        })
    }

    /// Buy the asset of a sell offer, attaching exactly `payment == price`.
    ///
    /// The asset goes to the caller and the payment to the offerer; if the
    /// payout fails, neither moves.
    ///
    /// # Errors
    /// In check order: `InvalidOffer`, `OfferAlreadyEnded`, `OfferExpired`,
    /// `InvalidBuyer` (self-trade), `InvalidAmount`; then
    /// `InsufficientFunds`, `AssetTransferFailed`, or
    /// `CurrencyTransferFailed` from the collaborators.
    pub fn accept_sell_offer(&mut self, caller: AccountId, id: OfferId, payment: Decimal) -> Result<()> {
        self.atomically("accept_sell_offer", |engine, journal| {
            let now = engine.now();
            let offer = engine.acceptable_offer(BookKind::Sell, id, now)?;
            if caller == offer.offerer {
                return Err(EscrowError::InvalidBuyer(caller));
            }
            if payment != offer.price {
                return Err(EscrowError::InvalidAmount {
                    expected: offer.price,
                    attached: payment,
                });
            }

            engine.end_offer(journal, BookKind::Sell, id)?;

            let escrow = engine.escrow_account();
            engine.collect_payment(caller, payment)?;
            engine.move_asset(&offer.collection, offer.token_id, escrow, caller)?;
            engine.pay_out(offer.offerer, offer.price)?;

            engine.emit(
                journal,
                MarketEvent::SellOfferAccepted {
                    offer_id: id,
                    collection: offer.collection.clone(),
                    token_id: offer.token_id,
                    buyer: caller,
                    price: offer.price,
                },
            )?;

            tracing::info!(
                offer = %id,
                buyer = %caller,
                seller = %offer.offerer,
                collection = %offer.collection,
                token = %offer.token_id,
                price = %offer.price,
                "Sell offer accepted"
            );
            Ok(())
        })
    }

    /// End an expired sell offer. The asset stays in escrow.
    ///
    /// # Errors
    /// In check order: `InvalidOffer`, `OfferAlreadyEnded`, `OfferNotEnded`
    /// (deadline not reached), `InvalidSeller` (caller is not the offerer).
    pub fn cancel_sell_offer(&mut self, caller: AccountId, id: OfferId) -> Result<()> {
        self.atomically("cancel_sell_offer", |engine, journal| {
            let now = engine.now();
            let offer = engine.cancellable_offer(BookKind::Sell, id, now)?;
            if caller != offer.offerer {
                return Err(EscrowError::InvalidSeller(caller));
            }

            engine.end_offer(journal, BookKind::Sell, id)?;
            engine.emit(
                journal,
                MarketEvent::SellOfferCancelled {
                    offer_id: id,
                    collection: offer.collection.clone(),
                    token_id: offer.token_id,
                },
            )?;

            tracing::info!(
                offer = %id,
                seller = %caller,
                collection = %offer.collection,
                token = %offer.token_id,
                "Sell offer cancelled; asset remains in escrow"
            );
            Ok(())
        })
    }
}
