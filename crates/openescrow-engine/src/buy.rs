//! Buy offers: the price sits in escrow until the asset's owner accepts.

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
    /// Bid on an asset, escrowing `payment`, which must equal `price`.
    ///
    /// # Errors
    /// In check order: `InvalidDeadline`, `InvalidPrice`, `InvalidAmount`,
    /// `AssetNotFound`, `InvalidBuyer` (caller already owns the asset); then
    /// `InsufficientFunds` if the caller cannot cover the payment.
    pub fn create_buy_offer(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
        token_id: TokenId,
        price: Decimal,
        deadline: DateTime<Utc>,
        payment: Decimal,
    ) -> Result<OfferId> {
        self.atomically("create_buy_offer", |engine, journal| {
            let now = engine.now();
            ensure_future_deadline(deadline, now)?;
            ensure_positive_price(price)?;
            if payment != price {
                return Err(EscrowError::InvalidAmount {
                    expected: price,
                    attached: payment,
                });
            }
            if engine.owner_of(&collection, token_id)? == caller {
                return Err(EscrowError::InvalidBuyer(caller));
            }

            let offer = Offer::new(collection.clone(), token_id, caller, price, deadline, now);
            let id = engine.record_offer(journal, BookKind::Buy, offer);
            engine.collect_payment(caller, payment)?;

            tracing::info!(
                offer = %id,
                buyer = %caller,
                collection = %collection,
                token = %token_id,
                price = %price,
                deadline = %deadline,
                "Buy offer created"
            );
            engine.emit(
                journal,
                MarketEvent::BuyOfferCreated {
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

    /// Sell the asset to a buy offer's offerer for the escrowed price.
    ///
    /// The caller must own the asset and have approved the escrow account.
    ///
    /// # Errors
    /// In check order: `InvalidOffer`, `OfferAlreadyEnded`, `OfferExpired`,
    /// `InvalidSeller` (caller is the offerer, or does not own the asset),
    /// `NotApproved`; then `AssetTransferFailed` or `CurrencyTransferFailed`.
    pub fn accept_buy_offer(&mut self, caller: AccountId, id: OfferId) -> Result<()> {
        self.atomically("accept_buy_offer", |engine, journal| {
            let now = engine.now();
            let offer = engine.acceptable_offer(BookKind::Buy, id, now)?;
            if caller == offer.offerer {
                return Err(EscrowError::InvalidSeller(caller));
            }
            if engine.owner_of(&offer.collection, offer.token_id)? != caller {
                return Err(EscrowError::InvalidSeller(caller));
            }
            engine.ensure_escrow_approved(&offer.collection, offer.token_id)?;

            engine.end_offer(journal, BookKind::Buy, id)?;
            engine.emit(
                journal,
                MarketEvent::BuyOfferAccepted {
                    offer_id: id,
                    collection: offer.collection.clone(),
                    token_id: offer.token_id,
                    seller: caller,
                    price: offer.price,
                },
            )?;

            engine.move_asset(&offer.collection, offer.token_id, caller, offer.offerer)?;
            engine.pay_out(caller, offer.price)?;

            tracing::info!(
                offer = %id,
                seller = %caller,
                buyer = %offer.offerer,
                collection = %offer.collection,
                token = %offer.token_id,
                price = %offer.price,
                "Buy offer accepted"
            );
            Ok(())
        })
    }

    /// End an expired buy offer and refund its escrowed price.
    ///
    /// # Errors
    /// In check order: `InvalidOffer`, `OfferAlreadyEnded`, `OfferNotEnded`,
    /// `InvalidBuyer` (caller is not the offerer); then
    /// `CurrencyTransferFailed` if the refund cannot be delivered.
    pub fn cancel_buy_offer(&mut self, caller: AccountId, id: OfferId) -> Result<()> {
        self.atomically("cancel_buy_offer", |engine, journal| {
            let now = engine.now();
            let offer = engine.cancellable_offer(BookKind::Buy, id, now)?;
            if caller != offer.offerer {
                return Err(EscrowError::InvalidBuyer(caller));
            }

            engine.end_offer(journal, BookKind::Buy, id)?;
            engine.emit(
                journal,
                MarketEvent::BuyOfferCancelled {
                    offer_id: id,
                    collection: offer.collection.clone(),
                    token_id: offer.token_id,
                    price: offer.price,
                },
            )?;
            engine.pay_out(offer.offerer, offer.price)?;

            tracing::info!(
                offer = %id,
                buyer = %caller,
                refund = %offer.price,
                "Buy offer cancelled"
            );
            Ok(())
        })
    }
}
