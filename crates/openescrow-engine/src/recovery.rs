//! Administrator recovery of assets and currency stuck in escrow.
//!
//! Assets end up stuck after a sell offer expires or is cancelled; currency
//! can be swept at any time. [`EscrowReport`] shows how much of the escrow
//! balance still backs open buy offers before a sweep.

use openescrow_types::{
    AccountId, AdminPolicy, AssetRegistry, Clock, CollectionId, EscrowError, MarketEvent,
    PaymentRail, Result, TokenId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::MarketplaceEngine;

/// Escrowed currency split by what backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowReport {
    /// Balance held by the payment rail for the engine.
    pub held: Decimal,
    /// Sum of prices of buy offers that have not ended.
    pub committed: Decimal,
    /// `held - committed`. Zero in normal operation.
    pub stranded: Decimal,
}

impl<A, P, G, C> MarketplaceEngine<A, P, G, C>
where
    A: AssetRegistry,
    P: PaymentRail,
    G: AdminPolicy,
    C: Clock,
{
    /// Move an escrowed asset to `destination`.
    ///
    /// Refused while any sell offer on the same asset is still open. Scans
    /// every sell offer ever created.
    ///
    /// # Errors
    /// `Unauthorized`, `AssetUnderActiveOffer`, then `AssetTransferFailed`
    /// if escrow does not hold the asset.
    pub fn recover_nft(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
        token_id: TokenId,
        destination: AccountId,
    ) -> Result<()> {
        self.atomically("recover_nft", |engine, journal| {
            engine.ensure_administrator(caller)?;

            let now = engine.now();
            let scanned = engine.sell_book.count();
            if scanned > engine.config.recovery_scan_warn_threshold {
                tracing::warn!(
                    scanned,
                    threshold = engine.config.recovery_scan_warn_threshold,
                    "Recovery scan over large sell book"
                );
            }
            let blocking = engine
                .sell_book
                .iter()
                .find(|(_, offer)| offer.references(&collection, token_id) && offer.is_open(now));
            if let Some((offer_id, _)) = blocking {
                return Err(EscrowError::AssetUnderActiveOffer {
                    collection,
                    token_id,
                    offer_id,
                });
            }
            tracing::debug!(scanned, "Recovery scan found no open sell offer");

            let escrow = engine.escrow_account();
            engine.move_asset(&collection, token_id, escrow, destination)?;
            tracing::warn!(
                admin = %caller,
                collection = %collection,
                token = %token_id,
                destination = %destination,
                "Asset recovered from escrow"
            );
            engine.emit(
                journal,
                MarketEvent::NftRecovered {
                    collection,
                    token_id,
                    destination,
                },
            )?;
            Ok(())
        })
    }

    /// Sweep the whole escrow balance to the caller and return the amount.
    ///
    /// Includes currency still backing open buy offers; check
    /// [`escrow_report`](Self::escrow_report) first. An empty escrow is a
    /// no-op that returns zero and emits nothing.
    ///
    /// # Errors
    /// `Unauthorized`, then `CurrencyTransferFailed`.
    pub fn recover_funds(&mut self, caller: AccountId) -> Result<Decimal> {
        self.atomically("recover_funds", |engine, journal| {
            engine.ensure_administrator(caller)?;

            let report = engine.escrow_report();
            if report.held.is_zero() {
                tracing::debug!(admin = %caller, "Escrow empty, nothing to recover");
                return Ok(Decimal::ZERO);
            }
            if report.committed > Decimal::ZERO {
                tracing::warn!(
                    committed = %report.committed,
                    "Sweeping currency that backs open buy offers"
                );
            }

            engine.pay_out(caller, report.held)?;
            engine.emit(
                journal,
                MarketEvent::FundsRecovered {
                    recipient: caller,
                    amount: report.held,
                },
            )?;

            tracing::warn!(
                admin = %caller,
                amount = %report.held,
                stranded = %report.stranded,
                "Funds recovered from escrow"
            );
            Ok(report.held)
        })
    }

    /// Current escrow balance against what open buy offers are owed.
    #[must_use]
    pub fn escrow_report(&self) -> EscrowReport {
        let held = self.payments.escrow_balance();
        let committed = self
            .buy_book
            .iter()
            .filter(|(_, offer)| !offer.is_ended)
            .map(|(_, offer)| offer.price)
            .sum::<Decimal>();
        EscrowReport {
            held,
            committed,
            stranded: held - committed,
        }
    }
}
