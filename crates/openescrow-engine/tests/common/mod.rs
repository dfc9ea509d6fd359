//! Harness shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use openescrow_engine::MarketplaceEngine;
use openescrow_ledger::{CurrencyLedger, InMemoryAssetRegistry, SingleAdministrator};
use openescrow_types::{
    AccountId, AssetRegistry, Clock, CollectionId, EngineConfig, ManualClock, OfferId, TokenId,
};
use rust_decimal::Decimal;

pub type Engine =
    MarketplaceEngine<InMemoryAssetRegistry, CurrencyLedger, SingleAdministrator, ManualClock>;

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

pub fn apes() -> CollectionId {
    CollectionId::new("apes")
}

/// Route engine logs to the test output. Set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A marketplace over in-memory collaborators with a manual clock.
pub struct Marketplace {
    pub engine: Engine,
    pub clock: ManualClock,
    pub admin: AccountId,
}

impl Marketplace {
    pub fn new() -> Self {
        init_tracing();
        let clock = ManualClock::starting_now();
        let admin = AccountId::new();
        let engine = MarketplaceEngine::new(
            EngineConfig::new(AccountId::new()),
            InMemoryAssetRegistry::new(),
            CurrencyLedger::default(),
            SingleAdministrator::new(admin),
            clock.clone(),
        );
        Self { engine, clock, admin }
    }

    pub fn deadline(&self, days: i64) -> DateTime<Utc> {
        self.clock.now() + Duration::days(days)
    }

    /// A fresh account owning `apes #token`, escrow already approved.
    pub fn seller_with(&mut self, token: u64) -> AccountId {
        let seller = AccountId::new();
        let escrow = self.engine.escrow_account();
        let assets = self.engine.assets_mut();
        assets.mint(&apes(), TokenId(token), seller).unwrap();
        assets.approve(seller, &apes(), TokenId(token), escrow).unwrap();
        seller
    }

    /// A fresh account holding `amount`.
    pub fn buyer_with(&mut self, amount: Decimal) -> AccountId {
        let buyer = AccountId::new();
        self.engine.payments_mut().deposit(buyer, amount);
        buyer
    }

    /// List `apes #token` for `price`, expiring in `days`.
    pub fn list(&mut self, seller: AccountId, token: u64, price: Decimal, days: i64) -> OfferId {
        let deadline = self.deadline(days);
        self.engine
            .create_sell_offer(seller, apes(), TokenId(token), price, deadline)
            .unwrap()
    }

    /// Bid `price` on `apes #token`, expiring in `days`.
    pub fn bid(&mut self, buyer: AccountId, token: u64, price: Decimal, days: i64) -> OfferId {
        let deadline = self.deadline(days);
        self.engine
            .create_buy_offer(buyer, apes(), TokenId(token), price, deadline, price)
            .unwrap()
    }

    pub fn owner(&self, token: u64) -> AccountId {
        self.engine.assets().owner_of(&apes(), TokenId(token)).unwrap()
    }

    pub fn balance(&self, account: AccountId) -> Decimal {
        self.engine.payments().balance(account)
    }

    /// Supply conserved and the event chain intact.
    pub fn assert_consistent(&self) {
        self.engine.payments().verify_supply().unwrap();
        openescrow_engine::EventLog::verify_chain([0u8; 32], 0, self.engine.events().records())
            .unwrap();
    }
}
