//! Shared fixture for the engine's unit tests.

use chrono::{DateTime, Duration, Utc};
use openescrow_ledger::{CurrencyLedger, InMemoryAssetRegistry, SingleAdministrator};
use openescrow_types::{AccountId, AssetRegistry, Clock, CollectionId, EngineConfig, ManualClock, TokenId};
use rust_decimal::Decimal;

use crate::MarketplaceEngine;

pub(crate) type TestEngine =
    MarketplaceEngine<InMemoryAssetRegistry, CurrencyLedger, SingleAdministrator, ManualClock>;

pub(crate) fn punks() -> CollectionId {
    CollectionId::new("punks")
}

/// An engine over in-memory collaborators, with a clock the test drives.
pub(crate) struct Market {
    pub engine: TestEngine,
    pub clock: ManualClock,
    pub admin: AccountId,
}

impl Market {
    pub fn new() -> Self {
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

    pub fn in_days(&self, days: i64) -> DateTime<Utc> {
        self.clock.now() + Duration::days(days)
    }

    /// Mint `punks #token` to a fresh account.
    pub fn mint(&mut self, token: u64) -> AccountId {
        let owner = AccountId::new();
        self.engine
            .assets_mut()
            .mint(&punks(), TokenId(token), owner)
            .unwrap();
        owner
    }

    /// Mint `punks #token` to a fresh account and approve the escrow.
    pub fn holder_of(&mut self, token: u64) -> AccountId {
        let owner = self.mint(token);
        self.approve_escrow(owner, token);
        owner
    }

    pub fn approve_escrow(&mut self, owner: AccountId, token: u64) {
        let escrow = self.engine.escrow_account();
        self.engine
            .assets_mut()
            .approve(owner, &punks(), TokenId(token), escrow)
            .unwrap();
    }

    /// A fresh account holding `amount`.
    pub fn funded(&mut self, amount: Decimal) -> AccountId {
        let account = AccountId::new();
        self.engine.payments_mut().deposit(account, amount);
        account
    }

    pub fn owner(&self, token: u64) -> AccountId {
        self.engine.assets().owner_of(&punks(), TokenId(token)).unwrap()
    }
}
