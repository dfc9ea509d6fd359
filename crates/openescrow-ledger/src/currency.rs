//! In-memory currency ledger acting as the engine's payment rail.
//!
//! Tracks one currency: a balance per account plus the engine's escrow
//! balance. Every mutation inside an open transaction is journaled so a
//! failed engine operation can put every balance back exactly.

use std::collections::{HashMap, HashSet};

use openescrow_types::{
    AccountId, EscrowError, PaymentRail, RailError, Result, Transactional,
};
use rust_decimal::Decimal;

use crate::supply::SupplyConservation;

/// Prior value of one balance, for rollback.
#[derive(Debug, Clone, Copy)]
enum Undo {
    Account { account: AccountId, previous: Decimal },
    Escrow { previous: Decimal },
}

/// Per-account currency balances with an escrow pool for the engine.
pub struct CurrencyLedger {
    /// Currency label, used in supply reports.
    currency: String,
    /// Per-account balances.
    balances: HashMap<AccountId, Decimal>,
    /// What the engine holds.
    escrow: Decimal,
    /// Recipients that refuse incoming payments.
    rejecting: HashSet<AccountId>,
    /// Deposit/withdrawal accounting.
    supply: SupplyConservation,
    /// Open transaction journal, newest last.
    journal: Option<Vec<Undo>>,
}

impl CurrencyLedger {
    /// Create an empty ledger for the given currency.
    #[must_use]
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            balances: HashMap::new(),
            escrow: Decimal::ZERO,
            rejecting: HashSet::new(),
            supply: SupplyConservation::new(),
            journal: None,
        }
    }

    /// Currency label.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Deposit funds from outside the system.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) {
        let balance = self.balance(account);
        self.set_balance(account, balance + amount);
        self.supply.record_deposit(amount);
    }

    /// Withdraw funds to outside the system.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if the account holds less than `amount`.
    pub fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let balance = self.balance(account);
        if balance < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }
        self.set_balance(account, balance - amount);
        self.supply.record_withdrawal(amount);
        Ok(())
    }

    /// Balance of an account (zero if never seen).
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances.get(&account).copied().unwrap_or(Decimal::ZERO)
    }

    /// Make every payment to `account` fail, like a recipient that rejects
    /// incoming transfers.
    pub fn reject_payments_to(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    /// Undo [`reject_payments_to`](Self::reject_payments_to).
    pub fn accept_payments_to(&mut self, account: AccountId) {
        self.rejecting.remove(&account);
    }

    /// Sum of every account balance plus escrow.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.balances.values().copied().sum::<Decimal>() + self.escrow
    }

    /// Verify no currency was created or destroyed.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if the books do not balance.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply.verify(&self.currency, self.total_supply())
    }

    fn set_balance(&mut self, account: AccountId, value: Decimal) {
        let previous = self.balance(account);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::Account { account, previous });
        }
        self.balances.insert(account, value);
    }

    fn set_escrow(&mut self, value: Decimal) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::Escrow {
                previous: self.escrow,
            });
        }
        self.escrow = value;
    }
}

impl Transactional for CurrencyLedger {
    fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.journal = None;
    }

    fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        tracing::debug!(entries = journal.len(), "Rolling back currency ledger");
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Account { account, previous } => {
                    self.balances.insert(account, previous);
                }
                Undo::Escrow { previous } => self.escrow = previous,
            }
        }
    }
}

impl PaymentRail for CurrencyLedger {
    fn receive(&mut self, from: AccountId, amount: Decimal) -> std::result::Result<(), RailError> {
        let balance = self.balance(from);
        if balance < amount {
            return Err(RailError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }
        self.set_balance(from, balance - amount);
        self.set_escrow(self.escrow + amount);
        Ok(())
    }

    fn transfer(&mut self, to: AccountId, amount: Decimal) -> std::result::Result<(), RailError> {
        if self.rejecting.contains(&to) {
            return Err(RailError::Rejected {
                recipient: to,
                reason: "recipient refuses payments".into(),
            });
        }
        if self.escrow < amount {
            return Err(RailError::InsufficientFunds {
                needed: amount,
                available: self.escrow,
            });
        }
        self.set_escrow(self.escrow - amount);
        let balance = self.balance(to);
        self.set_balance(to, balance + amount);
        Ok(())
    }

    fn escrow_balance(&self) -> Decimal {
        self.escrow
    }
}

impl Default for CurrencyLedger {
    fn default() -> Self {
        Self::new(openescrow_types::constants::DEFAULT_CURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn deposit_increases_balance() {
        let mut ledger = CurrencyLedger::default();
        let user = AccountId::new();
        ledger.deposit(user, dec(10));
        assert_eq!(ledger.balance(user), dec(10));
        assert_eq!(ledger.escrow_balance(), Decimal::ZERO);
        ledger.verify_supply().unwrap();
    }

    #[test]
    fn receive_moves_into_escrow() {
        let mut ledger = CurrencyLedger::default();
        let user = AccountId::new();
        ledger.deposit(user, dec(10));
        ledger.receive(user, dec(4)).unwrap();
        assert_eq!(ledger.balance(user), dec(6));
        assert_eq!(ledger.escrow_balance(), dec(4));
        ledger.verify_supply().unwrap();
    }

    #[test]
    fn receive_insufficient_fails() {
        let mut ledger = CurrencyLedger::default();
        let user = AccountId::new();
        ledger.deposit(user, dec(1));
        let err = ledger.receive(user, dec(2)).unwrap_err();
        assert_eq!(
            err,
            RailError::InsufficientFunds {
                needed: dec(2),
                available: dec(1)
            }
        );
        assert_eq!(ledger.balance(user), dec(1));
    }

    #[test]
    fn transfer_pays_out_of_escrow() {
        let mut ledger = CurrencyLedger::default();
        let payer = AccountId::new();
        let payee = AccountId::new();
        ledger.deposit(payer, dec(5));
        ledger.receive(payer, dec(5)).unwrap();
        ledger.transfer(payee, dec(5)).unwrap();
        assert_eq!(ledger.balance(payee), dec(5));
        assert_eq!(ledger.escrow_balance(), Decimal::ZERO);
        ledger.verify_supply().unwrap();
    }

    #[test]
    fn rejecting_recipient_fails_transfer() {
        let mut ledger = CurrencyLedger::default();
        let payer = AccountId::new();
        let payee = AccountId::new();
        ledger.deposit(payer, dec(5));
        ledger.receive(payer, dec(5)).unwrap();
        ledger.reject_payments_to(payee);

        let err = ledger.transfer(payee, dec(5)).unwrap_err();
        assert!(matches!(err, RailError::Rejected { recipient, .. } if recipient == payee));
        assert_eq!(ledger.escrow_balance(), dec(5));

        ledger.accept_payments_to(payee);
        ledger.transfer(payee, dec(5)).unwrap();
    }

    #[test]
    fn rollback_restores_all_balances() {
        let mut ledger = CurrencyLedger::default();
        let payer = AccountId::new();
        let payee = AccountId::new();
        ledger.deposit(payer, dec(10));

        ledger.begin();
        ledger.receive(payer, dec(3)).unwrap();
        ledger.transfer(payee, dec(2)).unwrap();
        ledger.rollback();

        assert_eq!(ledger.balance(payer), dec(10));
        assert_eq!(ledger.balance(payee), Decimal::ZERO);
        assert_eq!(ledger.escrow_balance(), Decimal::ZERO);
        ledger.verify_supply().unwrap();
    }

    #[test]
    fn commit_keeps_changes() {
        let mut ledger = CurrencyLedger::default();
        let payer = AccountId::new();
        ledger.deposit(payer, dec(10));

        ledger.begin();
        ledger.receive(payer, dec(3)).unwrap();
        ledger.commit();
        ledger.rollback();

        assert_eq!(ledger.balance(payer), dec(7));
        assert_eq!(ledger.escrow_balance(), dec(3));
    }

    #[test]
    fn withdraw_reduces_supply() {
        let mut ledger = CurrencyLedger::default();
        let user = AccountId::new();
        ledger.deposit(user, dec(10));
        ledger.withdraw(user, dec(4)).unwrap();
        assert_eq!(ledger.balance(user), dec(6));
        ledger.verify_supply().unwrap();

        let err = ledger.withdraw(user, dec(7)).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientFunds { .. }));
    }
}
