//! Supply conservation invariant checker.
//!
//! Mathematical invariant for the currency ledger:
//! ```text
//! Σ(account balances) + escrow == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Offers only ever move currency between accounts and escrow. If the
//! invariant breaks, some code path minted or burned money.

use openescrow_types::{EscrowError, Result};
use rust_decimal::Decimal;

/// Tracks external inflows and outflows of the single ledger currency.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total deposited since genesis.
    deposits: Decimal,
    /// Total withdrawn since genesis.
    withdrawals: Decimal,
}

impl SupplyConservation {
    /// Create a new supply conservation tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit.
    pub fn record_deposit(&mut self, amount: Decimal) {
        self.deposits += amount;
    }

    /// Record a withdrawal.
    pub fn record_withdrawal(&mut self, amount: Decimal) {
        self.withdrawals += amount;
    }

    /// Expected total supply: deposits - withdrawals.
    #[must_use]
    pub fn expected_supply(&self) -> Decimal {
        self.deposits - self.withdrawals
    }

    /// Verify that the actual supply (sum of every balance including escrow)
    /// matches the expected supply.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, currency: &str, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_supply();
        if actual_supply != expected {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "{currency}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.deposits, self.withdrawals,
                ),
            });
        }
        Ok(())
    }

    /// Total deposits.
    #[must_use]
    pub fn total_deposits(&self) -> Decimal {
        self.deposits
    }

    /// Total withdrawals.
    #[must_use]
    pub fn total_withdrawals(&self) -> Decimal {
        self.withdrawals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(), Decimal::ZERO);
        assert!(sc.verify("ETH", Decimal::ZERO).is_ok());
    }

    #[test]
    fn withdrawals_decrease_expected() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(Decimal::new(1000, 0));
        sc.record_deposit(Decimal::new(500, 0));
        sc.record_withdrawal(Decimal::new(300, 0));
        assert_eq!(sc.expected_supply(), Decimal::new(1200, 0));
        assert_eq!(sc.total_deposits(), Decimal::new(1500, 0));
        assert_eq!(sc.total_withdrawals(), Decimal::new(300, 0));
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(Decimal::new(10, 0));
        let err = sc.verify("ETH", Decimal::new(11, 0)).unwrap_err();
        assert!(matches!(err, EscrowError::SupplyInvariantViolation { .. }));
        assert!(err.to_string().contains("ETH"));
    }
}
